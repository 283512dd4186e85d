#![warn(missing_docs)]
//! Edge-triggered controller button tracking.

/// Transition of a single button between two consecutive ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Up last tick, down now.
    Pressed,
    /// Down last tick, up now.
    Released,
    /// Down on both ticks.
    Held,
    /// Up on both ticks.
    Idle,
}

impl Edge {
    /// Classify a transition.
    pub fn between(was_down: bool, is_down: bool) -> Self {
        match (was_down, is_down) {
            (false, true) => Edge::Pressed,
            (true, false) => Edge::Released,
            (true, true) => Edge::Held,
            (false, false) => Edge::Idle,
        }
    }

    /// Whether the button is down after this transition.
    pub fn is_down(self) -> bool {
        matches!(self, Edge::Pressed | Edge::Held)
    }
}

/// Tracks one boolean button across ticks.
#[derive(Debug, Default, Clone, Copy)]
pub struct EdgeDetector {
    down: bool,
}

impl EdgeDetector {
    /// Create a detector in the "up" state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed this tick's state and get the transition.
    pub fn update(&mut self, down: bool) -> Edge {
        let edge = Edge::between(self.down, down);
        self.down = down;
        edge
    }
}
