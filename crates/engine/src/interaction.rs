//! Per-tick interaction state machine.
//!
//! Each tick the worker feeds the anchor and hand poses, the raycast result
//! and the trigger state. The machine decides whether the tick is ordinary
//! pointer interaction (the sample is forwarded to the UI) or part of a
//! move/resize gesture (the UI sees "no hit, trigger up"), and owns the
//! panel's local transform and width while a gesture runs.

use tracing::debug;
use wristpanel_core::{PointerSample, Uv};
use wristpanel_input::{Edge, EdgeDetector};
use wristpanel_math::RigidTransform;
use wristpanel_ui3d::{panel_world_transform, RegionKind, RegionLayout};

use crate::config::EngineConfig;
use crate::store::OverlayState;

/// Gesture in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionState {
    /// No gesture; pointer samples go to the UI.
    Idle,
    /// Panel follows the hand.
    Dragging {
        /// Panel pose relative to the hand at grab time.
        grab: RigidTransform,
        /// Local transform at grab time.
        start_local: RigidTransform,
    },
    /// Panel width follows sideways hand travel.
    Resizing {
        /// Anchor-local hand X at grab time.
        start_x: f32,
        /// Width at grab time.
        start_width: f32,
    },
}

/// Inputs for one tick.
#[derive(Debug, Clone, Copy)]
pub struct TickInput {
    /// Anchor device pose.
    pub anchor_world: RigidTransform,
    /// Pointing hand pose.
    pub hand_world: RigidTransform,
    /// Raycast result against the panel as currently placed.
    pub hit: Option<Uv>,
    /// Trigger state this tick.
    pub trigger_down: bool,
    /// Whether drag/resize may start (false while on the headset fallback).
    pub gestures_enabled: bool,
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// Sample to forward to the UI.
    pub sample: PointerSample,
    /// The local transform changed and must be re-submitted.
    pub transform_changed: bool,
    /// The width changed and must be re-submitted.
    pub width_changed: bool,
    /// A gesture ended; this state should be persisted.
    pub persist: Option<OverlayState>,
}

impl TickOutcome {
    fn forward(sample: PointerSample) -> Self {
        Self {
            sample,
            transform_changed: false,
            width_changed: false,
            persist: None,
        }
    }

    fn suppressed() -> Self {
        Self::forward(PointerSample::SUPPRESSED)
    }
}

/// Gesture tunables taken from [`EngineConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureParams {
    /// Region thresholds.
    pub regions: RegionLayout,
    /// Width change per meter of hand travel.
    pub resize_gain: f32,
    /// Translation scale while dragging.
    pub move_sensitivity: f32,
    /// Lower width bound.
    pub min_width: f32,
    /// Upper width bound.
    pub max_width: f32,
}

impl GestureParams {
    /// Saturate a width into `[min_width, max_width]`.
    pub fn clamp_width(&self, width: f32) -> f32 {
        width.clamp(self.min_width, self.max_width)
    }
}

impl From<&EngineConfig> for GestureParams {
    fn from(config: &EngineConfig) -> Self {
        Self {
            regions: config.regions,
            resize_gain: config.resize_gain,
            move_sensitivity: config.move_sensitivity,
            min_width: config.min_width,
            max_width: config.max_width,
        }
    }
}

/// Idle / Dragging / Resizing machine owning the panel placement.
#[derive(Debug, Clone)]
pub struct InteractionMachine {
    params: GestureParams,
    state: InteractionState,
    trigger: EdgeDetector,
    local: RigidTransform,
    width: f32,
}

impl InteractionMachine {
    /// Start idle with the given placement.
    pub fn new(params: GestureParams, initial: OverlayState) -> Self {
        Self {
            width: params.clamp_width(initial.width),
            params,
            state: InteractionState::Idle,
            trigger: EdgeDetector::new(),
            local: initial.transform,
        }
    }

    /// Current gesture.
    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// Panel transform relative to the anchor.
    pub fn local_transform(&self) -> RigidTransform {
        self.local
    }

    /// Panel width in meters.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Placement as a persistable value.
    pub fn overlay_state(&self) -> OverlayState {
        OverlayState {
            transform: self.local,
            width: self.width,
        }
    }

    /// Whether a drag or resize is running.
    pub fn in_gesture(&self) -> bool {
        self.state != InteractionState::Idle
    }

    /// Abort any gesture, keeping what it changed. Returns the state to
    /// persist if a gesture was running. A trigger still held stays held, so
    /// it does not count as a fresh press afterwards.
    pub fn finish_gesture(&mut self) -> Option<OverlayState> {
        if std::mem::replace(&mut self.state, InteractionState::Idle) == InteractionState::Idle {
            return None;
        }
        Some(self.overlay_state())
    }

    /// Advance one tick.
    pub fn step(&mut self, input: TickInput) -> TickOutcome {
        let edge = self.trigger.update(input.trigger_down);
        match self.state {
            InteractionState::Idle => self.step_idle(input, edge),
            InteractionState::Dragging { grab, start_local } => {
                if !edge.is_down() || !input.gestures_enabled {
                    return self.end_gesture();
                }
                let panel_world = input.hand_world.multiply(&grab);
                let mut local = input.anchor_world.inverse().multiply(&panel_world);
                if self.params.move_sensitivity != 1.0 {
                    let start = start_local.translation();
                    let delta = local.translation() - start;
                    local = local.with_translation(start + delta * self.params.move_sensitivity);
                }
                let changed = local != self.local;
                self.local = local;
                TickOutcome {
                    transform_changed: changed,
                    ..TickOutcome::suppressed()
                }
            }
            InteractionState::Resizing {
                start_x,
                start_width,
            } => {
                if !edge.is_down() || !input.gestures_enabled {
                    return self.end_gesture();
                }
                let x = hand_x_in_anchor(&input);
                let width = self
                    .params
                    .clamp_width(start_width + (x - start_x) * self.params.resize_gain);
                let changed = width != self.width;
                self.width = width;
                TickOutcome {
                    width_changed: changed,
                    ..TickOutcome::suppressed()
                }
            }
        }
    }

    fn step_idle(&mut self, input: TickInput, edge: Edge) -> TickOutcome {
        let Some(uv) = input.hit else {
            return TickOutcome::forward(PointerSample::new(None, input.trigger_down));
        };
        if edge != Edge::Pressed || !input.gestures_enabled {
            return TickOutcome::forward(PointerSample::new(Some(uv), input.trigger_down));
        }

        match self.params.regions.classify(uv) {
            RegionKind::DragStrip => {
                let panel_world = panel_world_transform(&input.anchor_world, &self.local);
                self.state = InteractionState::Dragging {
                    grab: input.hand_world.inverse().multiply(&panel_world),
                    start_local: self.local,
                };
                debug!(u = uv.u, v = uv.v, "Drag started");
                TickOutcome::suppressed()
            }
            RegionKind::ResizeHandle => {
                self.state = InteractionState::Resizing {
                    start_x: hand_x_in_anchor(&input),
                    start_width: self.width,
                };
                debug!(width = self.width, "Resize started");
                TickOutcome::suppressed()
            }
            RegionKind::Content => TickOutcome::forward(PointerSample::new(Some(uv), true)),
        }
    }

    fn end_gesture(&mut self) -> TickOutcome {
        let kind = self.state;
        self.state = InteractionState::Idle;
        let state = self.overlay_state();
        debug!(?kind, width = state.width, "Gesture ended");
        TickOutcome {
            persist: Some(state),
            ..TickOutcome::suppressed()
        }
    }
}

fn hand_x_in_anchor(input: &TickInput) -> f32 {
    input
        .anchor_world
        .inverse()
        .multiply(&input.hand_world)
        .translation()
        .x
}
