#![warn(missing_docs)]
//! Core primitives shared across the workspace.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Worker tick counter (60 TPS by default => ~16.7 ms per tick).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tick(pub u64);

impl Tick {
    /// First tick of any engine session.
    pub const ZERO: Self = Self(0);

    /// Advance by `delta` ticks.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0 + delta)
    }

    /// Number of ticks elapsed since `earlier` (saturating).
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

/// Upper bound on the device table returned by a pose query.
pub const MAX_TRACKED_DEVICES: usize = 64;

/// Index of a tracked device in the compositor's device table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeviceIndex(pub u32);

impl DeviceIndex {
    /// The head-mounted display always occupies slot 0.
    pub const HMD: Self = Self(0);

    /// Slot in a pose table.
    pub fn slot(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for DeviceIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hand role a controller is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerRole {
    /// Controller held in the left hand.
    LeftHand,
    /// Controller held in the right hand.
    RightHand,
}

impl ControllerRole {
    /// The other hand.
    pub fn opposite(self) -> Self {
        match self {
            ControllerRole::LeftHand => ControllerRole::RightHand,
            ControllerRole::RightHand => ControllerRole::LeftHand,
        }
    }
}

bitflags! {
    /// Pressed-button bitmask reported by a controller.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ButtonMask: u64 {
        /// System button.
        const SYSTEM = 1 << 0;
        /// Application menu button.
        const APPLICATION_MENU = 1 << 1;
        /// Grip button.
        const GRIP = 1 << 2;
        /// Touchpad / thumbstick click.
        const TOUCHPAD = 1 << 32;
        /// Index trigger.
        const TRIGGER = 1 << 33;
    }
}

impl ButtonMask {
    /// Whether the index trigger is held.
    pub fn trigger_down(self) -> bool {
        self.contains(ButtonMask::TRIGGER)
    }
}

/// Normalized panel coordinate, `u` left→right and `v` top→bottom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Uv {
    /// Horizontal coordinate in `[0, 1]`.
    pub u: f32,
    /// Vertical coordinate in `[0, 1]`, 0 at the top edge.
    pub v: f32,
}

impl Uv {
    /// Create a UV coordinate.
    pub const fn new(u: f32, v: f32) -> Self {
        Self { u, v }
    }

    /// Map onto a pixel grid, clamped to the last row/column.
    pub fn to_pixel(self, width: u32, height: u32) -> (u32, u32) {
        let x = (self.u * width as f32).max(0.0) as u32;
        let y = (self.v * height as f32).max(0.0) as u32;
        (
            x.min(width.saturating_sub(1)),
            y.min(height.saturating_sub(1)),
        )
    }
}

/// Per-tick pointer report handed from the worker to the UI context.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    /// Where the pointing ray hits the panel, if anywhere.
    pub hit: Option<Uv>,
    /// Trigger state this tick.
    pub trigger_down: bool,
}

impl PointerSample {
    /// "No hit, trigger up": sent while a gesture owns the pointer.
    pub const SUPPRESSED: Self = Self {
        hit: None,
        trigger_down: false,
    };

    /// Create a sample.
    pub fn new(hit: Option<Uv>, trigger_down: bool) -> Self {
        Self { hit, trigger_down }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_since_saturates() {
        let a = Tick::ZERO.advance(5);
        let b = Tick(2);
        assert_eq!(a.since(b), 3);
        assert_eq!(b.since(a), 0);
    }

    #[test]
    fn trigger_bit_is_tested_in_isolation() {
        assert!(!ButtonMask::GRIP.trigger_down());
        assert!((ButtonMask::GRIP | ButtonMask::TRIGGER).trigger_down());
        assert!(!ButtonMask::empty().trigger_down());
    }

    #[test]
    fn uv_to_pixel_clamps_far_edge() {
        assert_eq!(Uv::new(0.0, 0.0).to_pixel(800, 800), (0, 0));
        assert_eq!(Uv::new(1.0, 1.0).to_pixel(800, 800), (799, 799));
        assert_eq!(Uv::new(0.5, 0.25).to_pixel(800, 800), (400, 200));
    }

    #[test]
    fn roles_are_mirrored() {
        assert_eq!(ControllerRole::LeftHand.opposite(), ControllerRole::RightHand);
        assert_eq!(ControllerRole::RightHand.opposite(), ControllerRole::LeftHand);
    }

    #[test]
    fn role_serializes_snake_case() {
        let json = serde_json::to_string(&ControllerRole::LeftHand).unwrap();
        assert_eq!(json, "\"left_hand\"");
    }
}
