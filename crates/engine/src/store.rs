use std::sync::{Arc, Mutex, PoisonError};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use wristpanel_math::RigidTransform;

use crate::config::{MAX_WIDTH, MIN_WIDTH};

/// Default panel width in meters.
pub const DEFAULT_WIDTH: f32 = 0.4;

/// Default placement of the panel relative to the anchor hand.
pub const DEFAULT_OFFSET: Vec3 = Vec3::new(0.0, 0.25, -0.35);

/// Tolerance used when validating a stored transform.
const RIGID_EPSILON: f32 = 1e-3;

/// Panel placement that outlives a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayState {
    /// Placement relative to the anchor device.
    pub transform: RigidTransform,
    /// Side length in meters.
    pub width: f32,
}

impl Default for OverlayState {
    fn default() -> Self {
        Self {
            transform: RigidTransform::from_translation(DEFAULT_OFFSET),
            width: DEFAULT_WIDTH,
        }
    }
}

impl OverlayState {
    /// Replace each invalid field with its default, logging what was dropped.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let transform = if self.transform.is_rigid(RIGID_EPSILON) {
            self.transform
        } else {
            warn!("Stored overlay transform is not rigid; using default placement");
            defaults.transform
        };
        let width = if self.width.is_finite() && (MIN_WIDTH..=MAX_WIDTH).contains(&self.width) {
            self.width
        } else {
            warn!(width = self.width, "Stored overlay width out of range; using default");
            defaults.width
        };
        Self { transform, width }
    }
}

/// Failure to write overlay state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("overlay state I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// Encoding failure.
    #[error("overlay state could not be encoded: {0}")]
    Encode(String),
}

/// Where panel placement is persisted between sessions.
pub trait OverlayStore: Send {
    /// Stored state, or defaults when nothing usable is stored.
    fn load_overlay_state(&self) -> OverlayState;

    /// Persist state.
    fn save_overlay_state(&mut self, state: &OverlayState) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
struct MemorySlot {
    state: Option<OverlayState>,
    saves: usize,
}

/// In-memory store. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryOverlayStore {
    slot: Arc<Mutex<MemorySlot>>,
}

impl MemoryOverlayStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemorySlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Last state written.
    pub fn stored(&self) -> Option<OverlayState> {
        self.lock().state
    }

    /// Number of saves.
    pub fn saves(&self) -> usize {
        self.lock().saves
    }
}

impl OverlayStore for MemoryOverlayStore {
    fn load_overlay_state(&self) -> OverlayState {
        self.lock().state.map(OverlayState::sanitized).unwrap_or_default()
    }

    fn save_overlay_state(&mut self, state: &OverlayState) -> Result<(), StoreError> {
        let mut slot = self.lock();
        slot.state = Some(*state);
        slot.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;

    #[test]
    fn default_state_is_forward_and_up() {
        let state = OverlayState::default();
        assert_eq!(state.width, 0.4);
        assert_eq!(state.transform.translation(), Vec3::new(0.0, 0.25, -0.35));
    }

    #[test]
    fn out_of_range_width_falls_back() {
        let state = OverlayState {
            width: 5.0,
            ..OverlayState::default()
        }
        .sanitized();
        assert_eq!(state.width, DEFAULT_WIDTH);

        let state = OverlayState {
            width: f32::NAN,
            ..OverlayState::default()
        }
        .sanitized();
        assert_eq!(state.width, DEFAULT_WIDTH);
    }

    #[test]
    fn scaled_transform_falls_back_but_keeps_width() {
        let state = OverlayState {
            transform: RigidTransform::from_mat4_unchecked(Mat4::from_scale(Vec3::splat(3.0))),
            width: 1.2,
        }
        .sanitized();
        assert_eq!(state.transform, OverlayState::default().transform);
        assert_eq!(state.width, 1.2);
    }

    #[test]
    fn memory_store_round_trips_and_counts() {
        let mut store = MemoryOverlayStore::new();
        assert_eq!(store.load_overlay_state(), OverlayState::default());

        let state = OverlayState {
            transform: RigidTransform::from_translation(Vec3::new(0.1, 0.2, -0.3)),
            width: 0.8,
        };
        store.save_overlay_state(&state).unwrap();
        let observer = store.clone();
        assert_eq!(observer.load_overlay_state(), state);
        assert_eq!(observer.saves(), 1);
    }

    #[test]
    fn state_serializes_rows_and_width() {
        let json = serde_json::to_value(OverlayState::default()).unwrap();
        assert_eq!(json["width"], serde_json::json!(0.4f32));
        assert_eq!(json["transform"][2][3], serde_json::json!(-0.35f32));
    }
}
