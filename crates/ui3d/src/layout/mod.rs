//! Named interactive regions of the panel.
//!
//! Gesture regions are attached to panel elements as a [`RegionKind`] when
//! the panel is built; the resulting [`RegionLayout`] is expressed in UV
//! space so the worker can classify raycast hits without knowing pixels.

use serde::{Deserialize, Serialize};
use wristpanel_core::Uv;

/// What a point on the panel is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    /// Ordinary panel content; pointer events go to the UI.
    #[default]
    Content,
    /// Grabbing here moves the panel.
    DragStrip,
    /// Grabbing here resizes the panel.
    ResizeHandle,
}

/// UV thresholds of the gesture regions.
///
/// The drag strip spans the full width along the top edge; the resize handle
/// is the bottom-right corner. Boundaries are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionLayout {
    /// Hits with `v` strictly below this are in the drag strip.
    pub drag_strip_max_v: f32,
    /// Hits with `u` strictly above this (and `v` above `resize_min_v`) are
    /// in the resize handle.
    pub resize_min_u: f32,
    /// See `resize_min_u`.
    pub resize_min_v: f32,
}

impl Default for RegionLayout {
    fn default() -> Self {
        Self {
            drag_strip_max_v: 0.15,
            resize_min_u: 0.85,
            resize_min_v: 0.85,
        }
    }
}

impl RegionLayout {
    /// Classify a hit. The drag strip wins where regions overlap.
    pub fn classify(&self, uv: Uv) -> RegionKind {
        if uv.v < self.drag_strip_max_v {
            RegionKind::DragStrip
        } else if uv.u > self.resize_min_u && uv.v > self.resize_min_v {
            RegionKind::ResizeHandle
        } else {
            RegionKind::Content
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds() {
        let layout = RegionLayout::default();
        assert_eq!(layout.classify(Uv::new(0.5, 0.05)), RegionKind::DragStrip);
        assert_eq!(layout.classify(Uv::new(0.9, 0.9)), RegionKind::ResizeHandle);
        assert_eq!(layout.classify(Uv::new(0.5, 0.5)), RegionKind::Content);
    }

    #[test]
    fn boundaries_are_exclusive() {
        let layout = RegionLayout::default();
        assert_eq!(layout.classify(Uv::new(0.5, 0.15)), RegionKind::Content);
        assert_eq!(layout.classify(Uv::new(0.85, 0.9)), RegionKind::Content);
        assert_eq!(layout.classify(Uv::new(0.9, 0.85)), RegionKind::Content);
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let layout: RegionLayout = serde_json::from_str(r#"{"drag_strip_max_v":0.2}"#).unwrap();
        assert_eq!(layout.drag_strip_max_v, 0.2);
        assert_eq!(layout.resize_min_u, 0.85);
    }
}
