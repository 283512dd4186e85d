use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::warn;
use wristpanel_compositor::TrackingOrigin;
use wristpanel_core::ControllerRole;
use wristpanel_math::RigidTransform;
use wristpanel_ui3d::{RegionLayout, DEFAULT_AIM_OFFSET};

/// Smallest panel width in meters.
pub const MIN_WIDTH: f32 = 0.1;
/// Largest panel width in meters.
pub const MAX_WIDTH: f32 = 2.0;

/// Tunables for one engine instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Worker ticks per second.
    pub tick_rate_hz: u32,
    /// Ticks between anchor re-evaluations.
    pub anchor_recheck_ticks: u64,
    /// Meters of width per meter of sideways hand travel while resizing.
    pub resize_gain: f32,
    /// Scale applied to panel translation while dragging.
    pub move_sensitivity: f32,
    /// Hand-local point the pointing ray passes through.
    pub aim_offset: [f32; 3],
    /// Gesture region thresholds.
    pub regions: RegionLayout,
    /// Lower width bound in meters.
    pub min_width: f32,
    /// Upper width bound in meters.
    pub max_width: f32,
    /// Overlay key registered with the compositor.
    pub overlay_key: String,
    /// Overlay display name.
    pub overlay_name: String,
    /// Panel texture width in pixels.
    pub panel_width_px: u32,
    /// Panel texture height in pixels.
    pub panel_height_px: u32,
    /// Hand the panel is attached to.
    pub anchor_role: ControllerRole,
    /// Hand that points at the panel (falls back to the other hand).
    pub pointer_role: ControllerRole,
    /// Panel position relative to the headset when no anchor hand exists.
    pub head_offset: [f32; 3],
    /// Reference frame for pose queries.
    pub tracking_origin: TrackingOrigin,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,
            anchor_recheck_ticks: 60,
            resize_gain: 2.0,
            move_sensitivity: 1.0,
            aim_offset: DEFAULT_AIM_OFFSET.to_array(),
            regions: RegionLayout::default(),
            min_width: MIN_WIDTH,
            max_width: MAX_WIDTH,
            overlay_key: "wristpanel.control".to_string(),
            overlay_name: "Wrist Panel".to_string(),
            panel_width_px: 800,
            panel_height_px: 800,
            anchor_role: ControllerRole::LeftHand,
            pointer_role: ControllerRole::RightHand,
            head_offset: [0.0, 0.0, -1.5],
            tracking_origin: TrackingOrigin::Seated,
        }
    }
}

impl EngineConfig {
    /// Time between ticks.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate_hz.max(1)))
    }

    /// Aim offset as a vector.
    pub fn aim_offset(&self) -> Vec3 {
        Vec3::from_array(self.aim_offset)
    }

    /// Panel placement used while anchored to the headset.
    pub fn head_placement(&self) -> RigidTransform {
        RigidTransform::from_translation(Vec3::from_array(self.head_offset))
    }

    /// Replace values that would break the engine with defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.tick_rate_hz == 0 {
            warn!("tick_rate_hz must be positive; using {}", defaults.tick_rate_hz);
            self.tick_rate_hz = defaults.tick_rate_hz;
        }
        if self.anchor_recheck_ticks == 0 {
            warn!(
                "anchor_recheck_ticks must be positive; using {}",
                defaults.anchor_recheck_ticks
            );
            self.anchor_recheck_ticks = defaults.anchor_recheck_ticks;
        }
        if !(self.min_width.is_finite()
            && self.max_width.is_finite()
            && self.min_width > 0.0
            && self.min_width <= self.max_width)
        {
            warn!(
                min = self.min_width,
                max = self.max_width,
                "Invalid width bounds; using defaults"
            );
            self.min_width = defaults.min_width;
            self.max_width = defaults.max_width;
        }
        let (min_width, max_width) = (
            self.min_width.clamp(MIN_WIDTH, MAX_WIDTH),
            self.max_width.clamp(MIN_WIDTH, MAX_WIDTH),
        );
        if (min_width, max_width) != (self.min_width, self.max_width) {
            warn!(
                min = self.min_width,
                max = self.max_width,
                "Width bounds outside [{MIN_WIDTH}, {MAX_WIDTH}]; clamping"
            );
            self.min_width = min_width;
            self.max_width = max_width;
        }
        if !self.resize_gain.is_finite() {
            self.resize_gain = defaults.resize_gain;
        }
        if !self.move_sensitivity.is_finite() {
            self.move_sensitivity = defaults.move_sensitivity;
        }
        if self.aim_offset().try_normalize().is_none() {
            warn!("aim_offset must be a non-zero vector; using default");
            self.aim_offset = defaults.aim_offset;
        }
        if self.panel_width_px == 0 || self.panel_height_px == 0 {
            self.panel_width_px = defaults.panel_width_px;
            self.panel_height_px = defaults.panel_height_px;
        }
        self
    }
}
