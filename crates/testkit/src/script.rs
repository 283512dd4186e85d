//! Scripted hand motion for simulated sessions.
//!
//! A [`GestureScript`] is a flat list of rig mutations and waits. Scripts are
//! replayed against a [`RigHandle`]; waits are handed back to the caller so
//! it can pump the UI (or just sleep) while the engine ticks.

use anyhow::Result;
use glam::Vec3;
use serde::Serialize;
use wristpanel_core::{ControllerRole, DeviceIndex, Uv};
use wristpanel_compositor::RigHandle;
use wristpanel_engine::OverlayState;
use wristpanel_math::RigidTransform;
use wristpanel_ui3d::panel_world_transform;

/// Distance from the hand to the panel used when aiming.
pub const AIM_DISTANCE: f32 = 0.7;

/// Where the panel sits in the world, for computing aiming poses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelGeometry {
    /// Anchor device pose.
    pub anchor_world: RigidTransform,
    /// Panel placement relative to the anchor.
    pub placement: OverlayState,
    /// Hand-local aim point.
    pub aim_offset: Vec3,
}

impl PanelGeometry {
    /// Geometry for a panel at `placement` on an anchor at `anchor_world`.
    pub fn new(anchor_world: RigidTransform, placement: OverlayState, aim_offset: Vec3) -> Self {
        Self {
            anchor_world,
            placement,
            aim_offset,
        }
    }

    /// World pose of the panel.
    pub fn panel_world(&self) -> RigidTransform {
        panel_world_transform(&self.anchor_world, &self.placement.transform)
    }

    /// World position of `uv` on the panel.
    pub fn point_at(&self, uv: Uv) -> Vec3 {
        let width = self.placement.width;
        let local = Vec3::new((uv.u - 0.5) * width, (0.5 - uv.v) * width, 0.0);
        self.panel_world().transform_point(local)
    }

    /// Unrotated hand pose whose pointer ray passes through `uv`.
    pub fn hand_aiming_at(&self, uv: Uv) -> RigidTransform {
        let direction = self.aim_offset.try_normalize().unwrap_or(Vec3::NEG_Z);
        RigidTransform::from_translation(self.point_at(uv) - direction * AIM_DISTANCE)
    }

    /// Geometry after the panel was dragged by `world_delta`.
    pub fn moved_by(&self, world_delta: Vec3) -> Self {
        let panel_world = self.panel_world();
        let moved = panel_world.with_translation(panel_world.translation() + world_delta);
        let transform = self.anchor_world.inverse().multiply(&moved);
        Self {
            placement: OverlayState {
                transform,
                ..self.placement
            },
            ..*self
        }
    }

    /// Geometry with a different width.
    pub fn with_width(&self, width: f32) -> Self {
        Self {
            placement: OverlayState {
                width,
                ..self.placement
            },
            ..*self
        }
    }
}

/// One scripted action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptStep {
    /// Move a device.
    Pose {
        /// Device slot.
        device: u32,
        /// Row-major pose.
        transform: RigidTransform,
    },
    /// Press or release a device's trigger.
    Trigger {
        /// Device slot.
        device: u32,
        /// Whether the trigger is down.
        down: bool,
    },
    /// Bind a role to a device.
    Bind {
        /// Role.
        role: ControllerRole,
        /// Device slot.
        device: u32,
    },
    /// Let the engine run for a number of ticks.
    Wait {
        /// Ticks to wait.
        ticks: u32,
    },
}

/// Replayable sequence of rig actions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GestureScript {
    steps: Vec<ScriptStep>,
}

impl GestureScript {
    /// Empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `device` to `transform`.
    pub fn pose(mut self, device: DeviceIndex, transform: RigidTransform) -> Self {
        self.steps.push(ScriptStep::Pose {
            device: device.0,
            transform,
        });
        self
    }

    /// Press the trigger on `device`.
    pub fn press(mut self, device: DeviceIndex) -> Self {
        self.steps.push(ScriptStep::Trigger {
            device: device.0,
            down: true,
        });
        self
    }

    /// Release the trigger on `device`.
    pub fn release(mut self, device: DeviceIndex) -> Self {
        self.steps.push(ScriptStep::Trigger {
            device: device.0,
            down: false,
        });
        self
    }

    /// Bind `role` to `device`.
    pub fn bind(mut self, role: ControllerRole, device: DeviceIndex) -> Self {
        self.steps.push(ScriptStep::Bind {
            role,
            device: device.0,
        });
        self
    }

    /// Wait `ticks` ticks.
    pub fn wait(mut self, ticks: u32) -> Self {
        self.steps.push(ScriptStep::Wait { ticks });
        self
    }

    /// Steps in order.
    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }

    /// Sum of all waits.
    pub fn duration_ticks(&self) -> u64 {
        self.steps
            .iter()
            .map(|step| match step {
                ScriptStep::Wait { ticks } => u64::from(*ticks),
                _ => 0,
            })
            .sum()
    }

    /// Apply every step to `rig`, calling `wait` for each wait step.
    pub fn play<W>(&self, rig: &RigHandle, mut wait: W) -> Result<()>
    where
        W: FnMut(u32) -> Result<()>,
    {
        for step in &self.steps {
            match *step {
                ScriptStep::Pose { device, transform } => rig.set_pose(DeviceIndex(device), transform),
                ScriptStep::Trigger { device, down } => rig.set_trigger(DeviceIndex(device), down),
                ScriptStep::Bind { role, device } => rig.bind_role(role, Some(DeviceIndex(device))),
                ScriptStep::Wait { ticks } => wait(ticks)?,
            }
        }
        Ok(())
    }

    /// Hover the panel, click a point, drag by `drag` and widen by `widen`
    /// meters of hand travel.
    ///
    /// Drags start on the top strip and resizes on the bottom-right handle,
    /// both at their default thresholds.
    pub fn tour(
        geometry: PanelGeometry,
        pointer: DeviceIndex,
        click: Uv,
        drag: Vec3,
        widen: f32,
        settle: u32,
    ) -> Self {
        let strip = Uv::new(0.5, 0.05);
        let handle = Uv::new(0.95, 0.95);
        let grab = geometry.hand_aiming_at(strip);
        let moved = geometry.moved_by(drag);
        let resize_start = moved.hand_aiming_at(handle);
        let resize_end = resize_start
            .with_translation(resize_start.translation() + moved.anchor_world.transform_vector(Vec3::X) * widen);

        Self::new()
            .pose(pointer, geometry.hand_aiming_at(Uv::new(0.5, 0.5)))
            .wait(settle)
            .pose(pointer, geometry.hand_aiming_at(click))
            .wait(settle)
            .press(pointer)
            .wait(settle)
            .release(pointer)
            .wait(settle)
            .pose(pointer, grab)
            .wait(settle)
            .press(pointer)
            .wait(settle)
            .pose(pointer, grab.with_translation(grab.translation() + drag))
            .wait(settle)
            .release(pointer)
            .wait(settle)
            .pose(pointer, resize_start)
            .wait(settle)
            .press(pointer)
            .wait(settle)
            .pose(pointer, resize_end)
            .wait(settle)
            .release(pointer)
            .wait(settle)
    }
}
