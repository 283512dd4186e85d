//! In-memory compositor used for headless sessions and tests.
//!
//! [`SimulatedRuntime`] is the side handed to the engine; [`RigHandle`] stays
//! with the caller and scripts device poses, buttons and role bindings, and
//! inspects what the engine submitted for its overlay.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use glam::Vec3;
use tracing::{debug, info};
use wristpanel_core::{ButtonMask, ControllerRole, DeviceIndex, MAX_TRACKED_DEVICES};
use wristpanel_math::RigidTransform;

use crate::{
    CompositorError, CompositorEvent, CompositorRuntime, InputMethod, OverlayHandle,
    TextureDescriptor, TrackedPose, TrackingOrigin,
};

/// Everything the simulated runtime knows about one overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySnapshot {
    /// Overlay key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Last submitted width in meters.
    pub width: f32,
    /// Last submitted input method.
    pub input_method: InputMethod,
    /// Whether the overlay is shown.
    pub visible: bool,
    /// Device the overlay is parented to.
    pub parent: Option<DeviceIndex>,
    /// Device-relative transform last submitted.
    pub transform: Option<RigidTransform>,
    /// Texture last registered.
    pub texture: Option<TextureDescriptor>,
    /// Number of transform submissions.
    pub transform_submissions: u64,
    /// Number of width submissions.
    pub width_submissions: u64,
    /// Number of texture registrations.
    pub texture_submissions: u64,
}

impl OverlaySnapshot {
    fn new(key: &str, name: &str) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            width: 1.0,
            input_method: InputMethod::None,
            visible: false,
            parent: None,
            transform: None,
            texture: None,
            transform_submissions: 0,
            width_submissions: 0,
            texture_submissions: 0,
        }
    }
}

#[derive(Debug)]
struct RigState {
    session_active: bool,
    init_failure: Option<String>,
    session_lost: bool,
    poses: Vec<TrackedPose>,
    connected: Vec<bool>,
    buttons: HashMap<DeviceIndex, ButtonMask>,
    roles: HashMap<ControllerRole, DeviceIndex>,
    overlays: HashMap<OverlayHandle, OverlaySnapshot>,
    events: VecDeque<CompositorEvent>,
    next_handle: u64,
    pose_queries: u64,
}

impl Default for RigState {
    fn default() -> Self {
        let mut poses = vec![TrackedPose::INVALID; MAX_TRACKED_DEVICES];
        let mut connected = vec![false; MAX_TRACKED_DEVICES];
        poses[DeviceIndex::HMD.slot()] =
            TrackedPose::valid(RigidTransform::from_translation(Vec3::new(0.0, 1.6, 0.0)));
        connected[DeviceIndex::HMD.slot()] = true;
        Self {
            session_active: false,
            init_failure: None,
            session_lost: false,
            poses,
            connected,
            buttons: HashMap::new(),
            roles: HashMap::new(),
            overlays: HashMap::new(),
            events: VecDeque::new(),
            next_handle: 1,
            pose_queries: 0,
        }
    }
}

impl RigState {
    fn ensure_session(&self) -> Result<(), CompositorError> {
        if self.session_lost {
            return Err(CompositorError::SessionLost);
        }
        if !self.session_active {
            return Err(CompositorError::NoSession);
        }
        Ok(())
    }

    fn overlay_mut(&mut self, overlay: OverlayHandle) -> Result<&mut OverlaySnapshot, CompositorError> {
        self.ensure_session()?;
        self.overlays
            .get_mut(&overlay)
            .ok_or(CompositorError::UnknownOverlay(overlay))
    }

    fn check_device(device: DeviceIndex) -> Result<(), CompositorError> {
        if device.slot() >= MAX_TRACKED_DEVICES {
            return Err(CompositorError::InvalidDevice(device));
        }
        Ok(())
    }
}

fn shared() -> Arc<Mutex<RigState>> {
    Arc::new(Mutex::new(RigState::default()))
}

/// Script/inspect side of a simulated compositor.
#[derive(Debug, Clone)]
pub struct RigHandle {
    state: Arc<Mutex<RigState>>,
}

impl RigHandle {
    fn with<R>(&self, f: impl FnOnce(&mut RigState) -> R) -> R {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Set a device's pose and mark it valid and connected.
    pub fn set_pose(&self, device: DeviceIndex, transform: RigidTransform) {
        self.with(|rig| {
            if let Some(slot) = rig.poses.get_mut(device.slot()) {
                *slot = TrackedPose::valid(transform);
                rig.connected[device.slot()] = true;
            }
        });
    }

    /// Keep the last pose but flag tracking as lost.
    pub fn invalidate_pose(&self, device: DeviceIndex) {
        self.with(|rig| {
            if let Some(slot) = rig.poses.get_mut(device.slot()) {
                slot.valid = false;
            }
        });
    }

    /// Replace a controller's pressed-button mask.
    pub fn set_buttons(&self, device: DeviceIndex, mask: ButtonMask) {
        self.with(|rig| {
            rig.buttons.insert(device, mask);
        });
    }

    /// Press or release the trigger, leaving other buttons untouched.
    pub fn set_trigger(&self, device: DeviceIndex, down: bool) {
        self.with(|rig| {
            let mask = rig.buttons.entry(device).or_default();
            mask.set(ButtonMask::TRIGGER, down);
        });
    }

    /// Bind a role to a device (connecting it), or unbind the role.
    pub fn bind_role(&self, role: ControllerRole, device: Option<DeviceIndex>) {
        self.with(|rig| match device {
            Some(device) => {
                rig.roles.insert(role, device);
                if let Some(connected) = rig.connected.get_mut(device.slot()) {
                    *connected = true;
                }
            }
            None => {
                rig.roles.remove(&role);
            }
        });
    }

    /// Connect or disconnect a device slot.
    pub fn set_connected(&self, device: DeviceIndex, connected: bool) {
        self.with(|rig| {
            if let Some(slot) = rig.connected.get_mut(device.slot()) {
                *slot = connected;
            }
        });
    }

    /// Make the next `init_session` fail with `message`.
    pub fn fail_next_init(&self, message: impl Into<String>) {
        let message = message.into();
        self.with(|rig| rig.init_failure = Some(message));
    }

    /// Drop the session: every later call fails with `SessionLost`.
    pub fn lose_session(&self) {
        self.with(|rig| rig.session_lost = true);
    }

    /// Queue an overlay event.
    pub fn push_event(&self, event: CompositorEvent) {
        self.with(|rig| rig.events.push_back(event));
    }

    /// Events still waiting to be polled.
    pub fn pending_events(&self) -> usize {
        self.with(|rig| rig.events.len())
    }

    /// Whether a session is active.
    pub fn session_active(&self) -> bool {
        self.with(|rig| rig.session_active)
    }

    /// Number of live overlays.
    pub fn overlay_count(&self) -> usize {
        self.with(|rig| rig.overlays.len())
    }

    /// Snapshot of the overlay registered under `key`.
    pub fn overlay(&self, key: &str) -> Option<OverlaySnapshot> {
        self.with(|rig| rig.overlays.values().find(|o| o.key == key).cloned())
    }

    /// Number of pose queries served so far.
    pub fn pose_queries(&self) -> u64 {
        self.with(|rig| rig.pose_queries)
    }
}

/// Runtime side of a simulated compositor, handed to the engine.
#[derive(Debug)]
pub struct SimulatedRuntime {
    state: Arc<Mutex<RigState>>,
}

impl SimulatedRuntime {
    /// Create a runtime plus the handle that scripts it.
    pub fn new() -> (Self, RigHandle) {
        let state = shared();
        (
            Self {
                state: Arc::clone(&state),
            },
            RigHandle { state },
        )
    }

    fn with<R>(&self, f: impl FnOnce(&mut RigState) -> R) -> R {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl CompositorRuntime for SimulatedRuntime {
    fn init_session(&mut self) -> Result<(), CompositorError> {
        self.with(|rig| {
            if let Some(message) = rig.init_failure.take() {
                return Err(CompositorError::Unavailable(message));
            }
            rig.session_lost = false;
            rig.session_active = true;
            info!("Simulated compositor session started");
            Ok(())
        })
    }

    fn shutdown_session(&mut self) {
        self.with(|rig| {
            if rig.session_active {
                debug!("Simulated compositor session shut down");
            }
            rig.session_active = false;
            rig.overlays.clear();
            rig.events.clear();
        });
    }

    fn create_overlay(&mut self, key: &str, name: &str) -> Result<OverlayHandle, CompositorError> {
        self.with(|rig| {
            rig.ensure_session()?;
            if rig.overlays.values().any(|o| o.key == key) {
                return Err(CompositorError::KeyInUse(key.to_string()));
            }
            let handle = OverlayHandle(rig.next_handle);
            rig.next_handle += 1;
            rig.overlays.insert(handle, OverlaySnapshot::new(key, name));
            Ok(handle)
        })
    }

    fn destroy_overlay(&mut self, overlay: OverlayHandle) -> Result<(), CompositorError> {
        self.with(|rig| {
            rig.ensure_session()?;
            rig.overlays
                .remove(&overlay)
                .map(|_| ())
                .ok_or(CompositorError::UnknownOverlay(overlay))
        })
    }

    fn set_width_in_meters(&mut self, overlay: OverlayHandle, width: f32) -> Result<(), CompositorError> {
        self.with(|rig| {
            let entry = rig.overlay_mut(overlay)?;
            entry.width = width;
            entry.width_submissions += 1;
            Ok(())
        })
    }

    fn set_input_method(&mut self, overlay: OverlayHandle, method: InputMethod) -> Result<(), CompositorError> {
        self.with(|rig| {
            rig.overlay_mut(overlay)?.input_method = method;
            Ok(())
        })
    }

    fn show(&mut self, overlay: OverlayHandle) -> Result<(), CompositorError> {
        self.with(|rig| {
            rig.overlay_mut(overlay)?.visible = true;
            Ok(())
        })
    }

    fn hide(&mut self, overlay: OverlayHandle) -> Result<(), CompositorError> {
        self.with(|rig| {
            rig.overlay_mut(overlay)?.visible = false;
            Ok(())
        })
    }

    fn set_transform_relative_to_device(
        &mut self,
        overlay: OverlayHandle,
        device: DeviceIndex,
        transform: &RigidTransform,
    ) -> Result<(), CompositorError> {
        RigState::check_device(device)?;
        self.with(|rig| {
            let entry = rig.overlay_mut(overlay)?;
            entry.parent = Some(device);
            entry.transform = Some(*transform);
            entry.transform_submissions += 1;
            Ok(())
        })
    }

    fn set_texture(&mut self, overlay: OverlayHandle, texture: &TextureDescriptor) -> Result<(), CompositorError> {
        self.with(|rig| {
            let entry = rig.overlay_mut(overlay)?;
            entry.texture = Some(*texture);
            entry.texture_submissions += 1;
            Ok(())
        })
    }

    fn poll_event(&mut self, overlay: OverlayHandle) -> Result<Option<CompositorEvent>, CompositorError> {
        self.with(|rig| {
            rig.overlay_mut(overlay)?;
            Ok(rig.events.pop_front())
        })
    }

    fn poses(&mut self, _origin: TrackingOrigin, count: usize) -> Result<Vec<TrackedPose>, CompositorError> {
        self.with(|rig| {
            rig.ensure_session()?;
            rig.pose_queries += 1;
            let count = count.min(MAX_TRACKED_DEVICES);
            Ok(rig.poses[..count].to_vec())
        })
    }

    fn button_state(&mut self, device: DeviceIndex) -> Result<ButtonMask, CompositorError> {
        RigState::check_device(device)?;
        self.with(|rig| {
            rig.ensure_session()?;
            Ok(rig.buttons.get(&device).copied().unwrap_or_default())
        })
    }

    fn device_for_role(&mut self, role: ControllerRole) -> Result<Option<DeviceIndex>, CompositorError> {
        self.with(|rig| {
            rig.ensure_session()?;
            Ok(rig
                .roles
                .get(&role)
                .copied()
                .filter(|device| rig.connected.get(device.slot()).copied().unwrap_or(false)))
        })
    }

    fn is_device_connected(&mut self, device: DeviceIndex) -> Result<bool, CompositorError> {
        RigState::check_device(device)?;
        self.with(|rig| {
            rig.ensure_session()?;
            Ok(rig.connected[device.slot()])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calls_require_session() {
        let (mut runtime, _rig) = SimulatedRuntime::new();
        assert_eq!(
            runtime.create_overlay("k", "n"),
            Err(CompositorError::NoSession)
        );
        runtime.init_session().unwrap();
        assert!(runtime.create_overlay("k", "n").is_ok());
    }

    #[test]
    fn scripted_init_failure_is_reported_once() {
        let (mut runtime, rig) = SimulatedRuntime::new();
        rig.fail_next_init("runtime not installed");
        assert!(matches!(
            runtime.init_session(),
            Err(CompositorError::Unavailable(msg)) if msg == "runtime not installed"
        ));
        assert!(runtime.init_session().is_ok());
    }

    #[test]
    fn overlay_submissions_are_recorded() {
        let (mut runtime, rig) = SimulatedRuntime::new();
        runtime.init_session().unwrap();
        let handle = runtime.create_overlay("panel", "Panel").unwrap();
        runtime.set_width_in_meters(handle, 0.4).unwrap();
        let placement = RigidTransform::from_translation(Vec3::new(0.0, 0.25, -0.35));
        runtime
            .set_transform_relative_to_device(handle, DeviceIndex(3), &placement)
            .unwrap();
        runtime.show(handle).unwrap();

        let snapshot = rig.overlay("panel").unwrap();
        assert_eq!(snapshot.width, 0.4);
        assert_eq!(snapshot.parent, Some(DeviceIndex(3)));
        assert_eq!(snapshot.transform, Some(placement));
        assert!(snapshot.visible);
        assert_eq!(snapshot.transform_submissions, 1);
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let (mut runtime, _rig) = SimulatedRuntime::new();
        runtime.init_session().unwrap();
        runtime.create_overlay("panel", "A").unwrap();
        assert_eq!(
            runtime.create_overlay("panel", "B"),
            Err(CompositorError::KeyInUse("panel".into()))
        );
    }

    #[test]
    fn lost_session_fails_every_call() {
        let (mut runtime, rig) = SimulatedRuntime::new();
        runtime.init_session().unwrap();
        let handle = runtime.create_overlay("panel", "Panel").unwrap();
        rig.lose_session();
        let err = runtime.show(handle).unwrap_err();
        assert!(err.is_fatal());
        assert!(runtime.poses(TrackingOrigin::Seated, 4).unwrap_err().is_fatal());
    }

    #[test]
    fn role_lookup_ignores_disconnected_devices() {
        let (mut runtime, rig) = SimulatedRuntime::new();
        runtime.init_session().unwrap();
        rig.bind_role(ControllerRole::LeftHand, Some(DeviceIndex(1)));
        assert_eq!(
            runtime.device_for_role(ControllerRole::LeftHand).unwrap(),
            Some(DeviceIndex(1))
        );
        rig.set_connected(DeviceIndex(1), false);
        assert_eq!(runtime.device_for_role(ControllerRole::LeftHand).unwrap(), None);
    }

    #[test]
    fn trigger_toggles_only_its_bit() {
        let (mut runtime, rig) = SimulatedRuntime::new();
        runtime.init_session().unwrap();
        rig.set_buttons(DeviceIndex(2), ButtonMask::GRIP);
        rig.set_trigger(DeviceIndex(2), true);
        let mask = runtime.button_state(DeviceIndex(2)).unwrap();
        assert!(mask.trigger_down());
        assert!(mask.contains(ButtonMask::GRIP));
    }

    #[test]
    fn out_of_range_device_is_rejected() {
        let (mut runtime, _rig) = SimulatedRuntime::new();
        runtime.init_session().unwrap();
        let bad = DeviceIndex(MAX_TRACKED_DEVICES as u32);
        assert_eq!(
            runtime.button_state(bad),
            Err(CompositorError::InvalidDevice(bad))
        );
    }

    #[test]
    fn events_drain_in_order() {
        let (mut runtime, rig) = SimulatedRuntime::new();
        runtime.init_session().unwrap();
        let handle = runtime.create_overlay("panel", "Panel").unwrap();
        rig.push_event(CompositorEvent::Other(7));
        rig.push_event(CompositorEvent::Quit);
        assert_eq!(runtime.poll_event(handle).unwrap(), Some(CompositorEvent::Other(7)));
        assert_eq!(runtime.poll_event(handle).unwrap(), Some(CompositorEvent::Quit));
        assert_eq!(runtime.poll_event(handle).unwrap(), None);
    }
}
