//! Capability contract consumed by the overlay engine.

use serde::{Deserialize, Serialize};
use wristpanel_core::{ButtonMask, ControllerRole, DeviceIndex};
use wristpanel_math::RigidTransform;

use crate::CompositorError;

/// Stable handle to an overlay object owned by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverlayHandle(pub u64);

/// How the runtime routes its own pointer input to the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMethod {
    /// The runtime does not generate input events for the overlay.
    #[default]
    None,
    /// The runtime emits mouse-style events.
    Mouse,
}

/// Reference frame for pose queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingOrigin {
    /// Origin at the seated zero pose.
    #[default]
    Seated,
    /// Origin on the floor at the center of the play area.
    Standing,
}

/// Pose of one tracked device for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedPose {
    /// Device-to-tracking-space transform.
    pub transform: RigidTransform,
    /// Whether tracking is currently valid for the device.
    pub valid: bool,
}

impl TrackedPose {
    /// An untracked slot.
    pub const INVALID: Self = Self {
        transform: RigidTransform::IDENTITY,
        valid: false,
    };

    /// A valid pose.
    pub fn valid(transform: RigidTransform) -> Self {
        Self {
            transform,
            valid: true,
        }
    }
}

/// Graphics API that owns a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureApi {
    /// A texture on a wgpu device.
    Wgpu,
    /// A CPU-side buffer (simulated sessions).
    Cpu,
}

/// Color space hint passed along with a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSpace {
    /// Let the runtime decide.
    #[default]
    Auto,
    /// sRGB-encoded texels.
    Gamma,
    /// Linear texels.
    Linear,
}

/// Texture registration passed to [`CompositorRuntime::set_texture`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureDescriptor {
    /// Backend-specific texture identifier.
    pub texture_id: u64,
    /// Owning graphics API.
    pub api: TextureApi,
    /// Color space hint.
    pub color_space: ColorSpace,
    /// Texture width in pixels.
    pub width: u32,
    /// Texture height in pixels.
    pub height: u32,
}

/// Event pulled from an overlay's event queue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompositorEvent {
    /// The runtime's own pointer moved over the overlay.
    MouseMove {
        /// Normalized x.
        x: f32,
        /// Normalized y.
        y: f32,
    },
    /// The runtime asks applications to exit.
    Quit,
    /// Anything the engine does not act on.
    Other(u32),
}

/// Operations the engine needs from a VR compositor.
///
/// Implementations are moved onto the worker thread at engine start and only
/// ever called from there.
pub trait CompositorRuntime: Send {
    /// Connect to the runtime as an overlay application.
    fn init_session(&mut self) -> Result<(), CompositorError>;

    /// Disconnect. Safe to call without an active session.
    fn shutdown_session(&mut self);

    /// Create an overlay identified by `key`, shown to the user as `name`.
    fn create_overlay(&mut self, key: &str, name: &str) -> Result<OverlayHandle, CompositorError>;

    /// Destroy an overlay.
    fn destroy_overlay(&mut self, overlay: OverlayHandle) -> Result<(), CompositorError>;

    /// Physical width of the (square) overlay in meters.
    fn set_width_in_meters(
        &mut self,
        overlay: OverlayHandle,
        width: f32,
    ) -> Result<(), CompositorError>;

    /// Select how the runtime routes its own pointer to the overlay.
    fn set_input_method(
        &mut self,
        overlay: OverlayHandle,
        method: InputMethod,
    ) -> Result<(), CompositorError>;

    /// Make the overlay visible.
    fn show(&mut self, overlay: OverlayHandle) -> Result<(), CompositorError>;

    /// Hide the overlay.
    fn hide(&mut self, overlay: OverlayHandle) -> Result<(), CompositorError>;

    /// Parent the overlay to `device` at `transform` (device-relative).
    fn set_transform_relative_to_device(
        &mut self,
        overlay: OverlayHandle,
        device: DeviceIndex,
        transform: &RigidTransform,
    ) -> Result<(), CompositorError>;

    /// Register the texture the overlay displays.
    fn set_texture(
        &mut self,
        overlay: OverlayHandle,
        texture: &TextureDescriptor,
    ) -> Result<(), CompositorError>;

    /// Pop the next pending event for the overlay.
    fn poll_event(&mut self, overlay: OverlayHandle) -> Result<Option<CompositorEvent>, CompositorError>;

    /// Poses for the first `count` device slots.
    fn poses(
        &mut self,
        origin: TrackingOrigin,
        count: usize,
    ) -> Result<Vec<TrackedPose>, CompositorError>;

    /// Pressed-button mask of a controller.
    fn button_state(&mut self, device: DeviceIndex) -> Result<ButtonMask, CompositorError>;

    /// Device currently bound to a controller role.
    fn device_for_role(
        &mut self,
        role: ControllerRole,
    ) -> Result<Option<DeviceIndex>, CompositorError>;

    /// Whether a device slot currently holds a connected device.
    fn is_device_connected(&mut self, device: DeviceIndex) -> Result<bool, CompositorError>;
}
