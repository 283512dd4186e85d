use thiserror::Error;
use wristpanel_compositor::CompositorError;
use wristpanel_core::DeviceIndex;
use wristpanel_render::UploadError;

/// Reason a single tick ended early.
#[derive(Debug, Error)]
pub enum FrameError {
    /// A compositor call failed.
    #[error("compositor call failed: {0}")]
    Compositor(#[from] CompositorError),
    /// No controller is available to point with.
    #[error("no pointing controller connected")]
    NoPointer,
    /// The anchor has not been evaluated.
    #[error("panel has no anchor device")]
    NoAnchor,
    /// A device's pose is not valid this tick.
    #[error("pose for device {0} is not tracking")]
    PoseInvalid(DeviceIndex),
    /// The pose table does not contain the device.
    #[error("device {0} missing from pose table")]
    MissingPose(DeviceIndex),
    /// The compositor asked the application to quit.
    #[error("compositor requested shutdown")]
    QuitRequested,
}

impl FrameError {
    /// Errors that end the session rather than the tick.
    pub fn is_fatal(&self) -> bool {
        match self {
            FrameError::Compositor(err) => err.is_fatal(),
            FrameError::QuitRequested => true,
            _ => false,
        }
    }
}

/// Errors surfaced by the engine handle or session setup.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The worker thread could not be spawned.
    #[error("failed to spawn engine worker: {0}")]
    Spawn(#[from] std::io::Error),
    /// The worker thread has exited.
    #[error("engine worker is not running")]
    Disconnected,
    /// The compositor refused session setup.
    #[error("{0}")]
    Compositor(#[from] CompositorError),
    /// The panel texture could not be set up.
    #[error("texture setup failed: {0}")]
    Upload(#[from] UploadError),
}
