use thiserror::Error;
use wristpanel_core::DeviceIndex;

use crate::OverlayHandle;

/// Errors reported by a compositor runtime.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompositorError {
    /// The runtime could not be reached (not installed, not running).
    #[error("compositor runtime unavailable: {0}")]
    Unavailable(String),
    /// The session ended underneath us.
    #[error("compositor session lost")]
    SessionLost,
    /// A call was made before `init_session` or after `shutdown_session`.
    #[error("no active compositor session")]
    NoSession,
    /// The overlay handle is not known to the runtime.
    #[error("unknown overlay handle {0:?}")]
    UnknownOverlay(OverlayHandle),
    /// Another overlay already owns this key.
    #[error("overlay key {0:?} already in use")]
    KeyInUse(String),
    /// Device index outside the runtime's device table.
    #[error("device {0} out of range")]
    InvalidDevice(DeviceIndex),
    /// Any other per-call failure.
    #[error("compositor call failed: {0}")]
    Call(String),
}

impl CompositorError {
    /// Whether the session is gone and the engine has to stop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CompositorError::SessionLost | CompositorError::NoSession)
    }
}
