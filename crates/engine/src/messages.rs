//! Closed message set exchanged between the UI context and the worker.

use wristpanel_core::PointerSample;
use wristpanel_render::PanelImage;

use crate::store::OverlayState;

/// Lifecycle command for the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCommand {
    /// Open the compositor session and start ticking.
    Start,
    /// Stop ticking and tear the session down.
    Stop,
}

/// Worker lifecycle report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineStatus {
    /// Outcome of a start request.
    Started {
        /// Whether the session is up.
        ok: bool,
        /// Human-readable detail.
        message: String,
    },
    /// The engine stopped on request.
    Stopped,
    /// The session was lost while running; the engine has stopped.
    Failed {
        /// Human-readable detail.
        message: String,
    },
}

/// Worker → UI.
#[derive(Debug, Clone, PartialEq)]
pub enum ToUi {
    /// Pointer sample for this tick.
    PoseTick(PointerSample),
    /// The panel should be rendered and uploaded.
    RenderFrame,
    /// Lifecycle change.
    Status(EngineStatus),
    /// A gesture ended; persist this placement.
    PersistState(OverlayState),
}

/// UI → worker.
#[derive(Debug, Clone, PartialEq)]
pub enum ToWorker {
    /// New panel contents.
    UploadTexture(PanelImage),
    /// Lifecycle command.
    Command(EngineCommand),
}
