#![warn(missing_docs)]
//! Overlay engine for a hand-attached control panel.
//!
//! The engine runs a worker thread at a fixed tick rate. Each tick it reads
//! device poses from a [`CompositorRuntime`](wristpanel_compositor::CompositorRuntime),
//! casts the pointing hand's ray at the panel, and runs the
//! [`InteractionMachine`] that turns trigger presses on the panel's edges
//! into move and resize gestures. Everything else becomes a
//! [`PointerSample`](wristpanel_core::PointerSample) for the UI side.
//!
//! The UI side owns the panel surface. It receives samples through
//! [`Engine::try_recv`] (or [`UiBridge::pump`]) and sends rendered images
//! back with [`Engine::upload`]; the worker mirrors them and hands them to
//! the compositor.
//!
//! ```rust,no_run
//! use wristpanel_compositor::SimulatedRuntime;
//! use wristpanel_engine::{Engine, EngineConfig, MemoryOverlayStore, OverlayStore, UiBridge};
//! use wristpanel_render::MemoryBackend;
//! use wristpanel_ui3d::PanelManager;
//!
//! let config = EngineConfig::default();
//! let store = MemoryOverlayStore::new();
//! let (runtime, _rig) = SimulatedRuntime::new();
//! let (backend, _probe) = MemoryBackend::new();
//!
//! let engine = Engine::spawn(
//!     config.clone(),
//!     Box::new(runtime),
//!     Box::new(backend),
//!     store.load_overlay_state(),
//! )?;
//! let panel = PanelManager::control_panel(800, 800, &config.regions);
//! let mut ui = UiBridge::new(panel, Box::new(store));
//!
//! engine.start()?;
//! let report = ui.pump(&engine)?;
//! println!("{} samples", report.samples);
//! # Ok::<(), wristpanel_engine::EngineError>(())
//! ```

pub mod attachment;
pub mod config;
pub mod engine;
pub mod error;
pub mod interaction;
pub mod messages;
pub mod store;
pub mod ui_bridge;
mod worker;

pub use attachment::{AnchorKind, AnchorState, AttachmentTracker};
pub use config::{EngineConfig, MAX_WIDTH, MIN_WIDTH};
pub use engine::{Engine, CHANNEL_CAPACITY};
pub use error::{EngineError, FrameError};
pub use interaction::{GestureParams, InteractionMachine, InteractionState, TickInput, TickOutcome};
pub use messages::{EngineCommand, EngineStatus, ToUi, ToWorker};
pub use store::{
    MemoryOverlayStore, OverlayState, OverlayStore, StoreError, DEFAULT_OFFSET, DEFAULT_WIDTH,
};
pub use ui_bridge::{PumpReport, UiBridge};
