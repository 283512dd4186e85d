//! UI-context side of the message loop.
//!
//! [`UiBridge::pump`] is meant to be called from the host's event loop. It
//! drains worker messages, feeds pointer samples to the panel, persists
//! finished gestures and sends at most one re-rendered image per call.

use tracing::{debug, info, warn};
use wristpanel_ui3d::{PanelAction, PanelSurface, PointerDispatcher};

use crate::engine::Engine;
use crate::error::EngineError;
use crate::messages::{EngineStatus, ToUi};
use crate::store::OverlayStore;

/// Upper bound on messages drained per pump.
const MAX_MESSAGES_PER_PUMP: usize = 1024;

/// What one pump did.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PumpReport {
    /// Pointer samples delivered to the panel.
    pub samples: usize,
    /// Clicks produced by those samples.
    pub actions: Vec<PanelAction>,
    /// Status changes received.
    pub statuses: Vec<EngineStatus>,
    /// Images queued for upload.
    pub uploads: usize,
    /// Placements written to the store.
    pub persisted: usize,
}

/// Couples a panel surface and an overlay store to an [`Engine`].
pub struct UiBridge<S: PanelSurface> {
    panel: S,
    dispatcher: PointerDispatcher,
    store: Box<dyn OverlayStore>,
    running: bool,
    repaint_requested: bool,
}

impl<S: PanelSurface> UiBridge<S> {
    /// New bridge; nothing is rendered until the engine reports a start.
    pub fn new(panel: S, store: Box<dyn OverlayStore>) -> Self {
        Self {
            panel,
            dispatcher: PointerDispatcher::new(),
            store,
            running: false,
            repaint_requested: false,
        }
    }

    /// The panel.
    pub fn panel(&self) -> &S {
        &self.panel
    }

    /// Mutable panel access (content updates mark it dirty).
    pub fn panel_mut(&mut self) -> &mut S {
        &mut self.panel
    }

    /// The overlay store.
    pub fn store(&self) -> &dyn OverlayStore {
        self.store.as_ref()
    }

    /// Whether the engine last reported a running session.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Force a render on the next pump.
    pub fn request_repaint(&mut self) {
        self.repaint_requested = true;
    }

    /// Drain pending worker messages and push a fresh image if needed.
    pub fn pump(&mut self, engine: &Engine) -> Result<PumpReport, EngineError> {
        self.pump_observed(engine, |_| {})
    }

    /// [`UiBridge::pump`], showing every drained message to `observe` first.
    pub fn pump_observed<F>(&mut self, engine: &Engine, mut observe: F) -> Result<PumpReport, EngineError>
    where
        F: FnMut(&ToUi),
    {
        let mut report = PumpReport::default();
        for _ in 0..MAX_MESSAGES_PER_PUMP {
            let Some(message) = engine.try_recv()? else {
                break;
            };
            observe(&message);
            self.handle(message, &mut report);
        }

        if self.running && (self.repaint_requested || self.panel.is_dirty()) {
            self.repaint_requested = false;
            let image = self.panel.render();
            if engine.upload(image)? {
                report.uploads += 1;
            }
        }
        Ok(report)
    }

    fn handle(&mut self, message: ToUi, report: &mut PumpReport) {
        match message {
            ToUi::PoseTick(sample) => {
                if !self.running {
                    return;
                }
                report.samples += 1;
                if let Some(action) = self.dispatcher.handle(&mut self.panel, sample) {
                    debug!(?action, "Panel action");
                    report.actions.push(action);
                }
            }
            ToUi::RenderFrame => self.repaint_requested = true,
            ToUi::Status(status) => {
                match &status {
                    EngineStatus::Started { ok: true, message } => {
                        info!(%message, "Overlay running");
                        self.running = true;
                        self.repaint_requested = true;
                    }
                    EngineStatus::Started { ok: false, message } => {
                        warn!(%message, "Overlay failed to start");
                        self.running = false;
                    }
                    EngineStatus::Stopped => self.running = false,
                    EngineStatus::Failed { message } => {
                        warn!(%message, "Overlay stopped after an error");
                        self.running = false;
                    }
                }
                if !self.running {
                    self.panel.set_cursor(None);
                    self.dispatcher = PointerDispatcher::new();
                }
                report.statuses.push(status);
            }
            ToUi::PersistState(state) => match self.store.save_overlay_state(&state) {
                Ok(()) => report.persisted += 1,
                Err(err) => warn!(%err, "Failed to persist overlay placement"),
            },
        }
    }
}
