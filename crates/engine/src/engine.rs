//! UI-side handle to the worker thread.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};
use wristpanel_compositor::CompositorRuntime;
use wristpanel_render::{PanelImage, TextureBackend, UploadBridge};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::messages::{EngineCommand, ToUi, ToWorker};
use crate::store::OverlayState;
use crate::worker::Worker;

/// Bound of both message queues.
pub const CHANNEL_CAPACITY: usize = 256;

/// Owns the worker thread and both ends of the message queues the UI uses.
///
/// Dropping the handle stops the session and joins the worker.
pub struct Engine {
    to_worker: Option<SyncSender<ToWorker>>,
    from_worker: Receiver<ToUi>,
    join: Option<JoinHandle<()>>,
}

impl Engine {
    /// Spawn the worker. The session is not opened until [`Engine::start`].
    pub fn spawn(
        config: EngineConfig,
        runtime: Box<dyn CompositorRuntime>,
        backend: Box<dyn TextureBackend>,
        initial: OverlayState,
    ) -> Result<Self, EngineError> {
        let config = config.sanitized();
        let (to_worker, commands) = mpsc::sync_channel(CHANNEL_CAPACITY);
        let (to_ui, from_worker) = mpsc::sync_channel(CHANNEL_CAPACITY);

        let join = thread::Builder::new()
            .name("wristpanel-worker".to_string())
            .spawn(move || {
                let worker = Worker::new(config, runtime, UploadBridge::new(backend), to_ui, initial);
                worker.run(commands);
            })?;

        Ok(Self {
            to_worker: Some(to_worker),
            from_worker,
            join: Some(join),
        })
    }

    fn send(&self, message: ToWorker) -> Result<(), EngineError> {
        let sender = self.to_worker.as_ref().ok_or(EngineError::Disconnected)?;
        sender.send(message).map_err(|_| EngineError::Disconnected)
    }

    /// Ask the worker to open the session. The result arrives as a status.
    pub fn start(&self) -> Result<(), EngineError> {
        self.send(ToWorker::Command(EngineCommand::Start))
    }

    /// Ask the worker to close the session.
    pub fn stop(&self) -> Result<(), EngineError> {
        self.send(ToWorker::Command(EngineCommand::Stop))
    }

    /// Queue new panel contents. Returns `false` if the queue was full and
    /// the frame was dropped.
    pub fn upload(&self, image: PanelImage) -> Result<bool, EngineError> {
        let sender = self.to_worker.as_ref().ok_or(EngineError::Disconnected)?;
        match sender.try_send(ToWorker::UploadTexture(image)) {
            Ok(()) => Ok(true),
            Err(TrySendError::Full(_)) => {
                debug!("Worker queue full; panel frame dropped");
                Ok(false)
            }
            Err(TrySendError::Disconnected(_)) => Err(EngineError::Disconnected),
        }
    }

    /// Next pending message, if any.
    pub fn try_recv(&self) -> Result<Option<ToUi>, EngineError> {
        match self.from_worker.try_recv() {
            Ok(message) => Ok(Some(message)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(EngineError::Disconnected),
        }
    }

    /// Wait up to `timeout` for the next message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<ToUi>, EngineError> {
        match self.from_worker.recv_timeout(timeout) {
            Ok(message) => Ok(Some(message)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(EngineError::Disconnected),
        }
    }

    /// Stop the session and join the worker.
    pub fn shutdown(mut self) {
        self.join_worker();
    }

    fn join_worker(&mut self) {
        if let Some(sender) = self.to_worker.take() {
            let _ = sender.send(ToWorker::Command(EngineCommand::Stop));
        }
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                warn!("Engine worker panicked");
            }
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.join_worker();
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("running", &self.join.is_some())
            .finish()
    }
}
