//! Fixed-cadence worker: owns the compositor session and the panel texture.

use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::time::Instant;

use tracing::{debug, info, trace, warn};
use wristpanel_compositor::{
    CompositorError, CompositorEvent, CompositorRuntime, InputMethod, OverlayHandle, TrackedPose,
};
use wristpanel_core::{ControllerRole, DeviceIndex, PointerSample, Tick, MAX_TRACKED_DEVICES};
use wristpanel_math::RigidTransform;
use wristpanel_render::{PanelImage, UploadBridge, UploadOutcome};
use wristpanel_ui3d::{panel_world_transform, pointer_ray, raycast_panel};

use crate::attachment::{AnchorState, AttachmentTracker};
use crate::config::EngineConfig;
use crate::error::{EngineError, FrameError};
use crate::interaction::{GestureParams, InteractionMachine, TickInput};
use crate::messages::{EngineCommand, EngineStatus, ToUi, ToWorker};
use crate::store::OverlayState;

/// Upper bound on events drained per tick.
const MAX_EVENTS_PER_TICK: usize = 64;

/// Pointer samples held back while the UI channel is full.
const MAX_PENDING_SAMPLES: usize = 32;

/// What one successful tick produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TickReport {
    pub sample: PointerSample,
    pub persist: Option<OverlayState>,
}

/// Per-session state, created at start and dropped at stop.
pub(crate) struct Session {
    overlay: OverlayHandle,
    tick: Tick,
    tracker: AttachmentTracker,
    machine: InteractionMachine,
    pointer: Option<DeviceIndex>,
    pointer_role: ControllerRole,
    submitted_width: f32,
}

impl Session {
    fn open(
        runtime: &mut dyn CompositorRuntime,
        bridge: &mut UploadBridge,
        config: &EngineConfig,
        initial: OverlayState,
    ) -> Result<Self, EngineError> {
        runtime.init_session()?;
        bridge.create(config.panel_width_px, config.panel_height_px)?;

        let overlay = runtime.create_overlay(&config.overlay_key, &config.overlay_name)?;
        let machine = InteractionMachine::new(GestureParams::from(config), initial);
        runtime.set_width_in_meters(overlay, machine.width())?;
        runtime.set_input_method(overlay, InputMethod::Mouse)?;

        let mut session = Self {
            overlay,
            tick: Tick::ZERO,
            tracker: AttachmentTracker::new(config.anchor_role, config.anchor_recheck_ticks),
            submitted_width: machine.width(),
            machine,
            pointer: None,
            pointer_role: config.pointer_role,
        };
        if let Some(anchor) = session.tracker.evaluate(runtime, Tick::ZERO)? {
            session.submit_placement(runtime, &anchor, config)?;
        }
        runtime.show(overlay)?;
        Ok(session)
    }

    fn anchor(&self) -> Result<AnchorState, FrameError> {
        self.tracker.state().ok_or(FrameError::NoAnchor)
    }

    /// Placement submitted for the current anchor.
    fn placement(&self, anchor: &AnchorState, config: &EngineConfig) -> RigidTransform {
        if anchor.is_head() {
            config.head_placement()
        } else {
            self.machine.local_transform()
        }
    }

    fn submit_placement(
        &self,
        runtime: &mut dyn CompositorRuntime,
        anchor: &AnchorState,
        config: &EngineConfig,
    ) -> Result<(), CompositorError> {
        let placement = self.placement(anchor, config);
        runtime.set_transform_relative_to_device(self.overlay, anchor.device, &placement)
    }

    fn resolve_pointer(&mut self, runtime: &mut dyn CompositorRuntime) -> Result<DeviceIndex, FrameError> {
        if let Some(device) = self.pointer {
            if runtime.is_device_connected(device)? {
                return Ok(device);
            }
            debug!(device = %device, "Pointing controller disconnected");
            self.pointer = None;
        }
        let found = match runtime.device_for_role(self.pointer_role)? {
            Some(device) => Some(device),
            None => runtime.device_for_role(self.pointer_role.opposite())?,
        };
        let device = found.ok_or(FrameError::NoPointer)?;
        info!(device = %device, "Pointing controller found");
        self.pointer = Some(device);
        Ok(device)
    }

    fn tick(
        &mut self,
        runtime: &mut dyn CompositorRuntime,
        config: &EngineConfig,
    ) -> Result<TickReport, FrameError> {
        self.tick = self.tick.advance(1);

        if self.tracker.is_due(self.tick) {
            if let Some(anchor) = self.tracker.evaluate(runtime, self.tick)? {
                self.submit_placement(runtime, &anchor, config)?;
                if let Some(state) = self.machine.finish_gesture() {
                    debug!(device = %anchor.device, "Anchor changed mid-gesture; gesture ended");
                    return Ok(TickReport {
                        sample: PointerSample::SUPPRESSED,
                        persist: Some(state),
                    });
                }
            }
        }

        let pointer = self.resolve_pointer(runtime)?;
        let anchor = self.anchor()?;
        let poses = runtime.poses(config.tracking_origin, MAX_TRACKED_DEVICES)?;
        let anchor_world = valid_pose(&poses, anchor.device)?;
        let hand_world = valid_pose(&poses, pointer)?;
        let trigger_down = runtime.button_state(pointer)?.trigger_down();

        let panel_world = panel_world_transform(&anchor_world, &self.placement(&anchor, config));
        let hit = pointer_ray(&hand_world, config.aim_offset())
            .and_then(|ray| raycast_panel(&ray, &panel_world, self.machine.width()))
            .map(|hit| hit.uv);

        let outcome = self.machine.step(TickInput {
            anchor_world,
            hand_world,
            hit,
            trigger_down,
            gestures_enabled: !anchor.is_head(),
        });
        if outcome.transform_changed {
            self.submit_placement(runtime, &anchor, config)?;
        }
        if outcome.width_changed && self.machine.width() != self.submitted_width {
            runtime.set_width_in_meters(self.overlay, self.machine.width())?;
            self.submitted_width = self.machine.width();
        }

        self.drain_events(runtime)?;
        Ok(TickReport {
            sample: outcome.sample,
            persist: outcome.persist,
        })
    }

    fn drain_events(&self, runtime: &mut dyn CompositorRuntime) -> Result<(), FrameError> {
        for _ in 0..MAX_EVENTS_PER_TICK {
            match runtime.poll_event(self.overlay)? {
                Some(CompositorEvent::Quit) => return Err(FrameError::QuitRequested),
                Some(event) => trace!(?event, "Overlay event ignored"),
                None => break,
            }
        }
        Ok(())
    }

    fn close(mut self, runtime: &mut dyn CompositorRuntime) -> (OverlayState, Option<OverlayState>) {
        let persist = self.machine.finish_gesture();
        if let Err(err) = runtime
            .hide(self.overlay)
            .and_then(|()| runtime.destroy_overlay(self.overlay))
        {
            debug!(%err, "Overlay teardown failed");
        }
        (self.machine.overlay_state(), persist)
    }
}

fn valid_pose(poses: &[TrackedPose], device: DeviceIndex) -> Result<RigidTransform, FrameError> {
    let pose = poses.get(device.slot()).ok_or(FrameError::MissingPose(device))?;
    if !pose.valid {
        return Err(FrameError::PoseInvalid(device));
    }
    Ok(pose.transform)
}

/// Worker thread state.
pub(crate) struct Worker {
    config: EngineConfig,
    runtime: Box<dyn CompositorRuntime>,
    bridge: UploadBridge,
    to_ui: SyncSender<ToUi>,
    pending: VecDeque<PointerSample>,
    placement: OverlayState,
    session: Option<Session>,
}

impl Worker {
    pub(crate) fn new(
        config: EngineConfig,
        runtime: Box<dyn CompositorRuntime>,
        bridge: UploadBridge,
        to_ui: SyncSender<ToUi>,
        placement: OverlayState,
    ) -> Self {
        Self {
            config,
            runtime,
            bridge,
            to_ui,
            pending: VecDeque::new(),
            placement: placement.sanitized(),
            session: None,
        }
    }

    /// Run until every sender is dropped.
    pub(crate) fn run(mut self, commands: Receiver<ToWorker>) {
        let interval = self.config.tick_interval();
        let mut next_tick = Instant::now() + interval;
        loop {
            let received = if self.session.is_some() {
                let wait = next_tick.saturating_duration_since(Instant::now());
                commands.recv_timeout(wait)
            } else {
                commands.recv().map_err(|_| RecvTimeoutError::Disconnected)
            };

            match received {
                Ok(ToWorker::Command(EngineCommand::Start)) => {
                    self.start();
                    next_tick = Instant::now() + interval;
                }
                Ok(ToWorker::Command(EngineCommand::Stop)) => self.stop(),
                Ok(ToWorker::UploadTexture(image)) => self.upload(&image),
                Err(RecvTimeoutError::Timeout) => {
                    self.tick();
                    next_tick += interval;
                    let now = Instant::now();
                    if next_tick < now {
                        next_tick = now + interval;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.stop();
        debug!("Engine worker exiting");
    }

    fn send(&self, message: ToUi) {
        match self.to_ui.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(message)) => warn!(?message, "UI channel full; message dropped"),
            Err(TrySendError::Disconnected(_)) => trace!("UI receiver gone"),
        }
    }

    /// Queue a pointer sample and flush what the channel accepts. While the
    /// UI lags, runs of samples with the same trigger state collapse to the
    /// latest one, so trigger transitions survive.
    fn send_sample(&mut self, sample: PointerSample) {
        match self.pending.back_mut() {
            Some(last) if last.trigger_down == sample.trigger_down => *last = sample,
            _ => self.pending.push_back(sample),
        }
        if self.pending.len() > MAX_PENDING_SAMPLES {
            self.pending.pop_front();
            trace!("UI lagging; oldest pointer sample dropped");
        }
        while let Some(sample) = self.pending.pop_front() {
            match self.to_ui.try_send(ToUi::PoseTick(sample)) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    self.pending.push_front(sample);
                    trace!(pending = self.pending.len(), "UI lagging; pointer samples held");
                    return;
                }
                Err(TrySendError::Disconnected(_)) => {
                    self.pending.clear();
                    return;
                }
            }
        }
    }

    pub(crate) fn start(&mut self) {
        if self.session.is_some() {
            debug!("Start requested while running");
            return;
        }
        match Session::open(self.runtime.as_mut(), &mut self.bridge, &self.config, self.placement) {
            Ok(session) => {
                info!(key = %self.config.overlay_key, "Overlay session started");
                self.session = Some(session);
                self.send(ToUi::Status(EngineStatus::Started {
                    ok: true,
                    message: "Connected".to_string(),
                }));
                self.send(ToUi::RenderFrame);
            }
            Err(err) => {
                warn!(%err, "Overlay session failed to start");
                self.bridge.release();
                self.runtime.shutdown_session();
                self.send(ToUi::Status(EngineStatus::Started {
                    ok: false,
                    message: err.to_string(),
                }));
            }
        }
    }

    fn teardown(&mut self) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        let (placement, persist) = session.close(self.runtime.as_mut());
        self.placement = placement;
        self.pending.clear();
        if let Some(state) = persist {
            self.send(ToUi::PersistState(state));
        }
        self.bridge.release();
        self.runtime.shutdown_session();
        true
    }

    pub(crate) fn stop(&mut self) {
        if self.teardown() {
            info!("Overlay session stopped");
            self.send(ToUi::Status(EngineStatus::Stopped));
        }
    }

    fn fail(&mut self, err: &dyn std::fmt::Display) {
        warn!(%err, "Overlay session lost");
        self.teardown();
        self.send(ToUi::Status(EngineStatus::Failed {
            message: err.to_string(),
        }));
    }

    pub(crate) fn tick(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.tick(self.runtime.as_mut(), &self.config) {
            Ok(report) => {
                self.send_sample(report.sample);
                if let Some(state) = report.persist {
                    self.placement = state;
                    self.send(ToUi::PersistState(state));
                }
            }
            Err(err) if err.is_fatal() => self.fail(&err),
            Err(err) => debug!(%err, "Tick skipped"),
        }
    }

    fn upload(&mut self, image: &PanelImage) {
        let Some(overlay) = self.session.as_ref().map(|session| session.overlay) else {
            trace!("Upload ignored while stopped");
            return;
        };
        match self.bridge.upload(self.runtime.as_mut(), overlay, image) {
            Ok(UploadOutcome::Uploaded) => {}
            Ok(UploadOutcome::Skipped) => debug!("Upload skipped; waiting for next render"),
            Err(err) if err.is_fatal() => self.fail(&err),
            Err(err) => warn!(%err, "Panel upload failed"),
        }
    }
}
