//! Scripted overlay session against the simulated compositor.

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use glam::Vec3;
use tracing::{info, warn};
use wristpanel_compositor::SimulatedRuntime;
use wristpanel_core::{DeviceIndex, Uv};
use wristpanel_engine::{Engine, OverlayStore, UiBridge};
use wristpanel_math::RigidTransform;
use wristpanel_render::TextureBackend;
use wristpanel_testkit::{GestureScript, PanelGeometry, SessionReport, TraceSink};
use wristpanel_ui3d::{PanelAction, PanelManager, PanelSurface, RECORD_CALLBACK, SEND_CALLBACK};

use crate::config::AppConfig;

pub const ANCHOR_HAND: DeviceIndex = DeviceIndex(1);
pub const POINTER_HAND: DeviceIndex = DeviceIndex(2);

const STATUS_TIMEOUT: Duration = Duration::from_secs(5);
const PUMP_INTERVAL: Duration = Duration::from_millis(4);

/// Knobs for one demo run.
#[derive(Debug, Clone)]
pub struct DemoOptions {
    pub settle_ticks: u32,
    /// World-space distance the panel is dragged.
    pub drag: Vec3,
    /// Sideways hand travel during the resize, in meters.
    pub widen: f32,
    pub trace: Option<PathBuf>,
    pub screenshot: Option<PathBuf>,
}

struct Host {
    engine: Engine,
    ui: UiBridge<PanelManager>,
    trace: Option<TraceSink>,
    report: SessionReport,
}

impl Host {
    fn pump(&mut self) -> Result<()> {
        let trace = &mut self.trace;
        let mut trace_error = None;
        let pump = self.ui.pump_observed(&self.engine, |message| {
            if let Some(sink) = trace.as_mut() {
                if let Err(err) = sink.record(message) {
                    trace_error.get_or_insert(err);
                }
            }
        })?;
        if let Some(err) = trace_error {
            return Err(err.context("Failed to write trace"));
        }
        for action in &pump.actions {
            self.react(*action);
        }
        self.report.absorb(&pump);
        Ok(())
    }

    fn react(&mut self, action: PanelAction) {
        let PanelAction::Activated { callback_id, .. } = action;
        match callback_id {
            Some(RECORD_CALLBACK) => {
                let recording = !self.ui.panel().is_recording();
                self.ui.panel_mut().set_recording(recording);
                info!(recording, "Record toggled");
            }
            Some(SEND_CALLBACK) => info!("Send pressed"),
            _ => {}
        }
    }

    fn pump_for(&mut self, duration: Duration) -> Result<()> {
        let deadline = Instant::now() + duration;
        loop {
            self.pump()?;
            if Instant::now() >= deadline {
                return Ok(());
            }
            thread::sleep(PUMP_INTERVAL);
        }
    }

    fn pump_until(&mut self, mut done: impl FnMut(&Self) -> bool) -> Result<bool> {
        let deadline = Instant::now() + STATUS_TIMEOUT;
        loop {
            self.pump()?;
            if done(self) {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            thread::sleep(PUMP_INTERVAL);
        }
    }
}

fn button_center_uv(panel: &PanelManager, callback_id: u32) -> Result<Uv> {
    let handle = panel
        .button_with_callback(callback_id)
        .context("control panel has no button for callback")?;
    let rect = panel.element(handle).context("button element missing")?.rect;
    let (width, height) = panel.size();
    Ok(Uv::new(
        (rect.x as f32 + rect.width as f32 / 2.0) / width as f32,
        (rect.y as f32 + rect.height as f32 / 2.0) / height as f32,
    ))
}

/// Hover, click record, drag and resize the panel, then stop.
pub fn run_demo(
    app: &AppConfig,
    store: Box<dyn OverlayStore>,
    backend: Box<dyn TextureBackend>,
    options: &DemoOptions,
) -> Result<SessionReport> {
    let mut config = app.engine.clone().sanitized();
    let panel = PanelManager::control_panel(config.panel_width_px, config.panel_height_px, &config.regions);
    config.regions = panel.regions();
    let initial = store.load_overlay_state();

    let (runtime, rig) = SimulatedRuntime::new();
    let anchor_world = RigidTransform::from_translation(Vec3::new(0.0, 0.85, -0.15));
    rig.set_pose(ANCHOR_HAND, anchor_world);
    rig.bind_role(config.anchor_role, Some(ANCHOR_HAND));
    rig.bind_role(config.pointer_role, Some(POINTER_HAND));

    let geometry = PanelGeometry::new(anchor_world, initial, config.aim_offset());
    rig.set_pose(POINTER_HAND, geometry.hand_aiming_at(Uv::new(0.5, 0.5)));
    let script = GestureScript::tour(
        geometry,
        POINTER_HAND,
        button_center_uv(&panel, RECORD_CALLBACK)?,
        options.drag,
        options.widen,
        options.settle_ticks.max(1),
    );

    let trace = options
        .trace
        .as_ref()
        .map(|path| TraceSink::create(path, "demo", config.tick_rate_hz))
        .transpose()
        .context("Failed to create trace")?;
    let engine = Engine::spawn(config.clone(), Box::new(runtime), backend, initial)?;
    let mut host = Host {
        engine,
        ui: UiBridge::new(panel, store),
        trace,
        report: SessionReport::new("demo"),
    };

    host.engine.start()?;
    host.pump_until(|h| !h.report.statuses.is_empty())?;
    if host.ui.is_running() {
        let tick = config.tick_interval();
        script.play(&rig, |ticks| host.pump_for(tick * ticks))?;

        host.engine.stop()?;
        if !host.pump_until(|h| !h.ui.is_running())? {
            warn!("Engine did not confirm stop in time");
        }
    } else {
        warn!("VR overlay unavailable; continuing without it");
    }

    host.report.final_width = Some(host.ui.store().load_overlay_state().width);
    if let Some(path) = &options.screenshot {
        host.ui.panel_mut().render().save_png(path)?;
    }
    if let Some(sink) = host.trace.as_mut() {
        sink.flush()?;
    }
    host.engine.shutdown();
    Ok(host.report)
}
