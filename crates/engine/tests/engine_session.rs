//! End-to-end sessions: real worker thread, simulated compositor, memory
//! texture backend.

use std::thread;
use std::time::{Duration, Instant};

use glam::Vec3;
use wristpanel_compositor::{RigHandle, SimulatedRuntime};
use wristpanel_core::{ControllerRole, DeviceIndex, PointerSample, Uv};
use wristpanel_engine::{
    Engine, EngineConfig, EngineStatus, MemoryOverlayStore, OverlayState, OverlayStore, ToUi,
    UiBridge,
};
use wristpanel_math::RigidTransform;
use wristpanel_render::{MemoryBackend, MemoryTextureProbe};
use wristpanel_ui3d::{PanelManager, RegionLayout};

const LEFT: DeviceIndex = DeviceIndex(1);
const RIGHT: DeviceIndex = DeviceIndex(2);
const TIMEOUT: Duration = Duration::from_secs(3);
const KEY: &str = "wristpanel.control";

fn anchor_world() -> RigidTransform {
    RigidTransform::from_translation(Vec3::new(0.0, 0.85, -0.15))
}

/// Hand pose (unrotated) whose default pointer ray crosses `uv` on a panel
/// at the default placement with width `width`.
fn aim(uv: Uv, width: f32) -> RigidTransform {
    let local = OverlayState::default().transform.translation()
        + Vec3::new((uv.u - 0.5) * width, (0.5 - uv.v) * width, 0.0);
    let point = anchor_world().transform_point(local);
    let direction = Vec3::new(0.0, -0.707, -0.707).normalize();
    RigidTransform::from_translation(point - direction * 0.7)
}

struct Harness {
    engine: Engine,
    rig: RigHandle,
    probe: MemoryTextureProbe,
    store: MemoryOverlayStore,
    ui: UiBridge<PanelManager>,
}

fn harness_with(config: EngineConfig) -> Harness {
    let (runtime, rig) = SimulatedRuntime::new();
    let (backend, probe) = MemoryBackend::new();
    let store = MemoryOverlayStore::new();
    rig.bind_role(ControllerRole::LeftHand, Some(LEFT));
    rig.bind_role(ControllerRole::RightHand, Some(RIGHT));
    rig.set_pose(LEFT, anchor_world());
    rig.set_pose(RIGHT, aim(Uv::new(0.5, 0.5), 0.4));

    let engine = Engine::spawn(
        config.clone(),
        Box::new(runtime),
        Box::new(backend),
        store.load_overlay_state(),
    )
    .unwrap();
    let panel = PanelManager::control_panel(config.panel_width_px, config.panel_height_px, &config.regions);
    let ui = UiBridge::new(panel, Box::new(store.clone()));
    Harness {
        engine,
        rig,
        probe,
        store,
        ui,
    }
}

fn harness() -> Harness {
    harness_with(EngineConfig::default())
}

impl Harness {
    /// Pump the UI bridge until `done` holds, collecting statuses.
    fn pump_until(&mut self, mut done: impl FnMut(&Self) -> bool) -> Vec<EngineStatus> {
        let deadline = Instant::now() + TIMEOUT;
        let mut statuses = Vec::new();
        loop {
            let report = self.ui.pump(&self.engine).unwrap();
            statuses.extend(report.statuses);
            if done(self) {
                return statuses;
            }
            assert!(Instant::now() < deadline, "condition not reached; statuses {statuses:?}");
            thread::sleep(Duration::from_millis(2));
        }
    }

    fn start(&mut self) {
        self.engine.start().unwrap();
        let statuses = self.pump_until(|h| h.ui.is_running());
        assert!(matches!(
            statuses.first(),
            Some(EngineStatus::Started { ok: true, message }) if message == "Connected"
        ));
    }

    /// Wait for a pointer sample matching `pred` without going through the UI.
    fn wait_sample(&self, mut pred: impl FnMut(PointerSample) -> bool) -> Vec<ToUi> {
        let deadline = Instant::now() + TIMEOUT;
        let mut seen = Vec::new();
        while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
            if let Some(message) = self.engine.recv_timeout(remaining).unwrap() {
                let matched = matches!(message, ToUi::PoseTick(sample) if pred(sample));
                seen.push(message);
                if matched {
                    return seen;
                }
            }
        }
        panic!("no matching sample; saw {} messages", seen.len());
    }
}

#[test]
fn start_shows_overlay_and_uploads_first_frame() {
    let mut h = harness();
    h.start();

    h.pump_until(|h| {
        h.rig
            .overlay(KEY)
            .is_some_and(|overlay| overlay.texture_submissions > 0)
    });
    let overlay = h.rig.overlay(KEY).unwrap();
    assert!(overlay.visible);
    assert_eq!(overlay.parent, Some(LEFT));
    let texture = overlay.texture.unwrap();
    assert_eq!((texture.width, texture.height), (800, 800));
    assert_eq!(h.probe.live_textures(), 1);
}

#[test]
fn failed_start_reports_and_keeps_host_alive() {
    let (runtime, rig) = SimulatedRuntime::new();
    rig.fail_next_init("runtime not installed");
    let (backend, probe) = MemoryBackend::new();
    let engine = Engine::spawn(
        EngineConfig::default(),
        Box::new(runtime),
        Box::new(backend),
        OverlayState::default(),
    )
    .unwrap();
    let panel = PanelManager::control_panel(800, 800, &RegionLayout::default());
    let mut ui = UiBridge::new(panel, Box::new(MemoryOverlayStore::new()));

    engine.start().unwrap();
    let deadline = Instant::now() + TIMEOUT;
    let status = loop {
        let report = ui.pump(&engine).unwrap();
        if let Some(status) = report.statuses.into_iter().next() {
            break status;
        }
        assert!(Instant::now() < deadline);
        thread::sleep(Duration::from_millis(2));
    };
    assert!(matches!(
        status,
        EngineStatus::Started { ok: false, ref message } if message.contains("runtime not installed")
    ));
    assert!(!ui.is_running());
    assert_eq!(probe.live_textures(), 0);
    assert!(!rig.session_active());

    // A second start succeeds once the runtime is reachable.
    engine.start().unwrap();
    let deadline = Instant::now() + TIMEOUT;
    while !ui.is_running() {
        ui.pump(&engine).unwrap();
        assert!(Instant::now() < deadline);
        thread::sleep(Duration::from_millis(2));
    }
}

#[test]
fn centered_aim_reaches_ui_as_panel_center() {
    let h = harness();
    h.engine.start().unwrap();
    let seen = h.wait_sample(|sample| sample.hit.is_some());
    let Some(ToUi::PoseTick(sample)) = seen.last() else {
        unreachable!()
    };
    let uv = sample.hit.unwrap();
    assert!((uv.u - 0.5).abs() < 1e-3 && (uv.v - 0.5).abs() < 1e-3, "{uv:?}");
    assert!(!sample.trigger_down);
}

#[test]
fn resize_gesture_persists_new_width() {
    let mut h = harness();
    h.start();

    let start = aim(Uv::new(0.95, 0.95), 0.4);
    h.rig.set_pose(RIGHT, start);
    h.wait_sample(|s| s.hit.is_some_and(|uv| uv.u > 0.9 && uv.v > 0.9));

    h.rig.set_trigger(RIGHT, true);
    h.wait_sample(|s| s == PointerSample::SUPPRESSED);

    h.rig.set_pose(RIGHT, start.with_translation(start.translation() + Vec3::X * 0.05));
    h.pump_until(|h| {
        h.rig
            .overlay(KEY)
            .is_some_and(|overlay| (overlay.width - 0.5).abs() < 1e-4)
    });

    h.rig.set_trigger(RIGHT, false);
    h.pump_until(|h| h.store.saves() == 1);
    let stored = h.store.stored().unwrap();
    assert!((stored.width - 0.5).abs() < 1e-4, "{stored:?}");
    assert_eq!(stored.transform, OverlayState::default().transform);
}

#[test]
fn drag_moves_panel_and_keeps_placement_across_restart() {
    let mut h = harness();
    h.start();

    let grab = aim(Uv::new(0.5, 0.05), 0.4);
    h.rig.set_pose(RIGHT, grab);
    h.wait_sample(|s| s.hit.is_some_and(|uv| uv.v < 0.15));
    h.rig.set_trigger(RIGHT, true);
    h.wait_sample(|s| s == PointerSample::SUPPRESSED);

    h.rig.set_pose(RIGHT, grab.with_translation(grab.translation() + Vec3::new(0.1, 0.0, 0.0)));
    h.pump_until(|h| {
        h.rig
            .overlay(KEY)
            .and_then(|overlay| overlay.transform)
            .is_some_and(|t| (t.translation().x - 0.1).abs() < 1e-4)
    });
    h.rig.set_trigger(RIGHT, false);
    h.pump_until(|h| h.store.saves() == 1);
    let moved = h.store.stored().unwrap();
    assert!((moved.transform.translation() - Vec3::new(0.1, 0.25, -0.35)).length() < 1e-4);

    // Stop/start inside the same engine keeps the dragged placement.
    h.engine.stop().unwrap();
    let statuses = h.pump_until(|h| !h.ui.is_running());
    assert_eq!(statuses, vec![EngineStatus::Stopped]);
    h.start();
    let overlay = h.rig.overlay(KEY).unwrap();
    assert!(overlay.transform.unwrap().approx_eq(&moved.transform, 1e-5));
}

#[test]
fn anchor_swap_reparents_without_moving_panel() {
    let config = EngineConfig {
        anchor_recheck_ticks: 2,
        ..EngineConfig::default()
    };
    let mut h = harness_with(config);
    h.start();
    let before = h.rig.overlay(KEY).unwrap().transform.unwrap();

    let spare = DeviceIndex(5);
    h.rig.set_pose(spare, anchor_world());
    h.rig.bind_role(ControllerRole::LeftHand, Some(spare));
    h.pump_until(|h| h.rig.overlay(KEY).is_some_and(|o| o.parent == Some(spare)));
    assert_eq!(h.rig.overlay(KEY).unwrap().transform.unwrap(), before);
}

#[test]
fn session_loss_reports_failure() {
    let mut h = harness();
    h.start();
    h.rig.lose_session();
    let statuses = h.pump_until(|h| !h.ui.is_running());
    assert!(
        matches!(statuses.last(), Some(EngineStatus::Failed { .. })),
        "{statuses:?}"
    );
    assert_eq!(h.probe.live_textures(), 0);
}

#[test]
fn stop_is_idempotent_and_releases_everything() {
    let mut h = harness();
    h.engine.stop().unwrap();
    h.start();
    h.pump_until(|h| h.probe.live_textures() == 1);

    h.engine.stop().unwrap();
    h.engine.stop().unwrap();
    let statuses = h.pump_until(|h| !h.ui.is_running());
    assert_eq!(statuses, vec![EngineStatus::Stopped]);
    assert_eq!(h.probe.live_textures(), 0);
    assert_eq!(h.rig.overlay_count(), 0);
    assert!(!h.rig.session_active());
    assert!(h.engine.recv_timeout(Duration::from_millis(100)).unwrap().is_none());
}

#[test]
fn dropping_engine_tears_session_down() {
    let mut h = harness();
    h.start();
    let Harness { engine, rig, .. } = h;
    drop(engine);
    assert!(!rig.session_active());
    assert_eq!(rig.overlay_count(), 0);
}
