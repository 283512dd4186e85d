//! wristpanel - hand-attached VR control panel
//!
//! Runs a scripted overlay session against the simulated compositor: the
//! control panel is attached to the left hand, the right hand hovers and
//! clicks it, drags it by its top strip and widens it by its corner handle.
//! The resulting placement is persisted for the next run.

mod config;
mod overlay_store;
mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec3;
use tracing::{info, warn};
use wristpanel_render::{MemoryBackend, TextureBackend};

use config::AppConfig;
use overlay_store::JsonOverlayStore;
use session::DemoOptions;

#[derive(Parser, Debug)]
#[command(author, version, about = "Hand-attached VR control panel (simulated session)", long_about = None)]
struct Args {
    /// Configuration file (TOML)
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Overlay state file; overrides `overlay_state_path` from the config
    #[arg(long)]
    state: Option<PathBuf>,

    /// Write every worker message as JSON lines to this file
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Write a session summary (JSON) to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Save the final panel image as PNG
    #[arg(long)]
    screenshot: Option<PathBuf>,

    /// Ticks each gesture step is held for; overrides the config
    #[arg(long)]
    settle_ticks: Option<u32>,

    /// Distance (meters) the panel is dragged along X
    #[arg(long, default_value_t = 0.1, allow_negative_numbers = true)]
    drag: f32,

    /// Sideways hand travel (meters) while resizing
    #[arg(long, default_value_t = 0.05, allow_negative_numbers = true)]
    widen: f32,

    /// Upload panel images through a headless wgpu device
    #[arg(long)]
    gpu: bool,

    /// Write the effective configuration to --config and exit
    #[arg(long)]
    write_config: bool,
}

fn texture_backend(use_gpu: bool) -> Result<Box<dyn TextureBackend>> {
    #[cfg(feature = "gpu")]
    if use_gpu {
        let backend = wristpanel_render::WgpuBackend::new_headless()
            .context("Failed to open headless wgpu device")?;
        return Ok(Box::new(backend));
    }
    #[cfg(not(feature = "gpu"))]
    if use_gpu {
        warn!("--gpu needs the `gpu` feature; using the CPU texture backend");
    }
    let (backend, _probe) = MemoryBackend::new();
    Ok(Box::new(backend))
}

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting wristpanel v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let mut app = AppConfig::load_from_path(&args.config);
    if let Some(state) = args.state.clone() {
        app.overlay_state_path = state;
    }
    if args.write_config {
        app.save_to_path(&args.config)
            .with_context(|| format!("Failed to write {}", args.config.display()))?;
        println!("Wrote {}", args.config.display());
        return Ok(());
    }

    let store = JsonOverlayStore::new(app.overlay_state_path.clone());
    let options = DemoOptions {
        settle_ticks: args.settle_ticks.unwrap_or(app.demo_settle_ticks),
        drag: Vec3::new(args.drag, 0.0, 0.0),
        widen: args.widen,
        trace: args.trace.clone(),
        screenshot: args.screenshot.clone(),
    };
    let backend = texture_backend(args.gpu)?;
    let report = session::run_demo(&app, Box::new(store), backend, &options)?;

    if let Some(path) = &args.report {
        report.write_json(path)?;
    }
    println!(
        "{:?}: {} samples, {} clicks, {} uploads, {} placements saved, width {:.3} m",
        report.result,
        report.samples,
        report.activations,
        report.uploads,
        report.persisted,
        report.final_width.unwrap_or_default(),
    );
    Ok(())
}
