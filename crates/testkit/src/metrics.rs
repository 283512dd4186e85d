//! Session summary exported as JSON for CI artifacts.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use wristpanel_engine::{EngineStatus, PumpReport};

/// Overall outcome of a scripted session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionResult {
    /// The session started and stopped cleanly.
    Pass,
    /// The session failed to start or was lost.
    Fail,
}

/// Counters accumulated over a scripted session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    /// Session name.
    pub name: String,
    /// When the report was created (RFC 3339).
    pub timestamp: String,
    /// Outcome.
    pub result: SessionResult,
    /// Pointer samples delivered to the panel.
    pub samples: usize,
    /// Panel activations.
    pub activations: usize,
    /// Images queued for upload.
    pub uploads: usize,
    /// Placements persisted.
    pub persisted: usize,
    /// Status messages seen, in order.
    pub statuses: Vec<String>,
    /// Final panel width in meters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_width: Option<f32>,
}

impl SessionReport {
    /// Empty passing report stamped with the current time.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            result: SessionResult::Pass,
            samples: 0,
            activations: 0,
            uploads: 0,
            persisted: 0,
            statuses: Vec::new(),
            final_width: None,
        }
    }

    /// Fold one pump into the totals.
    pub fn absorb(&mut self, pump: &PumpReport) {
        self.samples += pump.samples;
        self.activations += pump.actions.len();
        self.uploads += pump.uploads;
        self.persisted += pump.persisted;
        for status in &pump.statuses {
            if matches!(
                status,
                EngineStatus::Failed { .. } | EngineStatus::Started { ok: false, .. }
            ) {
                self.result = SessionResult::Fail;
            }
            self.statuses.push(status_label(status));
        }
    }

    /// Write as pretty JSON, creating parent directories.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }
}

fn status_label(status: &EngineStatus) -> String {
    match status {
        EngineStatus::Started { ok: true, .. } => "started".to_string(),
        EngineStatus::Started { ok: false, message } => format!("start_failed: {message}"),
        EngineStatus::Stopped => "stopped".to_string(),
        EngineStatus::Failed { message } => format!("failed: {message}"),
    }
}
