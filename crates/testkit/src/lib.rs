#![warn(missing_docs)]
//! Scripted sessions and trace capture for the overlay engine.

mod metrics;
mod script;

use anyhow::{bail, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use wristpanel_engine::{Engine, EngineStatus, ToUi};

pub use metrics::*;
pub use script::*;

/// First line of every trace file.
#[derive(Debug, Serialize)]
pub struct TraceHeader<'a> {
    /// Session name.
    pub session: &'a str,
    /// Wall-clock start (RFC 3339).
    pub started_at: String,
    /// Worker tick rate.
    pub tick_rate_hz: u32,
}

/// One worker message, flattened for JSONL.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceEvent {
    /// Pointer sample.
    Pointer {
        /// Hit point, if any.
        uv: Option<[f32; 2]>,
        /// Trigger state.
        trigger: bool,
    },
    /// Repaint request.
    Repaint,
    /// Lifecycle change.
    Status {
        /// Short label.
        status: &'static str,
        /// Detail, if any.
        message: Option<String>,
    },
    /// Placement handed to the store.
    Persist {
        /// Local translation.
        translation: [f32; 3],
        /// Width in meters.
        width: f32,
    },
}

impl From<&ToUi> for TraceEvent {
    fn from(message: &ToUi) -> Self {
        match message {
            ToUi::PoseTick(sample) => TraceEvent::Pointer {
                uv: sample.hit.map(|uv| [uv.u, uv.v]),
                trigger: sample.trigger_down,
            },
            ToUi::RenderFrame => TraceEvent::Repaint,
            ToUi::Status(status) => {
                let (status, message) = match status {
                    EngineStatus::Started { ok: true, message } => ("started", Some(message.clone())),
                    EngineStatus::Started { ok: false, message } => {
                        ("start_failed", Some(message.clone()))
                    }
                    EngineStatus::Stopped => ("stopped", None),
                    EngineStatus::Failed { message } => ("failed", Some(message.clone())),
                };
                TraceEvent::Status { status, message }
            }
            ToUi::PersistState(state) => TraceEvent::Persist {
                translation: state.transform.translation().to_array(),
                width: state.width,
            },
        }
    }
}

/// Trace line: sequence number plus event.
#[derive(Debug, Serialize)]
pub struct TickRecord {
    /// Message sequence number.
    pub seq: u64,
    /// Event payload.
    #[serde(flatten)]
    pub event: TraceEvent,
}

/// A sink that writes newline-delimited JSON to disk.
pub struct TraceSink {
    writer: BufWriter<File>,
    seq: u64,
}

impl TraceSink {
    /// Create a trace at `path` (parent directories included) and write the
    /// header line.
    pub fn create<P: AsRef<Path>>(path: P, session: &str, tick_rate_hz: u32) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        let mut sink = Self {
            writer: BufWriter::new(File::create(path)?),
            seq: 0,
        };
        sink.write_line(&TraceHeader {
            session,
            started_at: chrono::Utc::now().to_rfc3339(),
            tick_rate_hz,
        })?;
        Ok(sink)
    }

    fn write_line<T: Serialize>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer(&mut self.writer, value)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    /// Append a worker message.
    pub fn record(&mut self, message: &ToUi) -> Result<()> {
        let record = TickRecord {
            seq: self.seq,
            event: TraceEvent::from(message),
        };
        self.seq += 1;
        self.write_line(&record)
    }

    /// Records written so far (header excluded).
    pub fn len(&self) -> u64 {
        self.seq
    }

    /// Whether no records were written.
    pub fn is_empty(&self) -> bool {
        self.seq == 0
    }

    /// Flush buffered lines.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Collect worker messages until one satisfies `done`.
///
/// Returns every message received, the matching one last. Fails when
/// `timeout` elapses first.
pub fn wait_for<F>(engine: &Engine, timeout: Duration, mut done: F) -> Result<Vec<ToUi>>
where
    F: FnMut(&ToUi) -> bool,
{
    let deadline = Instant::now() + timeout;
    let mut seen = Vec::new();
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            bail!("timed out after {timeout:?}; saw {} messages", seen.len());
        }
        if let Some(message) = engine.recv_timeout(remaining)? {
            let matched = done(&message);
            seen.push(message);
            if matched {
                return Ok(seen);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wristpanel_core::{PointerSample, Uv};
    use wristpanel_engine::OverlayState;

    #[test]
    fn trace_sink_writes_header_then_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.jsonl");
        let mut sink = TraceSink::create(&path, "unit", 60).unwrap();
        sink.record(&ToUi::PoseTick(PointerSample::new(Some(Uv::new(0.5, 0.25)), true)))
            .unwrap();
        sink.record(&ToUi::PersistState(OverlayState::default())).unwrap();
        sink.flush().unwrap();
        assert_eq!(sink.len(), 2);

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["session"], "unit");
        assert_eq!(lines[1]["kind"], "pointer");
        assert_eq!(lines[1]["uv"][1], serde_json::json!(0.25));
        assert_eq!(lines[2]["seq"], 1);
        assert_eq!(lines[2]["width"], serde_json::json!(0.4));
    }

    #[test]
    fn suppressed_sample_traces_as_empty_pointer() {
        assert_eq!(
            TraceEvent::from(&ToUi::PoseTick(PointerSample::SUPPRESSED)),
            TraceEvent::Pointer {
                uv: None,
                trigger: false
            }
        );
    }
}
