use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;
use wristpanel_engine::EngineConfig;

pub const DEFAULT_CONFIG_PATH: &str = "config/wristpanel.toml";
pub const DEFAULT_STATE_PATH: &str = "config/overlay_state.json";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where the panel placement is persisted between runs.
    pub overlay_state_path: PathBuf,
    /// Ticks each step of the demo gesture is held for.
    pub demo_settle_ticks: u32,
    pub engine: EngineConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            overlay_state_path: PathBuf::from(DEFAULT_STATE_PATH),
            demo_settle_ticks: 6,
            engine: EngineConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an explicit path, falling back to defaults.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<AppConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    AppConfig::default()
                }
            },
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else {
                    warn!("Config not found at {}. Using defaults", path.display());
                }
                AppConfig::default()
            }
        }
    }

    /// Save configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wristpanel_core::ControllerRole;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig::load_from_path(&dir.path().join("absent.toml"));
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "engine = [not toml").unwrap();
        assert_eq!(AppConfig::load_from_path(&path), AppConfig::default());
    }

    #[test]
    fn partial_engine_table_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        fs::write(
            &path,
            "demo_settle_ticks = 3\n\n[engine]\nresize_gain = 4.0\nanchor_role = \"right_hand\"\n\n[engine.regions]\ndrag_strip_max_v = 0.2\n",
        )
        .unwrap();
        let cfg = AppConfig::load_from_path(&path);
        assert_eq!(cfg.demo_settle_ticks, 3);
        assert_eq!(cfg.engine.resize_gain, 4.0);
        assert_eq!(cfg.engine.anchor_role, ControllerRole::RightHand);
        assert_eq!(cfg.engine.regions.drag_strip_max_v, 0.2);
        assert_eq!(cfg.engine.regions.resize_min_u, 0.85);
        assert_eq!(cfg.engine.tick_rate_hz, 60);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("wristpanel.toml");
        let mut cfg = AppConfig::default();
        cfg.engine.move_sensitivity = 1.5;
        cfg.engine.overlay_key = "test.panel".into();
        cfg.save_to_path(&path).unwrap();
        assert_eq!(AppConfig::load_from_path(&path), cfg);
    }
}
