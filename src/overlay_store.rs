//! Overlay placement persisted as pretty JSON.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use wristpanel_engine::{OverlayState, OverlayStore, StoreError};

/// [`OverlayStore`] backed by a JSON file.
#[derive(Debug, Clone)]
pub struct JsonOverlayStore {
    path: PathBuf,
}

impl JsonOverlayStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn field<T: DeserializeOwned>(doc: &Value, name: &str, path: &Path) -> Option<T> {
    let value = doc.get(name)?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!("Ignoring malformed `{name}` in {}: {err}", path.display());
            None
        }
    }
}

impl OverlayStore for JsonOverlayStore {
    fn load_overlay_state(&self) -> OverlayState {
        let defaults = OverlayState::default();
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("No overlay state at {}; using defaults", self.path.display());
                return defaults;
            }
            Err(err) => {
                warn!("Failed to read {}: {err}. Using defaults", self.path.display());
                return defaults;
            }
        };
        let doc: Value = match serde_json::from_str(&contents) {
            Ok(doc) => doc,
            Err(err) => {
                warn!("Failed to parse {}: {err}. Using defaults", self.path.display());
                return defaults;
            }
        };
        OverlayState {
            transform: field(&doc, "transform", &self.path).unwrap_or(defaults.transform),
            width: field(&doc, "width", &self.path).unwrap_or(defaults.width),
        }
        .sanitized()
    }

    fn save_overlay_state(&mut self, state: &OverlayState) -> Result<(), StoreError> {
        let json =
            serde_json::to_string_pretty(state).map_err(|err| StoreError::Encode(err.to_string()))?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json)?;
        fs::rename(&staging, &self.path)?;
        debug!(width = state.width, "Overlay state saved to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use wristpanel_math::RigidTransform;

    fn store() -> (tempfile::TempDir, JsonOverlayStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonOverlayStore::new(dir.path().join("config").join("overlay_state.json"));
        (dir, store)
    }

    #[test]
    fn missing_file_loads_defaults() {
        let (_dir, store) = store();
        assert_eq!(store.load_overlay_state(), OverlayState::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let (_dir, mut store) = store();
        let state = OverlayState {
            transform: RigidTransform::from_translation(Vec3::new(0.1, 0.3, -0.4)),
            width: 0.75,
        };
        store.save_overlay_state(&state).unwrap();
        assert_eq!(store.load_overlay_state(), state);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn garbage_loads_defaults() {
        let (_dir, store) = store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{ not json").unwrap();
        assert_eq!(store.load_overlay_state(), OverlayState::default());
    }

    #[test]
    fn bad_width_keeps_good_transform() {
        let (_dir, mut store) = store();
        let state = OverlayState {
            transform: RigidTransform::from_translation(Vec3::new(0.0, 0.2, -0.3)),
            width: 0.5,
        };
        store.save_overlay_state(&state).unwrap();
        let mut doc: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        doc["width"] = Value::String("wide".into());
        fs::write(store.path(), doc.to_string()).unwrap();

        let loaded = store.load_overlay_state();
        assert_eq!(loaded.transform, state.transform);
        assert_eq!(loaded.width, OverlayState::default().width);
    }
}
