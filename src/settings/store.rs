use std::path::{Path, PathBuf};

use crate::settings::types::CaptureSettings;

/// Environment variable naming the settings file.
pub const SETTINGS_PATH_ENV: &str = "ARSNAP_SETTINGS";

/// JSON-file backed capture settings.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the path named by `ARSNAP_SETTINGS`, if set.
    pub fn from_env() -> Option<Self> {
        std::env::var_os(SETTINGS_PATH_ENV).map(|p| Self::new(PathBuf::from(p)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings from a JSON file, returning defaults on a missing file.
    pub fn load(path: &Path) -> Result<CaptureSettings, String> {
        if !path.exists() {
            return Ok(CaptureSettings::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        let settings: CaptureSettings =
            serde_json::from_str(&contents).map_err(|e| e.to_string())?;
        Ok(settings.validated())
    }

    /// Load this store's file, falling back to defaults on any error.
    pub fn load_or_default(&self) -> CaptureSettings {
        Self::load(&self.path).unwrap_or_else(|e| {
            tracing::warn!(
                "Failed to load settings from {}: {e}; using defaults",
                self.path.display()
            );
            CaptureSettings::default()
        })
    }

    /// Save settings to disk atomically (write .tmp then rename).
    pub fn save(&self, settings: &CaptureSettings) -> Result<(), String> {
        let json = serde_json::to_string_pretty(settings).map_err(|e| e.to_string())?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json).map_err(|e| e.to_string())?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| e.to_string())?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (SettingsStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(dir.path().join("capture.json"));
        (store, dir)
    }

    #[test]
    fn load_returns_default_when_file_missing() {
        let dir = TempDir::new().unwrap();
        let result = SettingsStore::load(&dir.path().join("nonexistent.json")).unwrap();
        assert_eq!(result, CaptureSettings::default());
    }

    #[test]
    fn load_parses_and_validates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("capture.json");
        std::fs::write(&path, r#"{"maxPixelRatio": 2.0, "jpegQuality": 250}"#).unwrap();

        let settings = SettingsStore::load(&path).unwrap();
        assert_eq!(settings.max_pixel_ratio, 2.0);
        assert_eq!(settings.jpeg_quality, 100);
    }

    #[test]
    fn load_returns_error_for_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("capture.json");
        std::fs::write(&path, "not valid json!!!").unwrap();

        assert!(SettingsStore::load(&path).is_err());
    }

    #[test]
    fn load_or_default_recovers_from_invalid_json() {
        let (store, _dir) = temp_store();
        std::fs::write(store.path(), "{").unwrap();
        assert_eq!(store.load_or_default(), CaptureSettings::default());
    }

    #[test]
    fn save_round_trips_through_load() {
        let (store, _dir) = temp_store();
        let settings = CaptureSettings {
            jpeg_quality: 80,
            preview_exit_ms: 250,
            ..CaptureSettings::default()
        };
        store.save(&settings).unwrap();

        assert_eq!(SettingsStore::load(store.path()).unwrap(), settings);
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deep").join("capture.json");
        let store = SettingsStore::new(path.clone());
        store.save(&CaptureSettings::default()).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn save_is_atomic() {
        let (store, dir) = temp_store();
        store.save(&CaptureSettings::default()).unwrap();

        let tmp_path = dir.path().join("capture.json.tmp");
        assert!(
            !tmp_path.exists(),
            ".tmp file should be cleaned up after rename"
        );
    }
}
