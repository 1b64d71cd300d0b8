use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::error::Result;

/// User preferences. Missing keys in a stored file fall back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub show_breaks: bool,
    pub auto_start_breaks: bool,
    pub auto_start_exercises: bool,
    /// Break length in seconds
    pub break_duration: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_breaks: true,
            auto_start_breaks: true,
            auto_start_exercises: true,
            break_duration: 10,
        }
    }
}

impl Settings {
    pub fn reset_to_defaults(&mut self) {
        *self = Settings::default();
    }

    /// Adds `delta` seconds to the break length, clamped at zero
    pub fn adjust_break_duration(&mut self, delta: i64) {
        self.break_duration = self.break_duration.saturating_add_signed(delta);
    }
}

pub trait ConfigStore {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Settings {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Settings::default(),
        };
        match serde_json::from_slice::<Settings>(&bytes) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("error loading settings from {}: {e}", self.path.display());
                Settings::default()
            }
        }
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings)?;
        fs::write(&self.path, data)?;
        log::info!("settings saved to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_settings() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let settings = Settings::default();
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn save_and_load_custom_settings() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nested").join("config.json"));
        let settings = Settings {
            show_breaks: false,
            auto_start_breaks: false,
            auto_start_exercises: false,
            break_duration: 45,
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn partial_file_merges_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"break_duration": 30, "show_breaks": false}"#).unwrap();

        let settings = FileConfigStore::with_path(&path).load();
        assert_eq!(settings.break_duration, 30);
        assert!(!settings.show_breaks);
        assert!(settings.auto_start_breaks);
        assert!(settings.auto_start_exercises);
    }

    #[test]
    fn corrupt_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Settings::default());
    }

    #[test]
    fn adjust_break_duration_clamps_at_zero() {
        let mut settings = Settings::default();
        settings.adjust_break_duration(-100);
        assert_eq!(settings.break_duration, 0);
        settings.adjust_break_duration(15);
        assert_eq!(settings.break_duration, 15);
        settings.reset_to_defaults();
        assert_eq!(settings, Settings::default());
    }
}
