use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "routiner";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }

    fn config_dir() -> PathBuf {
        Self::project_dirs()
            .map(|pd| pd.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// `$HOME/.local/state/routiner`, or the platform data dir without a HOME
    fn state_dir() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".local")
                .join("state")
                .join(APP_NAME)
        } else {
            Self::project_dirs()
                .map(|pd| pd.data_local_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."))
        }
    }

    pub fn routines_path() -> PathBuf {
        Self::config_dir().join("routines.json")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.json")
    }

    pub fn history_path() -> PathBuf {
        Self::state_dir().join("history.db")
    }

    pub fn log_path() -> PathBuf {
        Self::state_dir().join("routiner.log")
    }
}
