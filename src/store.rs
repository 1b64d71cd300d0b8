use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::error::Result;
use crate::exercise::Routine;

/// Where routines live between runs
pub trait RoutineStore {
    /// Every stored routine, in stored order. A missing file is an empty list.
    fn load(&self) -> Result<Vec<Routine>>;
    fn save(&self, routines: &[Routine]) -> Result<()>;
}

/// Routines as one pretty-printed JSON array
#[derive(Debug, Clone)]
pub struct FileRoutineStore {
    path: PathBuf,
}

impl FileRoutineStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::routines_path(),
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

impl Default for FileRoutineStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RoutineStore for FileRoutineStore {
    fn load(&self) -> Result<Vec<Routine>> {
        if !self.path.exists() {
            log::info!("no routines at {}, starting empty", self.path.display());
            return Ok(Vec::new());
        }
        let bytes = fs::read(&self.path)?;
        let routines: Vec<Routine> = serde_json::from_slice(&bytes)?;
        log::info!(
            "loaded {} routines from {}",
            routines.len(),
            self.path.display()
        );
        Ok(routines)
    }

    fn save(&self, routines: &[Routine]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(routines)?;
        fs::write(&self.path, data)?;
        log::debug!("saved {} routines", routines.len());
        Ok(())
    }
}

/// Finds a routine by name, ignoring case
pub fn find_routine<'a>(routines: &'a [Routine], name: &str) -> Option<&'a Routine> {
    routines
        .iter()
        .find(|r| r.name.eq_ignore_ascii_case(name.trim()))
}
