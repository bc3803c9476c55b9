//! Path management for pbup
//!
//! Every path pbup touches is derived from a single project base directory.
//!
//! ## Base Directory Resolution Order
//!
//! 1. `--project-dir` flag or `PBUP_PROJECT_DIR` environment variable
//! 2. The current working directory

use std::path::{Path, PathBuf};

use crate::error::PbupError;

/// Name of the backup store directory inside a project
pub const STORE_DIR_NAME: &str = ".bup";

/// Manages all paths used by pbup for one project
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    /// Project base directory
    base_dir: PathBuf,
    /// Project identifier (last component of the base directory)
    project_id: String,
}

impl ProjectPaths {
    /// Create ProjectPaths for the given directory, or the current directory
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be resolved or has no
    /// usable final component to serve as the project identifier.
    pub fn new(base_dir: Option<PathBuf>) -> Result<Self, PbupError> {
        let base_dir = match base_dir {
            Some(dir) => dir,
            None => std::env::current_dir().map_err(|e| {
                PbupError::Config(format!("Could not determine current directory: {}", e))
            })?,
        };

        let base_dir = base_dir.canonicalize().map_err(|_| PbupError::NotFound {
            kind: "Project directory",
            path: base_dir.display().to_string(),
        })?;

        Self::with_base_dir(base_dir)
    }

    /// Create ProjectPaths with an explicit base directory, without resolving it
    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self, PbupError> {
        let project_id = base_dir
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                PbupError::Config(format!(
                    "Cannot derive a project name from {}",
                    base_dir.display()
                ))
            })?;

        Ok(Self {
            base_dir,
            project_id,
        })
    }

    /// Get the project base directory
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the project identifier used in bundle names
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Get the backup store directory (<base>/.bup)
    pub fn store_dir(&self) -> PathBuf {
        self.base_dir.join(STORE_DIR_NAME)
    }

    /// Get the params directory (<base>/params)
    pub fn params_dir(&self) -> PathBuf {
        self.base_dir.join("params")
    }

    /// Get the path to the backup target allow-list
    pub fn targets_file(&self) -> PathBuf {
        self.params_dir().join("bup_targets.txt")
    }

    /// Get the path to the optional settings file
    pub fn settings_file(&self) -> PathBuf {
        self.params_dir().join("pbup.json")
    }

    /// Get the restore destination directory (<base>/workdir)
    pub fn workdir(&self) -> PathBuf {
        self.base_dir.join("workdir")
    }

    /// Check if the project has a backup store
    #[cfg(test)]
    pub fn has_store(&self) -> bool {
        self.store_dir().is_dir()
    }

    /// Fail with `NotFound` unless the backup store exists
    pub fn require_store(&self) -> Result<PathBuf, PbupError> {
        let store_dir = self.store_dir();
        if store_dir.is_dir() {
            Ok(store_dir)
        } else {
            Err(PbupError::store_not_found(&store_dir))
        }
    }
}
