//! Bundle archive naming and manifest
//!
//! Bundles are named `{project_id}_{YYYY-MM-DD-HHMMSS}.tar`. The project id
//! is everything before the last underscore of the stem, so ids that
//! contain underscores round-trip.
//!
//! Bundles written by pbup also carry a [`BundleManifest`] next to the
//! store directory. Archives without one are accepted on the strength of
//! their filename.

use std::path::Path;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use super::version::StoreVersion;
use crate::error::{PbupError, PbupResult};

/// Extension of bundle archives
pub const ARCHIVE_EXTENSION: &str = "tar";

/// Manifest entry stored at the top level of a bundle
pub const MANIFEST_FILE: &str = "pbup-manifest.json";

/// Current manifest schema version
pub const MANIFEST_FORMAT_VERSION: u32 = 1;

/// Identity of a bundle as encoded in its filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveName {
    pub project_id: String,
    pub version: StoreVersion,
}

impl ArchiveName {
    pub fn new(project_id: impl Into<String>, version: StoreVersion) -> Self {
        Self {
            project_id: project_id.into(),
            version,
        }
    }

    /// `{project_id}_{version}.tar`
    pub fn file_name(&self) -> String {
        format!("{}_{}.{}", self.project_id, self.version, ARCHIVE_EXTENSION)
    }

    /// Parse the identity out of an archive path
    pub fn parse(path: &Path, timezone: FixedOffset) -> PbupResult<Self> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                PbupError::Validation(format!("invalid archive name: {}", path.display()))
            })?;

        let stem = file_name
            .strip_suffix(ARCHIVE_EXTENSION)
            .and_then(|rest| rest.strip_suffix('.'))
            .ok_or_else(|| {
                PbupError::Validation(format!(
                    "archive '{}' must have the .{} extension",
                    file_name, ARCHIVE_EXTENSION
                ))
            })?;

        let (project_id, token) = stem
            .rsplit_once('_')
            .filter(|(project_id, _)| !project_id.is_empty())
            .ok_or_else(|| {
                PbupError::Validation(format!(
                    "archive '{}' is not named <project>_<version>.{}",
                    file_name, ARCHIVE_EXTENSION
                ))
            })?;

        let version = StoreVersion::parse(token, timezone).ok_or_else(|| {
            PbupError::Validation(format!(
                "archive '{}' has an invalid version '{}' (expected YYYY-MM-DD-HHMMSS)",
                file_name, token
            ))
        })?;

        Ok(Self::new(project_id, version))
    }

    /// Parse an archive path and require it to belong to `project_id`
    pub fn parse_for_project(
        path: &Path,
        project_id: &str,
        timezone: FixedOffset,
    ) -> PbupResult<Self> {
        let name = Self::parse(path, timezone)?;
        if name.project_id != project_id {
            return Err(PbupError::Validation(format!(
                "archive '{}' belongs to project '{}', expected '{}'",
                path.display(),
                name.project_id,
                project_id
            )));
        }
        Ok(name)
    }
}

/// Metadata embedded in every bundle pbup writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleManifest {
    /// Schema version for migration support
    pub format_version: u32,
    pub project_id: String,
    /// Store version in `YYYY-MM-DD-HHMMSS` form
    pub version: String,
    /// Name of the top-level store directory inside the archive
    pub store_dir_name: String,
    /// When the bundle was written
    pub created_at: DateTime<Utc>,
}

impl BundleManifest {
    pub fn new(name: &ArchiveName, store_dir_name: impl Into<String>) -> Self {
        Self {
            format_version: MANIFEST_FORMAT_VERSION,
            project_id: name.project_id.clone(),
            version: name.version.to_string(),
            store_dir_name: store_dir_name.into(),
            created_at: Utc::now(),
        }
    }

    /// Require the manifest to agree with the archive's filename
    pub fn check_against(&self, name: &ArchiveName) -> PbupResult<()> {
        if self.format_version > MANIFEST_FORMAT_VERSION {
            return Err(PbupError::Validation(format!(
                "unsupported manifest format version {} (newest known: {})",
                self.format_version, MANIFEST_FORMAT_VERSION
            )));
        }
        if self.project_id != name.project_id {
            return Err(PbupError::Validation(format!(
                "manifest project '{}' does not match archive name project '{}'",
                self.project_id, name.project_id
            )));
        }
        let expected = name.version.to_string();
        if self.version != expected {
            return Err(PbupError::Validation(format!(
                "manifest version {} does not match archive name version {}",
                self.version, expected
            )));
        }
        Ok(())
    }
}
