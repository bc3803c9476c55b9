//! Bundle import for pbup
//!
//! `unbundle` installs a bundle as a fresh store; `update` replaces an
//! existing store with a strictly newer bundle. Both validate the archive's
//! name before touching the filesystem.
//!
//! Archives are extracted into a staging directory next to the store and
//! checked there (exactly one top-level directory, manifest agreement)
//! before anything is moved into place. `update` moves the old store aside,
//! renames the new one in, and puts the old one back if that rename fails.
//! A crash between those two renames can still leave the store absent; the
//! old store then sits in the `.pbup-staging-*` directory next to it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use tempfile::TempDir;
use tracing::{error, info, warn};

use super::archive::{ArchiveName, BundleManifest, MANIFEST_FILE};
use super::tar::Archiver;
use super::version::{resolve_version, StoreVersion};
use crate::error::{PbupError, PbupResult};
use crate::store::SnapshotStore;

const STAGING_PREFIX: &str = ".pbup-staging-";

/// Installs bundles into one project's store location
pub struct ImportManager<'a> {
    /// Store being installed or replaced; its root is the target path
    store: &'a dyn SnapshotStore,
    /// Project identifier archives must carry
    project_id: String,
    archiver: Archiver,
    /// Timezone of revision timestamps
    timezone: FixedOffset,
}

/// An archive extracted and validated in a staging directory
#[derive(Debug)]
struct StagedStore {
    staging: TempDir,
    root: PathBuf,
    manifest: Option<BundleManifest>,
}

impl<'a> ImportManager<'a> {
    /// Create a new ImportManager
    pub fn new(
        store: &'a dyn SnapshotStore,
        project_id: impl Into<String>,
        archiver: Archiver,
        timezone: FixedOffset,
    ) -> Self {
        Self {
            store,
            project_id: project_id.into(),
            archiver,
            timezone,
        }
    }

    /// Install `archive` as a new store; the store path must not exist
    pub fn unbundle(&self, archive: &Path) -> PbupResult<ImportResult> {
        let target = self.store.root();
        if target.exists() {
            return Err(PbupError::store_exists(target));
        }

        let name = self.validate_archive(archive)?;
        let staged = self.stage(archive, &name, target)?;

        fs::rename(&staged.root, target).map_err(|e| {
            PbupError::Io(format!(
                "Failed to move extracted store to {}: {}",
                target.display(),
                e
            ))
        })?;
        close_staging(staged.staging);

        info!(
            archive = %archive.display(),
            version = %name.version,
            store = %target.display(),
            "bundle unpacked"
        );

        Ok(ImportResult {
            archive_version: name.version,
            previous_version: None,
            has_manifest: staged.manifest.is_some(),
        })
    }

    /// Replace the existing store with a strictly newer `archive`
    pub fn update(&self, archive: &Path) -> PbupResult<ImportResult> {
        let target = self.store.root();
        if !target.is_dir() {
            return Err(PbupError::store_not_found(target));
        }

        let name = self.validate_archive(archive)?;
        let current = resolve_version(self.store, self.timezone)?;
        if name.version <= current {
            return Err(PbupError::StaleBundle {
                archive: name.version.to_string(),
                current: current.to_string(),
            });
        }

        let staged = self.stage(archive, &name, target)?;
        let staged = swap_into_place(staged, target)?;
        let has_manifest = staged.manifest.is_some();
        close_staging(staged.staging);

        match resolve_version(self.store, self.timezone) {
            Ok(resolved) if resolved != name.version => warn!(
                archive_version = %name.version,
                resolved = %resolved,
                "updated store resolves to a different version than its bundle"
            ),
            Ok(_) => {}
            Err(err) => warn!(error = %err, "could not re-resolve updated store version"),
        }

        info!(
            archive = %archive.display(),
            from = %current,
            to = %name.version,
            store = %target.display(),
            "store updated"
        );

        Ok(ImportResult {
            archive_version: name.version,
            previous_version: Some(current),
            has_manifest,
        })
    }

    /// Check an archive's name against this project without extracting it
    pub fn validate_archive(&self, archive: &Path) -> PbupResult<ArchiveName> {
        let name = ArchiveName::parse_for_project(archive, &self.project_id, self.timezone)?;
        if !archive.is_file() {
            return Err(PbupError::NotFound {
                kind: "Archive",
                path: archive.display().to_string(),
            });
        }
        Ok(name)
    }

    /// Extract `archive` next to `target` and validate its layout
    fn stage(&self, archive: &Path, name: &ArchiveName, target: &Path) -> PbupResult<StagedStore> {
        let parent = target.parent().ok_or_else(|| {
            PbupError::Validation(format!("store path has no parent: {}", target.display()))
        })?;

        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(parent)
            .map_err(|e| {
                PbupError::Io(format!(
                    "Failed to create staging directory in {}: {}",
                    parent.display(),
                    e
                ))
            })?;

        let extract_dir = staging.path().join("extract");
        fs::create_dir(&extract_dir)?;
        self.archiver.unpack(archive, &extract_dir)?;

        let (root, manifest) = inspect_layout(&extract_dir, archive)?;
        if let Some(manifest) = &manifest {
            manifest.check_against(name)?;
        }

        Ok(StagedStore {
            staging,
            root,
            manifest,
        })
    }
}

/// Find the single top-level directory and the optional manifest
fn inspect_layout(
    extract_dir: &Path,
    archive: &Path,
) -> PbupResult<(PathBuf, Option<BundleManifest>)> {
    let mut dirs = Vec::new();
    let mut manifest = None;

    for entry in fs::read_dir(extract_dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            dirs.push(path);
        } else if entry.file_name() == MANIFEST_FILE && file_type.is_file() {
            let contents = fs::read_to_string(&path)?;
            let parsed: BundleManifest = serde_json::from_str(&contents).map_err(|e| {
                PbupError::Validation(format!(
                    "archive '{}' has an unreadable manifest: {}",
                    archive.display(),
                    e
                ))
            })?;
            manifest = Some(parsed);
        } else {
            return Err(PbupError::Validation(format!(
                "archive '{}' has unexpected top-level entry '{}'",
                archive.display(),
                entry.file_name().to_string_lossy()
            )));
        }
    }

    if dirs.len() != 1 {
        return Err(PbupError::Validation(format!(
            "archive '{}' must contain exactly one top-level directory, found {}",
            archive.display(),
            dirs.len()
        )));
    }

    Ok((dirs.remove(0), manifest))
}

/// Replace `target` with the staged store, rolling back if the swap fails.
///
/// If the rollback fails too, the staging directory holding the previous
/// store is kept on disk and named in the error.
fn swap_into_place(staged: StagedStore, target: &Path) -> PbupResult<StagedStore> {
    swap_with(staged, target, |from, to| fs::rename(from, to))
}

fn swap_with<F>(staged: StagedStore, target: &Path, mut rename: F) -> PbupResult<StagedStore>
where
    F: FnMut(&Path, &Path) -> io::Result<()>,
{
    let previous = staged.staging.path().join("previous");

    rename(target, &previous).map_err(|e| {
        PbupError::Io(format!(
            "Failed to move current store {} aside: {}",
            target.display(),
            e
        ))
    })?;

    if let Err(e) = rename(&staged.root, target) {
        if let Err(rollback) = rename(&previous, target) {
            let kept = staged.staging.keep().join("previous");
            error!(
                previous = %kept.display(),
                error = %rollback,
                "failed to put the previous store back"
            );
            return Err(PbupError::Io(format!(
                "Failed to move new store into {} ({}); previous store left at {}",
                target.display(),
                e,
                kept.display()
            )));
        }
        return Err(PbupError::Io(format!(
            "Failed to move new store into {}: {}",
            target.display(),
            e
        )));
    }

    Ok(staged)
}

fn close_staging(staging: TempDir) {
    let path = staging.path().to_path_buf();
    if let Err(e) = staging.close() {
        warn!(path = %path.display(), error = %e, "failed to remove staging directory");
    }
}

/// Result of an import
#[derive(Debug, Clone)]
pub struct ImportResult {
    /// Version embedded in the archive
    pub archive_version: StoreVersion,
    /// Version of the store that was replaced (update only)
    pub previous_version: Option<StoreVersion>,
    /// Whether the archive carried a manifest
    pub has_manifest: bool,
}

impl ImportResult {
    /// Get a summary of what was imported
    pub fn summary(&self) -> String {
        match self.previous_version {
            Some(previous) => format!(
                "Updated store from {} to {}",
                previous, self.archive_version
            ),
            None => format!("Installed store at version {}", self.archive_version),
        }
    }
}
