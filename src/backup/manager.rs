//! Bundle manager for pbup
//!
//! Packages the whole backup store into a single archive stamped with the
//! store's resolved version. Bundling never overwrites: an archive with the
//! same name in the output directory is an error.

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use tracing::{info, warn};

use super::archive::{ArchiveName, BundleManifest, MANIFEST_FILE};
use super::tar::Archiver;
use super::version::{resolve_version, StoreVersion};
use crate::error::{PbupError, PbupResult};
use crate::store::SnapshotStore;

/// Suffix of archives still being written
const PARTIAL_SUFFIX: &str = "partial";

/// Creates bundles of one project's store
pub struct BundleManager<'a> {
    /// Store being bundled
    store: &'a dyn SnapshotStore,
    /// Project identifier embedded in bundle names
    project_id: String,
    archiver: Archiver,
    /// Timezone of revision timestamps
    timezone: FixedOffset,
}

/// A bundle that was written
#[derive(Debug, Clone)]
pub struct BundleInfo {
    pub path: PathBuf,
    pub version: StoreVersion,
    pub size_bytes: u64,
}

impl<'a> BundleManager<'a> {
    /// Create a new BundleManager
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

    /// Resolve the store's current version
    pub fn current_version(&self) -> PbupResult<StoreVersion> {
        resolve_version(self.store, self.timezone)
    }

    /// Write `{project_id}_{version}.tar` into `out_dir`
    ///
    /// The archive is written under a temporary name and renamed into place,
    /// so a failed bundle never leaves a file with the final name behind.
    /// A symlinked store is archived by its contents under the store's own
    /// name. `out_dir` must lie outside the store.
    pub fn create_bundle(&self, out_dir: &Path) -> PbupResult<BundleInfo> {
        let version = self.current_version()?;
        let name = ArchiveName::new(self.project_id.clone(), version);

        let store_dir = self.store.root();
        let real_store = store_dir.canonicalize().map_err(|e| {
            PbupError::Io(format!(
                "Failed to resolve store {}: {}",
                store_dir.display(),
                e
            ))
        })?;
        if resolve_lenient(out_dir)?.starts_with(&real_store) {
            return Err(PbupError::Validation(format!(
                "bundle directory {} is inside the store {}",
                out_dir.display(),
                store_dir.display()
            )));
        }

        let archive_path = out_dir.join(name.file_name());

        if archive_path.exists() {
            return Err(PbupError::archive_exists(&archive_path));
        }

        fs::create_dir_all(out_dir).map_err(|e| {
            PbupError::Io(format!(
                "Failed to create bundle directory {}: {}",
                out_dir.display(),
                e
            ))
        })?;

        let store_dir_name = store_dir
            .file_name()
            .or_else(|| real_store.file_name())
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let manifest_dir = tempfile::tempdir()
            .map_err(|e| PbupError::Io(format!("Failed to create staging directory: {}", e)))?;
        write_manifest(
            &manifest_dir.path().join(MANIFEST_FILE),
            &BundleManifest::new(&name, store_dir_name.clone()),
        )?;

        let partial_path = out_dir.join(format!("{}.{}", name.file_name(), PARTIAL_SUFFIX));
        let packed = self
            .archiver
            .pack_as(
                &partial_path,
                &real_store,
                &store_dir_name,
                manifest_dir.path(),
                &[MANIFEST_FILE],
            )
            .and_then(|_| {
                fs::rename(&partial_path, &archive_path).map_err(|e| {
                    PbupError::Io(format!("Failed to move bundle into place: {}", e))
                })
            });

        if let Err(err) = packed {
            if let Err(e) = fs::remove_file(&partial_path) {
                if e.kind() != ErrorKind::NotFound {
                    warn!(
                        path = %partial_path.display(),
                        error = %e,
                        "failed to remove partial bundle"
                    );
                }
            }
            return Err(err);
        }

        let size_bytes = fs::metadata(&archive_path).map(|m| m.len()).unwrap_or(0);
        info!(
            archive = %archive_path.display(),
            version = %version,
            size_bytes,
            "bundle created"
        );

        Ok(BundleInfo {
            path: archive_path,
            version,
            size_bytes,
        })
    }
}

/// Canonicalize the longest existing prefix of `path` and append the rest
fn resolve_lenient(path: &Path) -> PbupResult<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut missing = Vec::new();
    let mut current = absolute.as_path();
    loop {
        if let Ok(real) = current.canonicalize() {
            return Ok(missing
                .iter()
                .rev()
                .fold(real, |acc: PathBuf, part| acc.join(part)));
        }
        match (current.parent(), current.file_name()) {
            (Some(parent), Some(part)) => {
                missing.push(part.to_os_string());
                current = parent;
            }
            _ => return Ok(absolute),
        }
    }
}

fn write_manifest(path: &Path, manifest: &BundleManifest) -> PbupResult<()> {
    let file = File::create(path)
        .map_err(|e| PbupError::Io(format!("Failed to create manifest: {}", e)))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, manifest)
        .map_err(|e| PbupError::Json(format!("Failed to serialize manifest: {}", e)))?;
    writer
        .flush()
        .map_err(|e| PbupError::Io(format!("Failed to write manifest: {}", e)))?;
    Ok(())
}
