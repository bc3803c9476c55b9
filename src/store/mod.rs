//! Snapshot store boundary
//!
//! pbup does not implement storage, deduplication or indexing itself. It
//! drives an external content-addressed backup engine through the
//! [`SnapshotStore`] trait; [`BupStore`] is the production implementation.
//!
//! The store location travels in a [`StoreConfig`] handed to the adapter,
//! never through process-wide environment state.

use std::path::{Path, PathBuf};

use crate::error::PbupResult;

mod bup;
#[cfg(test)]
pub(crate) mod fixture;

pub use bup::BupStore;

/// Prefix of snapshot names created by `backup`
pub const SNAPSHOT_PREFIX: &str = "local-";

/// Snapshot name for a backed-up folder
pub fn snapshot_name(folder: &str) -> String {
    format!("{}{}", SNAPSHOT_PREFIX, folder)
}

/// Explicit configuration for every snapshot store call
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Store directory
    pub store_dir: PathBuf,
    /// bup executable
    pub bup_command: String,
    /// du executable
    pub du_command: String,
}

/// Primitives pbup needs from the backup engine
pub trait SnapshotStore {
    /// Store root directory
    fn root(&self) -> &Path;

    /// Create a new empty store; fails if the path exists
    fn init(&self) -> PbupResult<()>;

    /// Register the current content of `path`
    fn index(&self, path: &Path) -> PbupResult<()>;

    /// Commit indexed content of `path` as a new revision of `name`
    fn save(
        &self,
        name: &str,
        strip_prefix: &Path,
        path: &Path,
        compression_level: u8,
    ) -> PbupResult<()>;

    /// Names of all snapshots in the store
    fn list_snapshots(&self) -> PbupResult<Vec<String>>;

    /// Revision listing of `name`, oldest first.
    ///
    /// The last whitespace-delimited token of the last line is the newest
    /// revision's timestamp (`YYYY-MM-DD-HHMMSS`).
    fn list_revisions(&self, name: &str) -> PbupResult<String>;

    /// Print a long listing of `name` for the operator
    fn ls(&self, name: &str) -> PbupResult<()>;

    /// Materialize `name/revision/folder` under `dest_dir`
    fn restore(&self, name: &str, revision: &str, folder: &str, dest_dir: &Path)
        -> PbupResult<()>;

    /// Print the human-readable size of the store
    fn disk_usage(&self) -> PbupResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_name() {
        assert_eq!(snapshot_name("data"), "local-data");
    }
}
