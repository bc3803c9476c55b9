//! File-backed snapshot store for tests
//!
//! Each snapshot is a file `<root>/snapshots/<name>` holding its revision
//! listing. Because the listing lives inside the store directory it travels
//! with bundles, so a store rebuilt from an archive reports the archived
//! revisions.

use std::fs;
use std::path::{Path, PathBuf};

use super::SnapshotStore;
use crate::error::{PbupError, PbupResult};

pub(crate) struct FixtureStore {
    root: PathBuf,
}

impl FixtureStore {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the store directory with one payload file
    pub(crate) fn create(root: impl Into<PathBuf>) -> Self {
        let store = Self::new(root);
        fs::create_dir_all(store.root.join("snapshots")).unwrap();
        fs::write(store.root.join("config"), "[core]\nbare = true\n").unwrap();
        store
    }

    /// Append revisions to a snapshot's listing
    pub(crate) fn add_revisions(&self, name: &str, revisions: &[&str]) {
        let path = self.root.join("snapshots").join(name);
        let mut listing = fs::read_to_string(&path).unwrap_or_default();
        for revision in revisions {
            listing.push_str(revision);
            listing.push('\n');
        }
        fs::write(path, listing).unwrap();
    }
}

impl SnapshotStore for FixtureStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn init(&self) -> PbupResult<()> {
        if self.root.exists() {
            return Err(PbupError::store_exists(&self.root));
        }
        fs::create_dir_all(self.root.join("snapshots"))?;
        Ok(())
    }

    fn index(&self, _path: &Path) -> PbupResult<()> {
        Ok(())
    }

    fn save(&self, name: &str, _strip: &Path, _path: &Path, _level: u8) -> PbupResult<()> {
        self.add_revisions(name, &["2024-01-01-000000"]);
        Ok(())
    }

    fn list_snapshots(&self) -> PbupResult<Vec<String>> {
        let dir = self.root.join("snapshots");
        let entries = fs::read_dir(&dir)
            .map_err(|e| PbupError::StoreQuery(format!("{}: {}", dir.display(), e)))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PbupError::StoreQuery(e.to_string()))?;
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        names.sort();
        Ok(names)
    }

    fn list_revisions(&self, name: &str) -> PbupResult<String> {
        let path = self.root.join("snapshots").join(name);
        fs::read_to_string(&path)
            .map_err(|e| PbupError::StoreQuery(format!("{}: {}", path.display(), e)))
    }

    fn ls(&self, _name: &str) -> PbupResult<()> {
        Ok(())
    }

    fn restore(&self, _name: &str, _rev: &str, _folder: &str, _dest: &Path) -> PbupResult<()> {
        Ok(())
    }

    fn disk_usage(&self) -> PbupResult<()> {
        Ok(())
    }
}
