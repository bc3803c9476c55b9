//! bup-backed snapshot store

use std::path::Path;
use std::process::Command;

use tracing::info;

use super::{SnapshotStore, StoreConfig};
use crate::error::{PbupError, PbupResult};
use crate::process::{run_capture, run_inherit};

/// Alias bup lists after the dated revisions of a branch
const LATEST_ALIAS: &str = "latest";

/// Drives the `bup` command line against one store directory
#[derive(Debug, Clone)]
pub struct BupStore {
    config: StoreConfig,
}

impl BupStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    fn bup(&self) -> Command {
        let mut cmd = Command::new(&self.config.bup_command);
        cmd.env("BUP_DIR", &self.config.store_dir);
        cmd
    }

    fn query(&self, args: &[&str]) -> PbupResult<String> {
        let mut cmd = self.bup();
        cmd.args(args);
        let output = run_capture(&mut cmd).map_err(|e| PbupError::StoreQuery(e.to_string()))?;
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl SnapshotStore for BupStore {
    fn root(&self) -> &Path {
        &self.config.store_dir
    }

    fn init(&self) -> PbupResult<()> {
        if self.config.store_dir.exists() {
            return Err(PbupError::store_exists(&self.config.store_dir));
        }

        let mut cmd = self.bup();
        cmd.arg("init");
        run_capture(&mut cmd)?;
        info!(store = %self.config.store_dir.display(), "initialized backup store");
        Ok(())
    }

    fn index(&self, path: &Path) -> PbupResult<()> {
        let mut cmd = self.bup();
        cmd.arg("index").arg(path);
        run_inherit(&mut cmd)
    }

    fn save(
        &self,
        name: &str,
        strip_prefix: &Path,
        path: &Path,
        compression_level: u8,
    ) -> PbupResult<()> {
        let mut strip = std::ffi::OsString::from("--strip-path=");
        strip.push(strip_prefix);

        let mut cmd = self.bup();
        cmd.arg("save")
            .arg(format!("-{}", compression_level))
            .arg("-n")
            .arg(name)
            .arg(strip)
            .arg(path);
        run_inherit(&mut cmd)
    }

    fn list_snapshots(&self) -> PbupResult<Vec<String>> {
        let listing = self.query(&["ls"])?;
        Ok(listing
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn list_revisions(&self, name: &str) -> PbupResult<String> {
        let listing = self.query(&["ls", name])?;
        Ok(strip_latest_alias(&listing))
    }

    fn ls(&self, name: &str) -> PbupResult<()> {
        let mut cmd = self.bup();
        cmd.args(["ls", "-l", name]);
        run_inherit(&mut cmd)
    }

    fn restore(
        &self,
        name: &str,
        revision: &str,
        folder: &str,
        dest_dir: &Path,
    ) -> PbupResult<()> {
        let mut cmd = self.bup();
        cmd.arg("restore")
            .arg("-C")
            .arg(dest_dir)
            .arg(format!("{}/{}/{}", name, revision, folder));
        run_inherit(&mut cmd)
    }

    fn disk_usage(&self) -> PbupResult<()> {
        let mut cmd = Command::new(&self.config.du_command);
        cmd.arg("-sh").arg(&self.config.store_dir);
        run_inherit(&mut cmd)
    }
}

/// Drop the `latest` alias so the last line is the newest dated revision
fn strip_latest_alias(listing: &str) -> String {
    listing
        .lines()
        .filter(|line| line.split_whitespace().last() != Some(LATEST_ALIAS))
        .map(|line| format!("{}\n", line))
        .collect()
}
