//! Packing and unpacking bundles with the system `tar`

use std::path::Path;
use std::process::Command;

use crate::error::{PbupError, PbupResult};
use crate::process::run_capture;

/// Runs `tar` to (de)serialize store directories
#[derive(Debug, Clone)]
pub struct Archiver {
    tar_command: String,
}

impl Archiver {
    pub fn new(tar_command: impl Into<String>) -> Self {
        Self {
            tar_command: tar_command.into(),
        }
    }

    /// Write `dir` (as a single top-level entry) and optional extra files
    /// from `extras_dir` into `archive`
    pub fn pack(
        &self,
        archive: &Path,
        dir: &Path,
        extras_dir: &Path,
        extras: &[&str],
    ) -> PbupResult<()> {
        let (_, name) = split_parent(dir)?;
        self.pack_as(archive, dir, &name.to_string_lossy(), extras_dir, extras)
    }

    /// Like [`Archiver::pack`], but store `dir` under the top-level name
    /// `entry_name`. A differing name is applied with GNU tar's `--transform`.
    pub fn pack_as(
        &self,
        archive: &Path,
        dir: &Path,
        entry_name: &str,
        extras_dir: &Path,
        extras: &[&str],
    ) -> PbupResult<()> {
        let (parent, name) = split_parent(dir)?;

        let mut cmd = Command::new(&self.tar_command);
        cmd.arg("-cf").arg(archive);
        if name.to_string_lossy() != entry_name {
            cmd.arg(format!(
                "--transform=s,^{}\\(/\\|$\\),{}\\1,S",
                escape_pattern(&name.to_string_lossy()),
                escape_replacement(entry_name)
            ));
        }
        cmd.arg("-C").arg(parent).arg(name);
        if !extras.is_empty() {
            cmd.arg("-C").arg(extras_dir).args(extras);
        }

        run_capture(&mut cmd)?;
        Ok(())
    }

    /// Extract `archive` into the existing directory `dest`
    pub fn unpack(&self, archive: &Path, dest: &Path) -> PbupResult<()> {
        let mut cmd = Command::new(&self.tar_command);
        cmd.arg("-xf").arg(archive).arg("-C").arg(dest);

        run_capture(&mut cmd)?;
        Ok(())
    }
}

fn split_parent(dir: &Path) -> PbupResult<(&Path, &std::ffi::OsStr)> {
    match (dir.parent(), dir.file_name()) {
        (Some(parent), Some(name)) => Ok((parent, name)),
        _ => Err(PbupError::Validation(format!(
            "cannot archive {}: no parent directory",
            dir.display()
        ))),
    }
}

/// Escape a literal for the basic-regex side of a `--transform` expression
fn escape_pattern(text: &str) -> String {
    escape_chars(text, &['.', '[', ']', '*', '^', '$', '\\', ','])
}

/// Escape a literal for the replacement side of a `--transform` expression
fn escape_replacement(text: &str) -> String {
    escape_chars(text, &['&', '\\', ','])
}

fn escape_chars(text: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
