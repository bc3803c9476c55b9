//! Snapshot store pass-through commands
//!
//! `init`, `ds`, `backup`, `ls` and `restore` validate their inputs and hand
//! off to the snapshot store.

use std::path::Path;

use tracing::info;

use super::Context;
use crate::error::{PbupError, PbupResult};
use crate::store::{snapshot_name, SnapshotStore};

/// Create the project's store
pub fn init(ctx: &Context) -> PbupResult<()> {
    ctx.store().init()?;
    println!("Initialized backup store at {}", ctx.store().root().display());
    Ok(())
}

/// Print the size of the store
pub fn disk_usage(ctx: &Context) -> PbupResult<()> {
    ctx.paths.require_store()?;
    ctx.store().disk_usage()
}

/// Save the current content of `folder` as a new revision
pub fn backup(ctx: &Context, folder: &str) -> PbupResult<()> {
    ctx.paths.require_store()?;
    ctx.allow_list()?.check(folder)?;

    let real_path = resolve_folder(ctx.paths.base_dir(), folder)?;
    let real_dir = real_path
        .parent()
        .unwrap_or(real_path.as_path())
        .to_path_buf();
    let name = snapshot_name(folder);

    ctx.store().index(&real_path)?;
    ctx.store()
        .save(&name, &real_dir, &real_path, ctx.settings.compression_level)?;

    info!(snapshot = %name, path = %real_path.display(), "backup saved");
    Ok(())
}

/// List the revisions of `folder`
pub fn ls(ctx: &Context, folder: &str) -> PbupResult<()> {
    ctx.paths.require_store()?;
    ctx.allow_list()?.check(folder)?;

    ctx.store().ls(&snapshot_name(folder))
}

/// Restore `folder` at `revision` into the project's workdir
pub fn restore(ctx: &Context, folder: &str, revision: &str) -> PbupResult<()> {
    ctx.paths.require_store()?;
    ctx.allow_list()?.check(folder)?;

    let workdir = ctx.paths.workdir();
    if !workdir.is_dir() {
        return Err(PbupError::NotFound {
            kind: "Restore directory",
            path: workdir.display().to_string(),
        });
    }

    let destination = workdir.join(folder);
    if destination.exists() {
        return Err(PbupError::AlreadyExists {
            kind: "Restore destination",
            path: destination.display().to_string(),
        });
    }

    ctx.store()
        .restore(&snapshot_name(folder), revision, folder, &workdir)?;

    info!(
        folder,
        revision,
        destination = %destination.display(),
        "restore complete"
    );
    Ok(())
}

fn resolve_folder(base_dir: &Path, folder: &str) -> PbupResult<std::path::PathBuf> {
    let path = base_dir.join(folder);
    path.canonicalize().map_err(|_| PbupError::NotFound {
        kind: "Backup target",
        path: path.display().to_string(),
    })
}
