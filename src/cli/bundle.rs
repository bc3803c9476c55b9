//! Bundle CLI commands
//!
//! Implements `version`, `bundle`, `unbundle` and `update`.

use std::path::{Path, PathBuf};

use super::Context;
use crate::backup::{resolve_version, BundleManager, ImportManager};
use crate::error::PbupResult;

/// Print the store's current version
pub fn version(ctx: &Context) -> PbupResult<()> {
    ctx.paths.require_store()?;
    let version = resolve_version(ctx.store(), ctx.timezone)?;
    println!("{}", version);
    Ok(())
}

/// Write a bundle of the store into `out_dir` (or the configured default)
pub fn bundle(ctx: &Context, out_dir: Option<&str>) -> PbupResult<()> {
    ctx.paths.require_store()?;

    let out_dir = bundle_dir(ctx, out_dir);
    let manager = BundleManager::new(
        ctx.store(),
        ctx.paths.project_id(),
        ctx.archiver(),
        ctx.timezone,
    );

    let bundle = manager.create_bundle(&out_dir)?;
    println!("{}", bundle.path.display());
    Ok(())
}

/// Install a bundle as the project's store
pub fn unbundle(ctx: &Context, archive: &str) -> PbupResult<()> {
    let result = importer(ctx).unbundle(Path::new(archive))?;
    println!("{}", result.summary());
    Ok(())
}

/// Replace the project's store with a newer bundle
pub fn update(ctx: &Context, archive: &str) -> PbupResult<()> {
    let result = importer(ctx).update(Path::new(archive))?;
    println!("{}", result.summary());
    Ok(())
}

fn importer(ctx: &Context) -> ImportManager<'_> {
    ImportManager::new(
        ctx.store(),
        ctx.paths.project_id(),
        ctx.archiver(),
        ctx.timezone,
    )
}

/// Explicit directory, else `bundle_dir` from settings, else the project dir
fn bundle_dir(ctx: &Context, out_dir: Option<&str>) -> PathBuf {
    match (out_dir, ctx.settings.bundle_dir.as_deref()) {
        (Some(dir), _) => PathBuf::from(dir),
        (None, Some(dir)) => ctx.paths.base_dir().join(dir),
        (None, None) => ctx.paths.base_dir().to_path_buf(),
    }
}
