//! CLI command handlers
//!
//! This module parses the operation mode and target, sets up the project
//! context, and dispatches to the snapshot store or the bundle layer.

use std::path::PathBuf;

use chrono::FixedOffset;
use clap::{Parser, ValueEnum};
use tracing::info;

use crate::backup::Archiver;
use crate::config::{ProjectPaths, Settings, TargetAllowList};
use crate::error::{PbupError, PbupResult};
use crate::logging::init_logging;
use crate::store::{BupStore, StoreConfig};

pub mod bundle;
pub mod store;

#[derive(Parser, Debug)]
#[command(
    name = "pbup",
    about = "Per-project bup backups with versioned bundles",
    long_about = "pbup keeps a bup store in <project>/.bup, backs up the folders listed \
                  in params/bup_targets.txt, and moves whole stores between machines as \
                  version-stamped bundles.",
    disable_version_flag = true
)]
pub struct Cli {
    /// Operation to perform
    #[arg(value_enum)]
    pub mode: Mode,

    /// Folder (backup, ls, restore), archive (unbundle, update) or output directory (bundle)
    pub target: Option<String>,

    /// Revision to restore
    #[arg(long = "version", default_value = "latest")]
    pub revision: String,

    /// Project directory (defaults to the current directory)
    #[arg(long, env = "PBUP_PROJECT_DIR")]
    pub project_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Index and save a folder as a new revision
    Backup,
    /// List revisions of a folder
    Ls,
    /// Restore a folder revision into ./workdir
    Restore,
    /// Show the disk usage of the store
    Ds,
    /// Create the project's store
    Init,
    /// Package the store into {project}_{version}.tar
    Bundle,
    /// Install a bundle as the project's store
    Unbundle,
    /// Replace the store with a newer bundle
    Update,
    /// Print the store version
    Version,
}

impl Mode {
    fn as_str(&self) -> &'static str {
        match self {
            Mode::Backup => "backup",
            Mode::Ls => "ls",
            Mode::Restore => "restore",
            Mode::Ds => "ds",
            Mode::Init => "init",
            Mode::Bundle => "bundle",
            Mode::Unbundle => "unbundle",
            Mode::Update => "update",
            Mode::Version => "version",
        }
    }
}

/// Everything one invocation needs, passed explicitly to each handler
pub struct Context {
    pub paths: ProjectPaths,
    pub settings: Settings,
    pub timezone: FixedOffset,
    store: BupStore,
}

impl Context {
    pub fn new(paths: ProjectPaths, settings: Settings) -> PbupResult<Self> {
        let timezone = settings.timezone()?;
        let store = BupStore::new(StoreConfig {
            store_dir: paths.store_dir(),
            bup_command: settings.bup_command.clone(),
            du_command: settings.du_command.clone(),
        });

        Ok(Self {
            paths,
            settings,
            timezone,
            store,
        })
    }

    pub fn store(&self) -> &BupStore {
        &self.store
    }

    pub fn archiver(&self) -> Archiver {
        Archiver::new(self.settings.tar_command.clone())
    }

    pub fn allow_list(&self) -> PbupResult<TargetAllowList> {
        TargetAllowList::load(&self.paths.targets_file())
    }
}

/// Run one invocation
pub fn run(cli: Cli) -> PbupResult<()> {
    let paths = ProjectPaths::new(cli.project_dir.clone())?;
    let settings = Settings::load_or_default(&paths);
    init_logging(
        settings
            .as_ref()
            .map(|s| s.log_format)
            .unwrap_or_default(),
    );
    let ctx = Context::new(paths, settings?)?;

    info!(
        project = %ctx.paths.project_id(),
        mode = cli.mode.as_str(),
        "project name: {}",
        ctx.paths.project_id()
    );

    match cli.mode {
        Mode::Init => store::init(&ctx),
        Mode::Ds => store::disk_usage(&ctx),
        Mode::Backup => store::backup(&ctx, require_target(&cli)?),
        Mode::Ls => store::ls(&ctx, require_target(&cli)?),
        Mode::Restore => store::restore(&ctx, require_target(&cli)?, &cli.revision),
        Mode::Version => bundle::version(&ctx),
        Mode::Bundle => bundle::bundle(&ctx, cli.target.as_deref()),
        Mode::Unbundle => bundle::unbundle(&ctx, require_target(&cli)?),
        Mode::Update => bundle::update(&ctx, require_target(&cli)?),
    }
}

fn require_target(cli: &Cli) -> PbupResult<&str> {
    cli.target
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            PbupError::Validation(format!("mode '{}' requires a target", cli.mode.as_str()))
        })
}
