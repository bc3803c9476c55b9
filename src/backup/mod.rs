//! Versioned bundle distribution for pbup
//!
//! Adds a versioning layer on top of the snapshot store: a store's version
//! is the newest revision across all of its snapshots, and whole stores
//! travel between machines as version-stamped tar bundles.
//!
//! # Architecture
//!
//! - `version`: `StoreVersion` and `resolve_version`
//! - `archive`: bundle naming (`{project}_{version}.tar`) and the embedded manifest
//! - `BundleManager`: packages a store into a bundle
//! - `ImportManager`: installs (`unbundle`) or replaces (`update`) a store from a bundle
//!
//! # Invariants
//!
//! - Bundling never overwrites an existing archive.
//! - An update never moves a store backward or sideways in time: the
//!   bundle's version must be strictly newer than the store's.
//! - Archive identity is checked before any filesystem mutation.
//!
//! # Example
//!
//! ```rust,ignore
//! use pbup::backup::{Archiver, BundleManager, ImportManager};
//!
//! let bundle = BundleManager::new(&store, "alpha", Archiver::new("tar"), tz)
//!     .create_bundle(&out_dir)?;
//!
//! // On another machine
//! let result = ImportManager::new(&store, "alpha", Archiver::new("tar"), tz)
//!     .update(&bundle.path)?;
//! println!("{}", result.summary());
//! ```

pub mod archive;
mod manager;
mod restore;
mod tar;
pub mod version;

pub use archive::{ArchiveName, BundleManifest};
pub use manager::{BundleInfo, BundleManager};
pub use restore::{ImportManager, ImportResult};
pub use tar::Archiver;
pub use version::{resolve_version, StoreVersion};
