//! pbup - per-project front-end for the bup backup tool
//!
//! Each project directory owns one bup store (`<project>/.bup`). pbup backs up
//! an allow-listed set of folders into it, and distributes whole stores as
//! version-stamped bundles that can only ever move a store forward in time.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Project paths, settings and the backup target allow-list
//! - `error`: Custom error types
//! - `store`: The snapshot store boundary and its bup implementation
//! - `backup`: Store versions, bundling and bundle import
//! - `cli`: Argument parsing and command dispatch
//!
//! # Limitations
//!
//! There is no locking. Two invocations against the same project at once
//! can corrupt the store or a bundle.
//!
//! # Example
//!
//! ```rust,ignore
//! use pbup::backup::resolve_version;
//! use pbup::store::{BupStore, StoreConfig};
//!
//! let store = BupStore::new(config);
//! println!("{}", resolve_version(&store, tz)?);
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod process;
pub mod store;

pub use error::{PbupError, PbupResult};
