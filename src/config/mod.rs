//! Configuration module for pbup
//!
//! This module provides configuration management including:
//! - Project path resolution
//! - Optional per-project settings
//! - The backup target allow-list

pub mod paths;
pub mod settings;
pub mod targets;

pub use paths::ProjectPaths;
pub use settings::Settings;
pub use targets::TargetAllowList;
