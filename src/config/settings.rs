//! Settings for pbup
//!
//! Optional per-project settings read from `params/pbup.json`. Every field
//! has a default, so a missing file or a partial file is fine.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use super::paths::ProjectPaths;
use crate::error::PbupError;
use crate::logging::LogFormat;

/// Per-project settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// bup executable
    #[serde(default = "default_bup_command")]
    pub bup_command: String,

    /// tar executable used to pack and unpack bundles
    #[serde(default = "default_tar_command")]
    pub tar_command: String,

    /// du executable used by `ds`
    #[serde(default = "default_du_command")]
    pub du_command: String,

    /// Compression level passed to `bup save` (0-9)
    #[serde(default = "default_compression_level")]
    pub compression_level: u8,

    /// Fixed UTC offset, in seconds, of revision timestamps
    #[serde(default)]
    pub utc_offset_seconds: i32,

    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,

    /// Default output directory for `bundle` (relative to the project dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_dir: Option<String>,
}

fn default_bup_command() -> String {
    "bup".to_string()
}

fn default_tar_command() -> String {
    "tar".to_string()
}

fn default_du_command() -> String {
    "du".to_string()
}

fn default_compression_level() -> u8 {
    9
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bup_command: default_bup_command(),
            tar_command: default_tar_command(),
            du_command: default_du_command(),
            compression_level: default_compression_level(),
            utc_offset_seconds: 0,
            log_format: LogFormat::default(),
            bundle_dir: None,
        }
    }
}

impl Settings {
    /// Load settings from disk, falling back to defaults if the file doesn't exist
    pub fn load_or_default(paths: &ProjectPaths) -> Result<Self, PbupError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| PbupError::Io(format!("Failed to read settings file: {}", e)))?;

        let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
            PbupError::Config(format!(
                "Failed to parse settings file {}: {}",
                settings_path.display(),
                e
            ))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the external tools would not accept
    pub fn validate(&self) -> Result<(), PbupError> {
        if self.compression_level > 9 {
            return Err(PbupError::Config(format!(
                "compression_level must be between 0 and 9, got {}",
                self.compression_level
            )));
        }
        self.timezone()?;
        Ok(())
    }

    /// The fixed timezone revision timestamps are read in
    pub fn timezone(&self) -> Result<FixedOffset, PbupError> {
        FixedOffset::east_opt(self.utc_offset_seconds).ok_or_else(|| {
            PbupError::Config(format!(
                "utc_offset_seconds out of range: {}",
                self.utc_offset_seconds
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> (ProjectPaths, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("alpha");
        fs::create_dir_all(base.join("params")).unwrap();
        (ProjectPaths::with_base_dir(base).unwrap(), temp_dir)
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.bup_command, "bup");
        assert_eq!(settings.compression_level, 9);
        assert_eq!(settings.timezone().unwrap(), FixedOffset::east_opt(0).unwrap());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let (paths, _temp) = project();
        let settings = Settings::load_or_default(&paths).unwrap();
        assert_eq!(settings.tar_command, "tar");
        assert!(settings.bundle_dir.is_none());
    }

    #[test]
    fn test_partial_file() {
        let (paths, _temp) = project();
        fs::write(
            paths.settings_file(),
            r#"{"compression_level": 3, "utc_offset_seconds": 3600, "log_format": "json"}"#,
        )
        .unwrap();

        let settings = Settings::load_or_default(&paths).unwrap();
        assert_eq!(settings.compression_level, 3);
        assert_eq!(settings.log_format, LogFormat::Json);
        assert_eq!(settings.bup_command, "bup");
        assert_eq!(
            settings.timezone().unwrap(),
            FixedOffset::east_opt(3600).unwrap()
        );
    }

    #[test]
    fn test_invalid_compression_level() {
        let (paths, _temp) = project();
        fs::write(paths.settings_file(), r#"{"compression_level": 12}"#).unwrap();

        let err = Settings::load_or_default(&paths).unwrap_err();
        assert!(matches!(err, PbupError::Config(_)));
    }

    #[test]
    fn test_malformed_file() {
        let (paths, _temp) = project();
        fs::write(paths.settings_file(), "not json").unwrap();

        let err = Settings::load_or_default(&paths).unwrap_err();
        assert!(err.to_string().contains("pbup.json"));
    }
}
