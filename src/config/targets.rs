//! Allow-list of folders that may be backed up
//!
//! Read from `params/bup_targets.txt`: one folder name per line. Blank lines
//! and lines starting with `#` are ignored.

use std::path::Path;

use crate::error::PbupError;

/// The set of folder names `backup`, `ls` and `restore` accept
#[derive(Debug, Clone, Default)]
pub struct TargetAllowList {
    targets: Vec<String>,
}

impl TargetAllowList {
    /// Load the allow-list from disk
    pub fn load(path: &Path) -> Result<Self, PbupError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PbupError::Config(format!(
                "Failed to read target list {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(Self::parse(&contents))
    }

    /// Parse allow-list contents
    pub fn parse(contents: &str) -> Self {
        let targets = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();

        Self { targets }
    }

    pub fn contains(&self, target: &str) -> bool {
        self.targets.iter().any(|t| t == target)
    }

    /// Fail with a validation error unless `target` is listed
    pub fn check(&self, target: &str) -> Result<(), PbupError> {
        if self.contains(target) {
            Ok(())
        } else {
            Err(PbupError::Validation(format!(
                "'{}' is not a valid backup target (allowed: {})",
                target,
                self.targets.join(", ")
            )))
        }
    }

    #[cfg(test)]
    pub fn targets(&self) -> &[String] {
        &self.targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_skips_blanks_and_comments() {
        let list = TargetAllowList::parse("data\n\n# scratch is never backed up\n  models  \n");
        assert_eq!(list.targets(), &["data".to_string(), "models".to_string()]);
    }

    #[test]
    fn test_check() {
        let list = TargetAllowList::parse("data\nmodels\n");
        assert!(list.check("data").is_ok());

        let err = list.check("secrets").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("secrets"));
    }

    #[test]
    fn test_exact_match_only() {
        let list = TargetAllowList::parse("data\n");
        assert!(!list.contains("dat"));
        assert!(!list.contains("data/"));
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = TargetAllowList::load(&temp_dir.path().join("bup_targets.txt")).unwrap_err();
        assert!(matches!(err, PbupError::Config(_)));
    }
}
