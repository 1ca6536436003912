//! Run configuration.
//!
//! Everything has a default; a YAML file only overrides what a site needs
//! to change (extra worker codes, employees excluded from analysis).
//!
//! ```yaml
//! worker_codes: ["130", "140", "141", "131"]
//! excluded_employees: ["HMOURI ALI"]
//! default_year: "2025"
//! default_month: "12"
//! ```

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::classify::DEFAULT_WORKER_CODES;
use crate::extract::normalize_name;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// HJ code prefixes marking shift-worker days.
    pub worker_codes: Vec<String>,
    /// Employees dropped from analysis by name, any case/spacing.
    pub excluded_employees: Vec<String>,
    /// Month used when a file name carries no month hint.
    pub default_month: String,
    /// Year used when a file name carries no year.
    pub default_year: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            worker_codes: DEFAULT_WORKER_CODES.iter().map(ToString::to_string).collect(),
            excluded_employees: Vec::new(),
            default_month: "12".to_string(),
            default_year: "2025".to_string(),
        }
    }
}

impl RunConfig {
    /// Loads the configuration, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Exclusion list in join-key form, ready to compare against
    /// `DailyRecord::employee_name`.
    pub fn normalized_exclusions(&self) -> Vec<String> {
        self.excluded_employees
            .iter()
            .map(|name| normalize_name(name))
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_known_worker_codes() {
        let config = RunConfig::default();
        assert_eq!(config.worker_codes, vec!["130", "140", "141", "131"]);
        assert!(config.excluded_employees.is_empty());
        assert_eq!(config.default_month, "12");
        assert_eq!(config.default_year, "2025");
    }

    #[test]
    fn load_without_path_returns_defaults() {
        let config = RunConfig::load(None).unwrap();
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn load_partial_yaml_keeps_other_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("pointage.yaml");
        fs::write(&path, "excluded_employees: [\"hmouri  ali\"]\n").unwrap();

        let config = RunConfig::load(Some(&path)).unwrap();
        assert_eq!(config.excluded_employees, vec!["hmouri  ali"]);
        assert_eq!(config.worker_codes, RunConfig::default().worker_codes);
        assert_eq!(config.normalized_exclusions(), vec!["HMOURI ALI"]);
    }

    #[test]
    fn load_missing_file_is_an_error() {
        assert!(RunConfig::load(Some(Path::new("/nonexistent/pointage.yaml"))).is_err());
    }

    #[test]
    fn load_rejects_unknown_fields() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("pointage.yaml");
        fs::write(&path, "worker_code: [\"130\"]\n").unwrap();

        assert!(RunConfig::load(Some(&path)).is_err());
    }
}
