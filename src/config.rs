//! Analysis configuration
//!
//! Thresholds shared by the CPM engine and the analyzers. Every field has a
//! default, so a partial TOML file (or an empty JSON object from the host)
//! is a valid configuration.

use crate::date_utils::opt_date;
use crate::error::{Result, ScheduleError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisConfig {
    /// |total float| at or below this marks an activity critical
    #[serde(default = "default_critical_tolerance")]
    pub critical_tolerance: f64,

    /// DCMA high-float threshold (days)
    #[serde(default = "default_high_float_days")]
    pub high_float_days: f64,

    /// DCMA long-duration threshold (days)
    #[serde(default = "default_long_duration_days")]
    pub long_duration_days: f64,

    /// Maximum links returned by a driving-chain query
    #[serde(default = "default_max_chain_depth")]
    pub max_chain_depth: usize,

    /// FCI only looks for upstream constraint masking above this float (days)
    #[serde(default = "default_fci_float_masking_days")]
    pub fci_float_masking_days: f64,

    /// FCI upstream walk limit
    #[serde(default = "default_fci_upstream_depth")]
    pub fci_upstream_depth: usize,

    /// Fail CPM runs on cyclic networks instead of computing best-effort dates
    #[serde(default)]
    pub reject_cycles: bool,

    /// Reference "today" for missed-task and execution-index checks
    #[serde(default, with = "opt_date", skip_serializing_if = "Option::is_none")]
    pub data_date: Option<NaiveDate>,
}

fn default_critical_tolerance() -> f64 {
    0.01
}

fn default_high_float_days() -> f64 {
    44.0
}

fn default_long_duration_days() -> f64 {
    44.0
}

fn default_max_chain_depth() -> usize {
    50
}

fn default_fci_float_masking_days() -> f64 {
    20.0
}

fn default_fci_upstream_depth() -> usize {
    20
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            critical_tolerance: default_critical_tolerance(),
            high_float_days: default_high_float_days(),
            long_duration_days: default_long_duration_days(),
            max_chain_depth: default_max_chain_depth(),
            fci_float_masking_days: default_fci_float_masking_days(),
            fci_upstream_depth: default_fci_upstream_depth(),
            reject_cycles: false,
            data_date: None,
        }
    }
}

impl AnalysisConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AnalysisConfig =
            toml::from_str(content).map_err(|e| ScheduleError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    /// Returns default config if the file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Save configuration as TOML
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ScheduleError::InvalidConfig(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(self.critical_tolerance >= 0.0) {
            return Err(ScheduleError::InvalidConfig(format!(
                "criticalTolerance must be non-negative, got {}",
                self.critical_tolerance
            )));
        }
        if self.max_chain_depth == 0 {
            return Err(ScheduleError::InvalidConfig(
                "maxChainDepth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.critical_tolerance, 0.01);
        assert_eq!(config.high_float_days, 44.0);
        assert_eq!(config.max_chain_depth, 50);
        assert!(!config.reject_cycles);
        assert!(config.data_date.is_none());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"
highFloatDays = 30
rejectCycles = true
dataDate = "2024-06-30"
"#;
        let config = AnalysisConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.high_float_days, 30.0);
        assert!(config.reject_cycles);
        assert_eq!(config.data_date, NaiveDate::from_ymd_opt(2024, 6, 30));
        assert_eq!(config.long_duration_days, 44.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(matches!(
            AnalysisConfig::from_toml_str("maxChainDepth = 0"),
            Err(ScheduleError::InvalidConfig(_))
        ));
        assert!(matches!(
            AnalysisConfig::from_toml_str("criticalTolerance = \"wide\""),
            Err(ScheduleError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_load_missing_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = AnalysisConfig::load(&temp_dir.path().join("analysis.toml")).unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("analysis.toml");

        let mut config = AnalysisConfig::default();
        config.fci_upstream_depth = 5;
        config.data_date = NaiveDate::from_ymd_opt(2025, 1, 15);
        config.save(&path).unwrap();

        let loaded = AnalysisConfig::load(&path).unwrap();
        assert_eq!(loaded.fci_upstream_depth, 5);
        assert_eq!(loaded.data_date, NaiveDate::from_ymd_opt(2025, 1, 15));
    }
}
