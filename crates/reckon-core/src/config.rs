use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ReckonError;

/// Top-level configuration loaded from `.reckon.toml`.
///
/// Supports layered resolution: CLI flags > local config > defaults.
/// Every tunable the analyzers consume lives here as an explicit value;
/// there is no package-level mutable state anywhere in the workspace.
///
/// # Examples
///
/// ```
/// use reckon_core::ReckonConfig;
///
/// let config = ReckonConfig::default();
/// assert_eq!(config.git.window_months, 6);
/// assert_eq!(config.engineer.baseline_loc_per_day, 80.0);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReckonConfig {
    /// Git-signal analysis settings.
    #[serde(default)]
    pub git: GitConfig,
    /// Engineer throughput analysis settings.
    #[serde(default)]
    pub engineer: EngineerConfig,
    /// File scanning settings.
    #[serde(default)]
    pub scan: ScanConfig,
}

impl ReckonConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ReckonError::Io`] if the file cannot be read, or
    /// [`ReckonError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use reckon_core::ReckonConfig;
    /// use std::path::Path;
    ///
    /// let config = ReckonConfig::from_file(Path::new(".reckon.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, ReckonError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ReckonError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use reckon_core::ReckonConfig;
    ///
    /// let toml = r#"
    /// [git]
    /// window_months = 12
    /// "#;
    /// let config = ReckonConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.git.window_months, 12);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, ReckonError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// Git-signal analysis configuration.
///
/// # Examples
///
/// ```
/// use reckon_core::GitConfig;
///
/// let config = GitConfig::default();
/// assert_eq!(config.window_months, 6);
/// assert_eq!(config.stable_months, 18);
/// assert!(!config.smooth);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    /// Months of history to analyze (default: 6).
    #[serde(default = "default_window_months")]
    pub window_months: u32,
    /// Files untouched for this many months count as stable core (default: 18).
    #[serde(default = "default_stable_months")]
    pub stable_months: u32,
    /// Use bi-weekly display buckets instead of weekly (default: false).
    #[serde(default)]
    pub smooth: bool,
}

fn default_window_months() -> u32 {
    6
}

fn default_stable_months() -> u32 {
    18
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            window_months: default_window_months(),
            stable_months: default_stable_months(),
            smooth: false,
        }
    }
}

/// Engineer throughput analysis configuration.
///
/// # Examples
///
/// ```
/// use reckon_core::EngineerConfig;
///
/// let config = EngineerConfig::default();
/// assert_eq!(config.period_months, 6);
/// assert_eq!(config.workday_factor, 0.71);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineerConfig {
    /// Months of history for the throughput window (default: 6).
    #[serde(default = "default_period_months")]
    pub period_months: u32,
    /// Baseline output of an industry-average senior engineer (default: 80).
    #[serde(default = "default_baseline_loc_per_day")]
    pub baseline_loc_per_day: f64,
    /// Weekend and PTO de-rating applied to active days (default: 0.71).
    #[serde(default = "default_workday_factor")]
    pub workday_factor: f64,
}

fn default_period_months() -> u32 {
    6
}

fn default_baseline_loc_per_day() -> f64 {
    80.0
}

fn default_workday_factor() -> f64 {
    0.71
}

impl Default for EngineerConfig {
    fn default() -> Self {
        Self {
            period_months: default_period_months(),
            baseline_loc_per_day: default_baseline_loc_per_day(),
            workday_factor: default_workday_factor(),
        }
    }
}

/// File scanning configuration.
///
/// # Examples
///
/// ```
/// use reckon_core::ScanConfig;
///
/// let config = ScanConfig::default();
/// assert_eq!(config.max_file_size, 1_048_576);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Skip files larger than this many bytes (default: 1 MB).
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

fn default_max_file_size() -> u64 {
    1_048_576
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = ReckonConfig::default();
        assert_eq!(config.git.window_months, 6);
        assert_eq!(config.git.stable_months, 18);
        assert!(!config.git.smooth);
        assert_eq!(config.engineer.period_months, 6);
        assert_eq!(config.engineer.baseline_loc_per_day, 80.0);
        assert_eq!(config.engineer.workday_factor, 0.71);
        assert_eq!(config.scan.max_file_size, 1_048_576);
    }

    #[test]
    fn parse_minimal_toml() {
        let toml = r#"
[git]
window_months = 12
smooth = true
"#;
        let config = ReckonConfig::from_toml(toml).unwrap();
        assert_eq!(config.git.window_months, 12);
        assert!(config.git.smooth);
        // untouched sections keep their defaults
        assert_eq!(config.git.stable_months, 18);
        assert_eq!(config.engineer.period_months, 6);
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[git]
window_months = 24
stable_months = 12
smooth = true

[engineer]
period_months = 3
baseline_loc_per_day = 100.0
workday_factor = 0.65

[scan]
max_file_size = 524288
"#;
        let config = ReckonConfig::from_toml(toml).unwrap();
        assert_eq!(config.git.window_months, 24);
        assert_eq!(config.git.stable_months, 12);
        assert_eq!(config.engineer.period_months, 3);
        assert_eq!(config.engineer.baseline_loc_per_day, 100.0);
        assert_eq!(config.engineer.workday_factor, 0.65);
        assert_eq!(config.scan.max_file_size, 524_288);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = ReckonConfig::from_toml("").unwrap();
        assert_eq!(config.git.window_months, 6);
        assert_eq!(config.engineer.baseline_loc_per_day, 80.0);
    }

    #[test]
    fn invalid_toml_returns_error() {
        let result = ReckonConfig::from_toml("{{invalid}}");
        assert!(result.is_err());
    }
}
