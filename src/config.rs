//! Configuration file parsing
//!
//! Reads schemalint.toml configuration files.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::DEFAULT_BATCH_WIDTH;
use crate::ignore::DEFAULT_IGNORE_FILE;
use crate::output::OutputFormat;
use crate::pipeline::LintMode;
use crate::rules::{RuleId, RuleSetting, Severity};

/// Default config file name used when --config is not explicitly provided.
pub const DEFAULT_CONFIG_FILE: &str = "schemalint.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub lint: LintConfig,

    /// Rule ID → `error`, `warning`, `info` or `off`.
    #[serde(default)]
    pub rules: BTreeMap<String, String>,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LintConfig {
    /// Migration files or directories
    #[serde(default = "default_paths")]
    pub paths: Vec<PathBuf>,

    #[serde(default)]
    pub mode: LintMode,

    /// Files parsed concurrently per batch
    #[serde(default = "default_batch_width")]
    pub batch_width: usize,

    #[serde(default = "default_ignore_file")]
    pub ignore_file: PathBuf,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            paths: default_paths(),
            mode: LintMode::default(),
            batch_width: default_batch_width(),
            ignore_file: default_ignore_file(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Exit non-zero if findings meet or exceed this severity
    #[serde(default = "default_fail_on")]
    pub fail_on: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            fail_on: default_fail_on(),
        }
    }
}

fn default_paths() -> Vec<PathBuf> {
    vec![PathBuf::from("supabase/migrations")]
}

fn default_batch_width() -> usize {
    DEFAULT_BATCH_WIDTH
}

fn default_ignore_file() -> PathBuf {
    PathBuf::from(DEFAULT_IGNORE_FILE)
}

fn default_fail_on() -> String {
    "error".to_string()
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration text.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.lint.batch_width == 0 {
            return Err(ConfigError::Validation(
                "batch_width must be at least 1".to_string(),
            ));
        }

        let fail_on = &self.output.fail_on;
        if !fail_on.eq_ignore_ascii_case("none") && Severity::parse(fail_on).is_none() {
            return Err(ConfigError::Validation(format!(
                "invalid fail_on value '{}'. Valid values: error, warning, info, none",
                fail_on
            )));
        }

        for (rule, setting) in &self.rules {
            if RuleSetting::parse(setting).is_none() {
                return Err(ConfigError::Validation(format!(
                    "invalid setting '{}' for rule '{}'. Valid values: error, warning, info, off",
                    setting, rule
                )));
            }
        }
        Ok(())
    }

    /// Threshold for a failing exit status. `None` never fails.
    pub fn fail_on(&self) -> Option<Severity> {
        Severity::parse(&self.output.fail_on)
    }

    /// Per-rule overrides keyed by typed ID. Unknown rule IDs are skipped
    /// with a warning.
    pub fn rule_overrides(&self) -> HashMap<RuleId, RuleSetting> {
        let mut overrides = HashMap::new();
        for (rule, setting) in &self.rules {
            let Ok(id) = rule.parse::<RuleId>() else {
                tracing::warn!(rule = %rule, "unknown rule in configuration, ignoring");
                continue;
            };
            if let Some(setting) = RuleSetting::parse(setting) {
                overrides.insert(id, setting);
            }
        }
        overrides
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: parse TOML into Config and run validation.
    fn parse_and_validate(toml_str: &str) -> Result<Config, ConfigError> {
        Config::from_toml(toml_str)
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_and_validate("").expect("defaults");
        assert_eq!(config.lint.paths, vec![PathBuf::from("supabase/migrations")]);
        assert_eq!(config.lint.mode, LintMode::File);
        assert_eq!(config.lint.batch_width, 10);
        assert_eq!(config.lint.ignore_file, PathBuf::from(".schemalintignore"));
        assert_eq!(config.output.format, OutputFormat::Text);
        assert_eq!(config.fail_on(), Some(Severity::Error));
    }

    #[test]
    fn test_full_config() {
        let config = parse_and_validate(
            r#"
[lint]
paths = ["db/migrations", "db/seed.sql"]
mode = "schema"
batch_width = 4

[rules]
"no-table-without-pk" = "warning"
"schema/duplicate-index" = "off"

[output]
format = "json"
fail_on = "warning"
"#,
        )
        .expect("valid");

        assert_eq!(config.lint.mode, LintMode::Schema);
        assert_eq!(config.lint.batch_width, 4);
        assert_eq!(config.lint.paths.len(), 2);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.fail_on(), Some(Severity::Warning));

        let overrides = config.rule_overrides();
        assert_eq!(
            overrides.get(&RuleId::NoTableWithoutPk),
            Some(&RuleSetting::Severity(Severity::Warning))
        );
        assert_eq!(overrides.get(&RuleId::DuplicateIndex), Some(&RuleSetting::Off));
    }

    #[test]
    fn test_valid_fail_on_values() {
        for value in &["error", "warning", "info", "none"] {
            let toml = format!("[output]\nfail_on = \"{}\"", value);
            assert!(
                parse_and_validate(&toml).is_ok(),
                "fail_on = '{}' should be valid",
                value
            );
        }
        let none = parse_and_validate("[output]\nfail_on = \"none\"").expect("valid");
        assert_eq!(none.fail_on(), None);
    }

    #[test]
    fn test_invalid_fail_on_rejected() {
        let toml = "[output]\nfail_on = \"garbage\"";
        let err = parse_and_validate(toml).unwrap_err();
        assert!(
            err.to_string().contains("invalid fail_on"),
            "Expected validation error, got: {}",
            err
        );
    }

    #[test]
    fn test_zero_batch_width_rejected() {
        let err = parse_and_validate("[lint]\nbatch_width = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_invalid_rule_setting_rejected() {
        let err = parse_and_validate("[rules]\n\"no-table-without-pk\" = \"loud\"").unwrap_err();
        assert!(err.to_string().contains("no-table-without-pk"));
    }

    #[test]
    fn test_unknown_mode_is_parse_error() {
        let err = parse_and_validate("[lint]\nmode = \"project\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_unknown_rule_ids_are_skipped() {
        let config = parse_and_validate("[rules]\n\"PGM001\" = \"off\"").expect("valid");
        assert!(config.rule_overrides().is_empty());
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }
}
