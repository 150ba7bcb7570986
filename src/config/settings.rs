//! Application configuration loaded from a TOML file.
//!
//! The file is optional: without it the scheduler runs with defaults and no
//! seeded templates. Its path comes from `LEDGER_CONFIG`, falling back to
//! `./config.toml`.

use std::path::Path;

use serde::Deserialize;

use super::templates::TemplateConfig;
use crate::errors::{Error, Result};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

const fn default_tick_interval_secs() -> u64 {
    3600
}

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Scheduler settings
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Recurring templates to seed
    #[serde(default)]
    pub templates: Vec<TemplateConfig>,
}

/// `[scheduler]` section
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Seconds between scheduler passes after the start-up pass; 0 runs once
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval_secs(),
        }
    }
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or is not valid TOML for
/// [`AppConfig`].
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading configuration from {:?}", path_ref);

    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config file {path_ref:?}: {e}"),
    })
}

/// Loads configuration from `LEDGER_CONFIG` or `./config.toml`.
///
/// A missing file yields [`AppConfig::default`]; an unreadable or invalid one
/// is an error.
pub fn load_app_config() -> Result<AppConfig> {
    let path = std::env::var("LEDGER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    if !Path::new(&path).exists() {
        tracing::info!("No configuration file at {}, using defaults", path);
        return Ok(AppConfig::default());
    }

    load_config(&path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [scheduler]
            tick_interval_secs = 60

            [[templates]]
            template_name = "Salary"
            description = "Monthly salary"
            amount = 3500000.0
            transaction_type = "income"
            start_date = "2024-01"
            day_of_month = 25
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.scheduler.tick_interval_secs, 60);
        assert_eq!(config.templates.len(), 1);
        assert_eq!(config.templates[0].template_name, "Salary");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.scheduler, SchedulerConfig::default());
        assert_eq!(config.scheduler.tick_interval_secs, 3600);
        assert!(config.templates.is_empty());
    }

    #[test]
    fn test_load_config_reports_missing_file() {
        let result = load_config("/nonexistent/ledger/config.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_load_config_reports_invalid_toml() {
        let path = std::env::temp_dir().join(format!(
            "ledger_buddy_invalid_{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[scheduler\ntick_interval_secs = ").unwrap();

        let result = load_config(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
