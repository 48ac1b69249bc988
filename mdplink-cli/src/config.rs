//! Configuration for the watch mode.

use std::path::Path;

use mdplink::Parameter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] json5::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Complete watch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Parameters to observe
    pub poll: PollConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Polling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Poll period in milliseconds
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,

    /// Parameters to observe for changes
    pub parameters: Vec<Parameter>,
}

fn default_period_ms() -> u64 {
    1000
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_level(),
        }
    }
}

impl WatchConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: WatchConfig = json5::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.poll.parameters.is_empty() {
            return Err(ConfigError::Validation(
                "at least one parameter must be configured".to_string(),
            ));
        }
        if self.poll.period_ms == 0 {
            return Err(ConfigError::Validation(
                "period_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdplink::{MdpDataType, ModuleType};

    #[test]
    fn parses_a_watch_config() {
        let text = r#"
        {
            poll: {
                period_ms: 500,
                parameters: [
                    { module_type: "cpu", table_id: 1, sub_index: 1, data_type: "u32" },
                    { module_type: "nic", table_id: 1, sub_index: 4, data_type: "bool", instance: 2 },
                ],
            },
            logging: { level: "debug" },
        }
        "#;

        let config: WatchConfig = json5::from_str(text).unwrap();
        assert_eq!(config.poll.period_ms, 500);
        assert_eq!(config.poll.parameters.len(), 2);
        assert_eq!(config.logging.level, "debug");

        let first = &config.poll.parameters[0];
        assert_eq!(first.module_type, ModuleType::Cpu);
        assert_eq!(first.data_type, MdpDataType::U32);
        assert_eq!(first.instance, 1);
        assert_eq!(config.poll.parameters[1].instance, 2);
    }

    #[test]
    fn rejects_an_empty_parameter_list() {
        let text = r#"{ poll: { parameters: [] } }"#;
        let config: WatchConfig = json5::from_str(text).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }
}
