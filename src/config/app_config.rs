use serde::Deserialize;

use crate::domain::ConnectivityState;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub executor: ExecutorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Defaults applied when running a chain script
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutorConfig {
    /// Connectivity reported before a script's timeline changes it
    #[serde(default)]
    pub initial_connectivity: ConnectivityState,

    /// How long to wait for a terminal state before giving up
    #[serde(default = "default_outcome_timeout_ms")]
    pub outcome_timeout_ms: u64,

    /// Emit counters through the metrics facade
    #[serde(default)]
    pub emit_metrics: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_outcome_timeout_ms() -> u64 {
    30_000
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            initial_connectivity: ConnectivityState::default(),
            outcome_timeout_ms: default_outcome_timeout_ms(),
            emit_metrics: false,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(contents: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.executor.initial_connectivity, ConnectivityState::Online);
        assert_eq!(config.executor.outcome_timeout_ms, 30_000);
        assert!(!config.executor.emit_metrics);
    }

    #[test]
    fn test_empty_source_uses_defaults() {
        let config = from_toml("");

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.executor.outcome_timeout_ms, 30_000);
    }

    #[test]
    fn test_partial_overrides() {
        let config = from_toml(
            r#"
            [logging]
            format = "json"

            [executor]
            initial_connectivity = "offline"
            outcome_timeout_ms = 500
            "#,
        );

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.executor.initial_connectivity, ConnectivityState::Offline);
        assert_eq!(config.executor.outcome_timeout_ms, 500);
    }
}
