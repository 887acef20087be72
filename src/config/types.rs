//! Core configuration types and loading.

use serde::Deserialize;
use std::net::IpAddr;
use std::path::Path;
use thiserror::Error;

use super::defaults::{
    default_log_filter, default_metrics_bind, default_prefix, default_separators,
};
use super::validation::ValidationError;
use crate::commands::SplitPolicy;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Bot configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Prefix, separators and split policy.
    #[serde(default)]
    pub commands: CommandsConfig,
    /// Log filter and output format.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Prometheus endpoint.
    #[serde(default)]
    pub metrics: MetricsConfig,
    /// Entities seeded into the demo bot's in-memory directory.
    #[serde(default)]
    pub directory: DirectoryConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load and validate, reporting every problem at once.
    pub fn load_validated<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        super::validate(&config).map_err(ConfigError::Invalid)?;
        Ok(config)
    }
}

/// `[commands]`: how command text is recognized and split.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandsConfig {
    /// Text every command must start with (default: "/").
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Single-character separators (default: [" "]).
    #[serde(default = "default_separators")]
    pub separators: Vec<String>,
    /// What to do with adjacent separators (default: "drop_empty").
    #[serde(default)]
    pub split_policy: SplitPolicy,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            separators: default_separators(),
            split_policy: SplitPolicy::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// `[logging]`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG` (default: "info").
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            format: LogFormat::default(),
        }
    }
}

/// `[metrics]`.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Port for the Prometheus endpoint; disabled when absent.
    pub port: Option<u16>,
    /// Address to bind (default: 127.0.0.1).
    #[serde(default = "default_metrics_bind")]
    pub bind: IpAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            port: None,
            bind: default_metrics_bind(),
        }
    }
}

/// `[directory]`: entities known to the in-memory resolver.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryConfig {
    /// Server the demo bot pretends messages arrive from.
    pub server: Option<String>,
    /// Simulated latency of every lookup, in milliseconds.
    #[serde(default)]
    pub lookup_latency_ms: u64,
    #[serde(default)]
    pub members: Vec<MemberSeed>,
    #[serde(default)]
    pub roles: Vec<NamedSeed>,
    #[serde(default)]
    pub channels: Vec<NamedSeed>,
}

/// A seeded member.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberSeed {
    pub id: String,
    pub name: String,
    pub nickname: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// A seeded role or channel.
#[derive(Debug, Clone, Deserialize)]
pub struct NamedSeed {
    pub id: String,
    pub name: String,
}
