//! Application configuration loaded from environment variables.
//!
//! # Configuration Hierarchy
//!
//! Later sources override earlier ones:
//!
//! 1. Built-in development defaults
//! 2. `configs/config.yml` (or the file named by `CONFIG_FILE`)
//! 3. Environment variables, optionally seeded from a `.env` file
//!
//! ```yaml
//! server:
//!   port: 8080
//! logger:
//!   log-level: info
//! kafka:
//!   topic: fio
//!   config-path: configs/kafka.properties
//! ```
//!
//! # Kafka
//!
//! - `KAFKA_TOPIC`: Topic every record is produced to (default: `fio`)
//! - `KAFKA_CONFIG_PATH`: librdkafka properties file (default: `configs/kafka.properties`)
//! - `SHUTDOWN_FLUSH_TIMEOUT_SECS`: Flush deadline at shutdown (default: 15)
//!
//! # Logging
//!
//! - `LOG_LEVEL`: tracing filter directive, falls back to `RUST_LOG` (default: `info`)
//! - `LOG_FORMAT`: `json` or `text` (default: `json`)

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::validation::validate_topic_name;

/// Config file read when `CONFIG_FILE` is not set. Skipped if absent.
pub const DEFAULT_CONFIG_FILE: &str = "configs/config.yml";

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "text" | "pretty" | "plain" => Ok(LogFormat::Text),
            other => Err(format!("expected 'json' or 'text', got '{other}'")),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Json => f.write_str("json"),
            LogFormat::Text => f.write_str("text"),
        }
    }
}

/// Application configuration loaded from environment variables.
///
/// # Example
///
/// ```rust,ignore
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.server_addr());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Server host address (default: "0.0.0.0")
    pub host: String,

    /// Server port (default: 8080)
    pub port: u16,

    // =========================================================================
    // Kafka Configuration
    // =========================================================================
    /// Topic every record is produced to
    pub kafka_topic: String,

    /// Path of the `key = value` librdkafka properties file
    pub kafka_config_path: PathBuf,

    /// How long shutdown waits for queued messages to be delivered
    pub shutdown_flush_timeout: Duration,

    // =========================================================================
    // Request Limits
    // =========================================================================
    /// Maximum records accepted by `/send-fio/list` (default: 10)
    pub batch_max_size: usize,

    /// Maximum request body size in bytes (default: 1MB)
    pub max_request_body_size: usize,

    /// Allowed CORS origins, `*` for any
    pub cors_allowed_origins: Vec<String>,

    // =========================================================================
    // Observability Configuration
    // =========================================================================
    /// Log filter directive (e.g., "info", "debug", "fio_producer=trace")
    pub log_level: String,

    /// Log output format
    pub log_format: LogFormat,

    /// Port for Prometheus metrics endpoint (0 = disabled)
    pub metrics_port: u16,
}

impl Config {
    /// Load configuration from the config file and environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the config file cannot be read or
    /// parsed, or if any value is malformed or fails validation.
    pub fn from_env() -> AppResult<Self> {
        // Load an .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let mut defaults = Self::default();
        match env::var("CONFIG_FILE") {
            // An explicitly named file must exist
            Ok(path) => FileConfig::load(path)?.apply(&mut defaults)?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                FileConfig::load(DEFAULT_CONFIG_FILE)?.apply(&mut defaults)?
            }
            Err(_) => {}
        }

        let config = Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: Self::parse_env("PORT", defaults.port)?,

            kafka_topic: env::var("KAFKA_TOPIC").unwrap_or(defaults.kafka_topic),
            kafka_config_path: env::var("KAFKA_CONFIG_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.kafka_config_path),
            shutdown_flush_timeout: Duration::from_secs(Self::parse_env(
                "SHUTDOWN_FLUSH_TIMEOUT_SECS",
                defaults.shutdown_flush_timeout.as_secs(),
            )?),

            batch_max_size: Self::parse_env("BATCH_MAX_SIZE", defaults.batch_max_size)?,
            max_request_body_size: Self::parse_env(
                "MAX_REQUEST_BODY_SIZE",
                defaults.max_request_body_size,
            )?,
            cors_allowed_origins: Self::parse_cors_origins(),

            log_level: env::var("LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or(defaults.log_level),
            log_format: Self::parse_env("LOG_FORMAT", defaults.log_format)?,
            metrics_port: Self::parse_env("METRICS_PORT", defaults.metrics_port)?,
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values for consistency and correctness.
    fn validate(&self) -> AppResult<()> {
        validate_topic_name(&self.kafka_topic)?;

        if self.batch_max_size == 0 {
            return Err(AppError::Config(
                "BATCH_MAX_SIZE must be greater than 0".to_string(),
            ));
        }

        if self.max_request_body_size == 0 {
            return Err(AppError::Config(
                "MAX_REQUEST_BODY_SIZE must be greater than 0".to_string(),
            ));
        }

        if self.log_level.trim().is_empty() {
            return Err(AppError::Config("LOG_LEVEL cannot be empty".to_string()));
        }

        Ok(())
    }

    /// Get the full server address for binding.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if Prometheus metrics export is enabled.
    pub fn metrics_enabled(&self) -> bool {
        self.metrics_port > 0
    }

    /// Get the metrics endpoint address, `None` if disabled.
    pub fn metrics_addr(&self) -> Option<std::net::SocketAddr> {
        self.metrics_enabled()
            .then(|| std::net::SocketAddr::from(([0, 0, 0, 0], self.metrics_port)))
    }

    /// Parse an environment variable into the specified type with a default value.
    fn parse_env<T>(name: &str, default: T) -> AppResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(name) {
            Ok(val) => val
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid {name}: {e}"))),
            Err(_) => Ok(default),
        }
    }

    /// Parse CORS allowed origins from environment variable.
    fn parse_cors_origins() -> Vec<String> {
        env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Contents of the structured config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub server: ServerSection,
    pub logger: LoggerSection,
    pub kafka: KafkaSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<PortValue>,
}

/// Port written either as a number or as a quoted string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PortValue {
    Number(u16),
    Text(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LoggerSection {
    pub log_level: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct KafkaSection {
    pub topic: Option<String>,
    pub config_path: Option<PathBuf>,
    pub flush_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Read and parse the YAML file at `path`.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::parse(&content)
            .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))
    }

    pub fn parse(content: &str) -> AppResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
            .map_err(|e| AppError::Config(format!("Invalid config file: {e}")))
    }

    /// Overwrite the fields of `config` that this file sets.
    pub fn apply(self, config: &mut Config) -> AppResult<()> {
        if let Some(host) = self.server.host {
            config.host = host;
        }
        if let Some(port) = self.server.port {
            config.port = match port {
                PortValue::Number(port) => port,
                PortValue::Text(text) => text.trim().parse().map_err(|e| {
                    AppError::Config(format!("Invalid server.port '{text}': {e}"))
                })?,
            };
        }
        if let Some(level) = self.logger.log_level {
            config.log_level = normalize_log_level(&level);
        }
        if let Some(format) = self.logger.format {
            config.log_format = format
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid logger.format: {e}")))?;
        }
        if let Some(topic) = self.kafka.topic {
            config.kafka_topic = topic;
        }
        if let Some(path) = self.kafka.config_path {
            config.kafka_config_path = path;
        }
        if let Some(secs) = self.kafka.flush_timeout_secs {
            config.shutdown_flush_timeout = Duration::from_secs(secs);
        }
        Ok(())
    }
}

/// Map level names tracing has no equivalent for onto the closest one.
fn normalize_log_level(level: &str) -> String {
    match level.trim().to_ascii_lowercase().as_str() {
        "warning" => "warn".to_string(),
        "fatal" | "panic" => "error".to_string(),
        other => other.to_string(),
    }
}

/// Default configuration for testing and development.
///
/// Production deployments should use `Config::from_env()` instead.
impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            kafka_topic: "fio".to_string(),
            kafka_config_path: PathBuf::from("configs/kafka.properties"),
            shutdown_flush_timeout: crate::producer::DEFAULT_FLUSH_TIMEOUT,
            batch_max_size: 10,
            max_request_body_size: 1024 * 1024,
            cors_allowed_origins: vec!["*".to_string()],
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
            metrics_port: 9090,
        }
    }
}
