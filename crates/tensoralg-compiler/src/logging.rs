//! Structured logging support using the `tracing` crate.
//!
//! The IR and the pipeline emit `tracing` events for every lowering
//! decision: implicit sums inserted, loops built, workspaces introduced and
//! splits applied or skipped. Each pipeline stage runs inside an `info`
//! span. Any subscriber sees these events; [`TracingLogger`] installs one.
//!
//! # Features
//!
//! [`TracingLogger`] is only available when the `structured-logging` feature
//! is enabled:
//!
//! ```toml
//! [dependencies]
//! tensoralg-compiler = { version = "0.1", features = ["structured-logging"] }
//! ```
//!
//! # Examples
//!
//! ```no_run
//! # #[cfg(feature = "structured-logging")]
//! # {
//! use tensoralg_compiler::logging::{LogFormat, LogLevel, TracingLogger};
//!
//! let logger = TracingLogger::builder()
//!     .with_format(LogFormat::Json)
//!     .with_level(LogLevel::Debug)
//!     .build()
//!     .expect("Failed to initialize logger");
//! # }
//! ```

use serde::{Deserialize, Serialize};

#[cfg(feature = "structured-logging")]
use anyhow::{anyhow, Result};
#[cfg(feature = "structured-logging")]
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

#[cfg(feature = "structured-logging")]
use crate::config::LoggingConfig;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format with colors (for development).
    Pretty,
    /// Compact format without colors.
    Compact,
    /// JSON format (for machine parsing and log aggregation).
    Json,
}

/// Log level filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Configuration builder for structured logging.
#[cfg(feature = "structured-logging")]
#[derive(Debug, Clone)]
pub struct TracingLoggerBuilder {
    format: LogFormat,
    level: LogLevel,
    env_filter: Option<String>,
    with_targets: bool,
    with_file_location: bool,
    with_span_events: bool,
}

#[cfg(feature = "structured-logging")]
impl Default for TracingLoggerBuilder {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            level: LogLevel::Info,
            env_filter: None,
            with_targets: true,
            with_file_location: false,
            with_span_events: false,
        }
    }
}

#[cfg(feature = "structured-logging")]
impl TracingLoggerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder seeded from the `[logging]` section of a configuration.
    pub fn from_config(config: &LoggingConfig) -> Self {
        let builder = Self::new()
            .with_format(config.format)
            .with_level(config.level);
        match &config.filter {
            Some(filter) => builder.with_env_filter(filter.clone()),
            None => builder,
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Set a custom environment filter (overrides level setting).
    ///
    /// ```
    /// # use tensoralg_compiler::logging::TracingLoggerBuilder;
    /// let builder = TracingLoggerBuilder::new()
    ///     .with_env_filter("tensoralg_ir=debug,tensoralg_compiler=info");
    /// ```
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Include target names (module paths) in logs.
    pub fn with_targets(mut self, enabled: bool) -> Self {
        self.with_targets = enabled;
        self
    }

    /// Include `file:line` in logs.
    pub fn with_file_location(mut self, enabled: bool) -> Self {
        self.with_file_location = enabled;
        self
    }

    /// Log span enter and exit, which brackets every pipeline stage.
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.with_span_events = enabled;
        self
    }

    /// Build and install the global subscriber.
    ///
    /// Only one subscriber can be installed per process; later calls
    /// return an error.
    pub fn build(self) -> Result<TracingLogger> {
        let env_filter = match self.env_filter {
            Some(filter) => {
                EnvFilter::try_new(filter).map_err(|e| anyhow!("Invalid env filter: {}", e))?
            }
            None => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(self.level.as_str())),
        };

        let span_events = if self.with_span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        let layer = fmt::layer()
            .with_target(self.with_targets)
            .with_file(self.with_file_location)
            .with_line_number(self.with_file_location)
            .with_span_events(span_events);
        let registry = tracing_subscriber::registry().with(env_filter);
        let installed = match self.format {
            LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
            LogFormat::Compact => registry.with(layer.with_ansi(false).compact()).try_init(),
            LogFormat::Json => registry.with(layer.json()).try_init(),
        };
        installed.map_err(|e| anyhow!("Failed to initialize tracing: {}", e))?;

        Ok(TracingLogger {
            format: self.format,
        })
    }
}

/// Handle to the installed `tracing` subscriber.
#[cfg(feature = "structured-logging")]
#[derive(Debug)]
pub struct TracingLogger {
    format: LogFormat,
}

#[cfg(feature = "structured-logging")]
impl TracingLogger {
    pub fn builder() -> TracingLoggerBuilder {
        TracingLoggerBuilder::new()
    }

    /// Initialize with default settings (pretty format, info level).
    pub fn init() -> Result<Self> {
        Self::builder().build()
    }

    /// Initialize from the `[logging]` section of a configuration.
    pub fn init_from_config(config: &LoggingConfig) -> Result<Self> {
        TracingLoggerBuilder::from_config(config).build()
    }

    /// Initialize for development (pretty format, debug level, stage spans).
    pub fn init_development() -> Result<Self> {
        Self::builder()
            .with_format(LogFormat::Pretty)
            .with_level(LogLevel::Debug)
            .with_file_location(true)
            .with_span_events(true)
            .build()
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_as_str() {
        assert_eq!(LogLevel::Trace.as_str(), "trace");
        assert_eq!(LogLevel::Debug.as_str(), "debug");
        assert_eq!(LogLevel::Info.as_str(), "info");
        assert_eq!(LogLevel::Warn.as_str(), "warn");
        assert_eq!(LogLevel::Error.as_str(), "error");
    }

    #[test]
    fn test_log_format_serde() {
        let json = serde_json::to_string(&LogFormat::Compact).unwrap();
        assert_eq!(json, "\"compact\"");
        let level: LogLevel = serde_json::from_str("\"warn\"").unwrap();
        assert_eq!(level, LogLevel::Warn);
    }

    #[cfg(feature = "structured-logging")]
    #[test]
    fn test_builder_configuration() {
        let builder = TracingLoggerBuilder::new()
            .with_format(LogFormat::Json)
            .with_level(LogLevel::Debug)
            .with_targets(false)
            .with_file_location(true)
            .with_span_events(true);

        assert_eq!(builder.format, LogFormat::Json);
        assert_eq!(builder.level, LogLevel::Debug);
        assert!(!builder.with_targets);
        assert!(builder.with_file_location);
        assert!(builder.with_span_events);
    }

    #[cfg(feature = "structured-logging")]
    #[test]
    fn test_builder_from_config() {
        let config = LoggingConfig {
            level: LogLevel::Warn,
            format: LogFormat::Compact,
            filter: Some("tensoralg_ir=trace".to_string()),
        };
        let builder = TracingLoggerBuilder::from_config(&config);

        assert_eq!(builder.format, LogFormat::Compact);
        assert_eq!(builder.level, LogLevel::Warn);
        assert_eq!(builder.env_filter.as_deref(), Some("tensoralg_ir=trace"));
    }
}
