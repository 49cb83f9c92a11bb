//! Lowering configuration.
//!
//! A [`LoweringConfig`] selects the target dialect, the checks run around
//! each stage and the logging setup. Configurations are plain serde structs
//! and can be read from TOML or JSON; every field has a default, so a file
//! only needs to name what it changes:
//!
//! ```toml
//! target = "reduction"
//! workspace_prefix = "acc_"
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tensoralg_ir::{ConcretizeOptions, Dialect};

use crate::logging::{LogFormat, LogLevel};

/// Environment variable naming a configuration file for [`LoweringConfig::load_default`].
pub const CONFIG_ENV_VAR: &str = "TENSORALG_CONFIG";

/// Configuration file looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = "tensoralg.toml";

/// Complete lowering configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoweringConfig {
    /// Dialect the pipeline lowers to
    pub target: Dialect,
    /// Check access arities and dimensions before lowering
    pub validate: bool,
    /// Check that every stage produced the dialect it promises
    pub verify_stages: bool,
    /// Apply the operator splits scheduled on the result tensors
    pub apply_schedules: bool,
    /// Prefix of the scalar workspaces introduced for nested reductions
    pub workspace_prefix: String,
    /// Logging setup
    pub logging: LoggingConfig,
}

/// Logging section of a [`LoweringConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level of emitted events
    pub level: LogLevel,
    /// Output format
    pub format: LogFormat,
    /// Custom `EnvFilter` directives, overriding `level`
    pub filter: Option<String>,
}

impl Default for LoweringConfig {
    fn default() -> Self {
        Self {
            target: Dialect::Concrete,
            validate: true,
            verify_stages: true,
            apply_schedules: true,
            workspace_prefix: ConcretizeOptions::default().workspace_prefix,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            filter: None,
        }
    }
}

impl LoweringConfig {
    /// Lower all the way to concrete notation (default).
    pub fn concrete() -> Self {
        Self::default()
    }

    /// Stop after making implicit sums explicit.
    pub fn reduction_only() -> Self {
        Self {
            target: Dialect::Reduction,
            apply_schedules: false,
            ..Self::default()
        }
    }

    /// Lower to concrete notation without validation or stage checks.
    pub fn unchecked() -> Self {
        Self {
            validate: false,
            verify_stages: false,
            ..Self::default()
        }
    }

    pub fn with_target(mut self, target: Dialect) -> Self {
        self.target = target;
        self
    }

    pub fn with_validation(mut self, enable: bool) -> Self {
        self.validate = enable;
        self
    }

    pub fn with_stage_verification(mut self, enable: bool) -> Self {
        self.verify_stages = enable;
        self
    }

    pub fn with_schedules(mut self, enable: bool) -> Self {
        self.apply_schedules = enable;
        self
    }

    pub fn with_workspace_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.workspace_prefix = prefix.into();
        self
    }

    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Options passed to concrete lowering.
    pub fn concretize_options(&self) -> ConcretizeOptions {
        ConcretizeOptions::default().with_workspace_prefix(self.workspace_prefix.clone())
    }

    /// Parse a TOML configuration.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Parse a JSON configuration.
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse JSON configuration")
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Load configuration from a file; `.json` files are read as JSON and
    /// everything else as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if is_json(path) {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
        .with_context(|| format!("Failed to load config file: {}", path.display()))
    }

    /// Save configuration to a file in the format its extension names.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = if is_json(path) {
            serde_json::to_string_pretty(self).context("Failed to serialize configuration")?
        } else {
            self.to_toml_string()?
        };

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Find and load configuration.
    ///
    /// Search order:
    /// 1. `TENSORALG_CONFIG` environment variable
    /// 2. `tensoralg.toml` in the current directory
    ///
    /// Falls back to the default configuration when neither exists. A file
    /// that exists but cannot be loaded is an error.
    pub fn load_default() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::load(Path::new(&path));
        }

        let current = PathBuf::from(CONFIG_FILE_NAME);
        if current.exists() {
            return Self::load(&current);
        }

        tracing::debug!("no configuration file found, using defaults");
        Ok(Self::default())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoweringConfig::default();
        assert_eq!(config.target, Dialect::Concrete);
        assert!(config.validate);
        assert!(config.verify_stages);
        assert!(config.apply_schedules);
        assert_eq!(config.workspace_prefix, "t");
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_presets() {
        let reduction = LoweringConfig::reduction_only();
        assert_eq!(reduction.target, Dialect::Reduction);
        assert!(!reduction.apply_schedules);

        let unchecked = LoweringConfig::unchecked();
        assert!(!unchecked.validate);
        assert!(!unchecked.verify_stages);
        assert_eq!(unchecked.target, Dialect::Concrete);
    }

    #[test]
    fn test_builder_methods() {
        let config = LoweringConfig::default()
            .with_target(Dialect::Reduction)
            .with_validation(false)
            .with_stage_verification(false)
            .with_schedules(false)
            .with_workspace_prefix("acc_");

        assert_eq!(config.target, Dialect::Reduction);
        assert!(!config.validate);
        assert!(!config.verify_stages);
        assert!(!config.apply_schedules);
        assert_eq!(config.concretize_options().workspace_prefix, "acc_");
    }

    #[test]
    fn test_partial_toml() {
        let config = LoweringConfig::from_toml_str(
            r#"
            target = "reduction"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.target, Dialect::Reduction);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert!(config.validate);
    }

    #[test]
    fn test_partial_json() {
        let config =
            LoweringConfig::from_json_str(r#"{"workspace_prefix": "w_", "validate": false}"#)
                .unwrap();
        assert_eq!(config.workspace_prefix, "w_");
        assert!(!config.validate);
        assert_eq!(config.target, Dialect::Concrete);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = LoweringConfig::reduction_only().with_workspace_prefix("acc_");
        let toml = config.to_toml_string().unwrap();
        assert_eq!(LoweringConfig::from_toml_str(&toml).unwrap(), config);
    }

    #[test]
    fn test_invalid_target_rejected() {
        let err = LoweringConfig::from_toml_str(r#"target = "assembly""#).unwrap_err();
        assert!(err.to_string().contains("TOML"));
    }
}
