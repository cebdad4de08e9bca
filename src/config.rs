use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::serving::DirectoryResolver;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct ServingConfig {
    pub model: ModelConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Logical model name, resolved to an artifact file by the resolver
    pub name: String,
    /// Directory holding serialized model artifacts
    pub artifact_dir: PathBuf,
    /// Artifact file extension (without the leading dot)
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_extension() -> String {
    "clf".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ServingConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("model.extension", "clf")?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("CLFSERVE_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (CLFSERVE_MODEL__NAME, etc.)
            .add_source(
                Environment::with_prefix("CLFSERVE")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.model.name.trim().is_empty() {
            errors.push("model.name must not be empty".to_string());
        }

        if self.model.extension.trim().is_empty() {
            errors.push("model.extension must not be empty".to_string());
        }

        if self.model.artifact_dir.as_os_str().is_empty() {
            errors.push("model.artifact_dir must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Build the artifact resolver described by this configuration
    pub fn resolver(&self) -> DirectoryResolver {
        DirectoryResolver::new(&self.model.artifact_dir, &self.model.extension)
    }
}
