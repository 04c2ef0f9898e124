use serde::{Deserialize, Serialize};

use super::{
    ConfigError, DatabaseConfig, ObservabilityConfig, RetryConfig, ServerConfig, Validate,
    WithDefaults,
};

/// Top-level application configuration that aggregates all config modules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application metadata
    #[serde(default)]
    pub app: AppMetadata,
    /// Server configuration (bind address, workers)
    #[serde(default = "ServerConfig::with_defaults")]
    pub server: ServerConfig,
    /// Database configuration (target, pool bounds, timeouts)
    #[serde(default = "DatabaseConfig::with_defaults")]
    pub database: DatabaseConfig,
    /// Retry configuration (connect attempts, backoff)
    #[serde(default = "RetryConfig::with_defaults")]
    pub retry: RetryConfig,
    /// Observability configuration (log level, log format)
    #[serde(default = "ObservabilityConfig::with_defaults")]
    pub observability: ObservabilityConfig,
}

/// Application metadata configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppMetadata {
    /// Application name
    #[serde(default = "default_app_name")]
    pub name: String,
    /// Application version
    #[serde(default = "default_app_version")]
    pub version: String,
    /// Application environment (development, staging, production)
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Graceful shutdown timeout in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: u64,
}

// Default functions for AppMetadata
fn default_app_name() -> String {
    "poolguard".to_string()
}

fn default_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
            environment: default_environment(),
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

impl Validate for AppMetadata {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::ValidationError(
                "app.name cannot be empty".to_string(),
            ));
        }
        if self.version.is_empty() {
            return Err(ConfigError::ValidationError(
                "app.version cannot be empty".to_string(),
            ));
        }
        if self.environment.is_empty() {
            return Err(ConfigError::ValidationError(
                "app.environment cannot be empty".to_string(),
            ));
        }
        if self.shutdown_timeout == 0 {
            return Err(ConfigError::ValidationError(
                "app.shutdown_timeout must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        // Validate all nested configurations
        self.app.validate()?;
        self.server.validate()?;
        self.database.validate()?;
        self.retry.validate()?;
        self.observability.validate()?;
        Ok(())
    }
}

impl WithDefaults for AppConfig {
    fn with_defaults() -> Self {
        Self {
            app: AppMetadata::default(),
            server: ServerConfig::with_defaults(),
            database: DatabaseConfig::with_defaults(),
            retry: RetryConfig::with_defaults(),
            observability: ObservabilityConfig::with_defaults(),
        }
    }
}

/// Load configuration from files and environment variables
///
/// Configuration loading follows this precedence (highest to lowest):
/// 1. Environment variables: POOLGUARD__SERVER__PORT=8080
/// 2. config/local.toml (git-ignored, developer overrides)
/// 3. config/{APP_ENV}.toml (development/staging/production)
/// 4. config/default.toml (base defaults)
pub fn load_config() -> Result<AppConfig, ConfigError> {
    use config::{Config, Environment, File};

    // Determine the environment
    let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

    // Build configuration with layered sources
    let config = Config::builder()
        // Layer 1: Base defaults
        .add_source(File::with_name("config/default").required(false))
        // Layer 2: Environment-specific overrides
        .add_source(File::with_name(&format!("config/{}", env)).required(false))
        // Layer 3: Local developer overrides (git-ignored)
        .add_source(File::with_name("config/local").required(false))
        // Layer 4: Environment variables (highest precedence)
        .add_source(Environment::with_prefix("POOLGUARD").separator("__"))
        .build()?;

    // Deserialize into AppConfig
    let app_config: AppConfig = config.try_deserialize()?;

    // Validate the configuration
    app_config.validate()?;

    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_metadata_defaults() {
        let metadata = AppMetadata::default();
        assert_eq!(metadata.name, "poolguard");
        assert!(!metadata.version.is_empty());
        assert_eq!(metadata.environment, "development");
        assert_eq!(metadata.shutdown_timeout, 30);
    }

    #[test]
    fn test_app_metadata_validation_empty_name() {
        let metadata = AppMetadata {
            name: "".to_string(),
            ..AppMetadata::default()
        };
        assert!(metadata.validate().is_err());
    }

    #[test]
    fn test_app_metadata_validation_zero_shutdown_timeout() {
        let metadata = AppMetadata {
            shutdown_timeout: 0,
            ..AppMetadata::default()
        };
        assert!(metadata.validate().is_err());
    }

    #[test]
    fn test_app_config_defaults_validate() {
        let config = AppConfig::with_defaults();
        assert!(config.validate().is_ok());
    }
}
