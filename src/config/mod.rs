pub mod app;
pub mod database;
pub mod observability;
pub mod retry;
pub mod server;

pub use app::{AppConfig, AppMetadata};
pub use database::{DatabaseConfig, DatabaseDriver};
pub use observability::{LogFormat, ObservabilityConfig};
pub use retry::RetryConfig;
pub use server::ServerConfig;

use thiserror::Error;

/// Errors produced while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The underlying configuration sources could not be read or merged.
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),
    /// A loaded value failed validation.
    #[error("invalid configuration: {0}")]
    ValidationError(String),
}

/// Validation hook implemented by every configuration section.
pub trait Validate {
    fn validate(&self) -> Result<(), ConfigError>;
}

/// Construct a section populated with its documented defaults.
pub trait WithDefaults {
    fn with_defaults() -> Self;
}

/// Load the application configuration from files and environment variables
pub fn load() -> Result<AppConfig, ConfigError> {
    app::load_config()
}
