use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{ConfigError, Validate, WithDefaults};

/// Retry configuration for establishing the connection pool
///
/// The same policy bounds the initial startup connect and every reconnect
/// cycle triggered by a fatal pool error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of connection attempts per connect cycle
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Initial backoff delay in milliseconds
    #[serde(default = "default_base_delay")]
    pub base_delay: u64,
    /// Backoff ceiling in milliseconds
    #[serde(default = "default_max_delay")]
    pub max_delay: u64,
}

impl RetryConfig {
    /// Backoff delay inserted after the given 1-indexed failed attempt.
    ///
    /// Doubles from `base_delay` and is capped at `max_delay`:
    /// `min(base_delay * 2^(attempt - 1), max_delay)`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = 2u64.saturating_pow(attempt.saturating_sub(1));
        let delay = self.base_delay.saturating_mul(exp).min(self.max_delay);
        Duration::from_millis(delay)
    }
}

// Default functions for RetryConfig
fn default_max_attempts() -> u32 {
    10
}

fn default_base_delay() -> u64 {
    5000 // milliseconds
}

fn default_max_delay() -> u64 {
    30000 // milliseconds
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay: default_base_delay(),
            max_delay: default_max_delay(),
        }
    }
}

impl Validate for RetryConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "retry.max_attempts must be > 0".to_string(),
            ));
        }
        if self.base_delay == 0 {
            return Err(ConfigError::ValidationError(
                "retry.base_delay must be > 0".to_string(),
            ));
        }
        if self.max_delay == 0 {
            return Err(ConfigError::ValidationError(
                "retry.max_delay must be > 0".to_string(),
            ));
        }
        if self.base_delay > self.max_delay {
            return Err(ConfigError::ValidationError(
                "retry.base_delay must be <= max_delay".to_string(),
            ));
        }
        Ok(())
    }
}

impl WithDefaults for RetryConfig {
    fn with_defaults() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_config_defaults() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 10);
        assert_eq!(config.base_delay, 5000);
        assert_eq!(config.max_delay, 30000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_delay_doubles_per_attempt() {
        let config = RetryConfig {
            max_attempts: 10,
            base_delay: 100,
            max_delay: 1000,
        };
        assert_eq!(config.delay_for(1), Duration::from_millis(100));
        assert_eq!(config.delay_for(2), Duration::from_millis(200));
        assert_eq!(config.delay_for(3), Duration::from_millis(400));
        assert_eq!(config.delay_for(4), Duration::from_millis(800));
    }

    #[test]
    fn test_delay_is_capped_at_max_delay() {
        let config = RetryConfig {
            max_attempts: 10,
            base_delay: 100,
            max_delay: 1000,
        };
        assert_eq!(config.delay_for(5), Duration::from_millis(1000));
        assert_eq!(config.delay_for(6), Duration::from_millis(1000));
        assert_eq!(config.delay_for(64), Duration::from_millis(1000));
    }

    #[test]
    fn test_delay_cap_below_second_step() {
        let config = RetryConfig {
            max_attempts: 10,
            base_delay: 100,
            max_delay: 150,
        };
        assert_eq!(config.delay_for(1), Duration::from_millis(100));
        assert_eq!(config.delay_for(2), Duration::from_millis(150));
        assert_eq!(config.delay_for(3), Duration::from_millis(150));
    }

    #[test]
    fn test_validation_zero_max_attempts() {
        let config = RetryConfig {
            max_attempts: 0,
            ..RetryConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_base_delay() {
        let config = RetryConfig {
            base_delay: 0,
            ..RetryConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_base_delay_greater_than_max() {
        let config = RetryConfig {
            base_delay: 60000,
            max_delay: 30000,
            ..RetryConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
