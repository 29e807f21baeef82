//! Pool configuration.

use std::time::Duration;

use crate::error::PoolError;

/// Default maximum number of connections in a pool.
pub const DEFAULT_POOL_SIZE: usize = 5;

/// Default total time a checkout may spend waiting for a connection.
pub const DEFAULT_MAX_CONNECTION_WAIT: Duration = Duration::from_secs(5);

/// Default interval between successive checkout wait attempts.
pub const DEFAULT_CONNECTION_WAIT: Duration = Duration::from_millis(250);

/// Configuration for the connection pool.
///
/// This struct is marked `#[non_exhaustive]` to allow adding new fields
/// in future minor versions without breaking changes. Use the builder
/// pattern methods or [`Default::default()`] to construct instances.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct PoolConfig {
    /// Maximum number of connections the pool will ever create.
    pub pool_size: usize,

    /// Total time a checkout may spend waiting before failing with
    /// [`PoolError::ConnectionUnavailable`].
    pub max_connection_wait: Duration,

    /// Interval between successive wait attempts during checkout.
    pub connection_wait: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            max_connection_wait: DEFAULT_MAX_CONNECTION_WAIT,
            connection_wait: DEFAULT_CONNECTION_WAIT,
        }
    }
}

impl PoolConfig {
    /// Create a new pool configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of connections.
    #[must_use]
    pub fn pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }

    /// Set the total checkout wait budget.
    #[must_use]
    pub fn max_connection_wait(mut self, wait: Duration) -> Self {
        self.max_connection_wait = wait;
        self
    }

    /// Set the interval between checkout wait attempts.
    #[must_use]
    pub fn connection_wait(mut self, wait: Duration) -> Self {
        self.connection_wait = wait;
        self
    }

    /// Number of wait attempts a checkout makes before giving up.
    ///
    /// Derived as `max_connection_wait / connection_wait`, with a floor of
    /// one attempt.
    #[must_use]
    pub fn max_connection_attempts(&self) -> u32 {
        if self.connection_wait.is_zero() {
            return 1;
        }
        let attempts = self.max_connection_wait.as_nanos() / self.connection_wait.as_nanos();
        u32::try_from(attempts).unwrap_or(u32::MAX).max(1)
    }

    /// Validate the configuration.
    pub fn validate<E>(&self) -> Result<(), PoolError<E>> {
        if self.pool_size == 0 {
            return Err(PoolError::Configuration(
                "pool_size must be greater than 0".into(),
            ));
        }
        if self.connection_wait.is_zero() {
            return Err(PoolError::Configuration(
                "connection_wait must be non-zero".into(),
            ));
        }
        if self.connection_wait > self.max_connection_wait {
            return Err(PoolError::Configuration(
                "connection_wait cannot be greater than max_connection_wait".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    type ValidationResult = Result<(), PoolError<std::io::Error>>;

    #[test]
    fn test_default_config() {
        let config = PoolConfig::default();
        assert_eq!(config.pool_size, 5);
        assert_eq!(config.max_connection_wait, Duration::from_secs(5));
        assert_eq!(config.connection_wait, Duration::from_millis(250));
    }

    #[test]
    fn test_config_builder_methods() {
        let config = PoolConfig::new()
            .pool_size(12)
            .max_connection_wait(Duration::from_secs(2))
            .connection_wait(Duration::from_millis(100));

        assert_eq!(config.pool_size, 12);
        assert_eq!(config.max_connection_wait, Duration::from_secs(2));
        assert_eq!(config.connection_wait, Duration::from_millis(100));
    }

    #[test]
    fn test_max_connection_attempts_derivation() {
        // 5s budget at 250ms per attempt
        let config = PoolConfig::default();
        assert_eq!(config.max_connection_attempts(), 20);

        let config = PoolConfig::new()
            .max_connection_wait(Duration::from_secs(1))
            .connection_wait(Duration::from_millis(250));
        assert_eq!(config.max_connection_attempts(), 4);
    }

    #[test]
    fn test_max_connection_attempts_floor() {
        // Budget shorter than one interval still yields one attempt
        let config = PoolConfig::new()
            .max_connection_wait(Duration::from_millis(100))
            .connection_wait(Duration::from_millis(100));
        assert_eq!(config.max_connection_attempts(), 1);
    }

    #[test]
    fn test_config_validation_success() {
        let config = PoolConfig::new().pool_size(1);
        let result: ValidationResult = config.validate();
        assert!(result.is_ok());
    }

    #[test]
    fn test_config_validation_zero_pool_size() {
        let config = PoolConfig::new().pool_size(0);
        let result: ValidationResult = config.validate();
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("pool_size must be greater than 0")
        );
    }

    #[test]
    fn test_config_validation_zero_connection_wait() {
        let config = PoolConfig::new().connection_wait(Duration::ZERO);
        let result: ValidationResult = config.validate();
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("connection_wait must be non-zero")
        );
    }

    #[test]
    fn test_config_validation_wait_exceeds_budget() {
        let config = PoolConfig::new()
            .max_connection_wait(Duration::from_millis(100))
            .connection_wait(Duration::from_millis(500));
        let result: ValidationResult = config.validate();
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("connection_wait cannot be greater than max_connection_wait")
        );
    }
}
