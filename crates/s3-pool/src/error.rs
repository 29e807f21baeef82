//! Pool error types.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during pool operations.
///
/// Generic over the connection's own error type so that establishment
/// failures propagate unmodified.
#[derive(Debug, Error)]
pub enum PoolError<E> {
    /// Checkout exhausted its wait budget without finding or creating a
    /// free connection.
    ///
    /// The pool's internal state is unaffected; the caller may retry later.
    #[error(
        "could not get connection from pool size of {pool_size} in {:?} seconds",
        .waited.as_secs_f64()
    )]
    ConnectionUnavailable {
        /// Configured maximum number of connections.
        pool_size: usize,
        /// Total time spent waiting before giving up.
        waited: Duration,
    },

    /// Connection establishment failed.
    #[error("failed to create connection: {0}")]
    Connect(#[source] E),

    /// Pool configuration error.
    #[error("pool configuration error: {0}")]
    Configuration(String),
}
