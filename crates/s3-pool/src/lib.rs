//! # s3-driver-pool
//!
//! Purpose-built connection pool for S3-compatible object storage endpoints.
//!
//! Requests to an object store are short-lived but frequent, so the driver
//! keeps a bounded set of reusable endpoint connections instead of opening
//! one per request. The pool creates connections lazily up to a configured
//! maximum, hands them out with a bounded wait, and recycles them when the
//! caller is done.
//!
//! ## Features
//!
//! - Bounded pool size with lazy connection creation
//! - Blocking checkout with a configurable total wait budget
//! - RAII checkin: connections return to the pool when dropped
//! - Scoped acquisition via [`ConnectionPool::with_connection`]
//! - Bulk teardown of persistent connections via
//!   [`ConnectionPool::disconnect`]
//! - Checkout/creation counters for pool health monitoring
//!
//! ## Example
//!
//! ```rust,ignore
//! use s3_driver_pool::{ConnectionPool, PoolConfig};
//!
//! let config = PoolConfig::new()
//!     .pool_size(8)
//!     .max_connection_wait(Duration::from_secs(2));
//!
//! let pool = ConnectionPool::<EndpointConnection>::connect(config, options).await?;
//!
//! let conn = pool.checkout().await?;
//! // Use connection...
//! // Connection automatically returned to pool on drop
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod connection;
pub mod error;
pub mod metrics;
pub mod pool;

pub use config::PoolConfig;
pub use connection::PoolableConnection;
pub use error::PoolError;
pub use metrics::PoolMetrics;
pub use pool::{ConnectionPool, PoolStatus, PooledConnection};
