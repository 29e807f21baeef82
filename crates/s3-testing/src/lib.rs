//! # s3-testing
//!
//! Test infrastructure for the S3 driver connection pool.
//!
//! This crate provides an in-memory [`MockConnection`] implementing the
//! pool's connection contract, with a shared [`MockLedger`] that records
//! establishment and close activity so tests can assert on connection
//! lifecycle without a network.
//!
//! ## Example
//!
//! ```rust,ignore
//! use s3_driver_pool::ConnectionPool;
//! use s3_testing::{MockConnection, MockOptions};
//!
//! #[tokio::test]
//! async fn test_with_mock_connection() {
//!     let options = MockOptions::new("assets");
//!     let ledger = options.ledger.clone();
//!
//!     let pool = ConnectionPool::<MockConnection>::with_defaults(options)
//!         .await
//!         .unwrap();
//!
//!     assert_eq!(ledger.connects(), 1);
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod mock;

pub use mock::{MockConnection, MockError, MockLedger, MockOptions};
