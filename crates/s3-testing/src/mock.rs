//! In-memory mock connection for pool tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use s3_driver_pool::PoolableConnection;
use thiserror::Error;

/// Errors produced by [`MockConnection`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MockError {
    /// Simulated establishment failure, armed via
    /// [`MockLedger::fail_next_connects`].
    #[error("simulated connect failure")]
    ConnectFailed,

    /// Close called on an already-closed connection.
    #[error("connection already closed")]
    AlreadyClosed,
}

/// Shared ledger of mock connection activity.
///
/// Cloning the ledger shares the underlying counters, so a test can keep a
/// handle while the pool owns the options.
#[derive(Debug, Clone, Default)]
pub struct MockLedger {
    inner: Arc<LedgerInner>,
}

#[derive(Debug, Default)]
struct LedgerInner {
    connects: AtomicUsize,
    closes: AtomicUsize,
    fail_connects: AtomicUsize,
}

impl MockLedger {
    /// Create a fresh ledger with zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of connections established so far.
    #[must_use]
    pub fn connects(&self) -> usize {
        self.inner.connects.load(Ordering::SeqCst)
    }

    /// Number of connections closed so far.
    #[must_use]
    pub fn closes(&self) -> usize {
        self.inner.closes.load(Ordering::SeqCst)
    }

    /// Arm the ledger so the next `count` establishment attempts fail with
    /// [`MockError::ConnectFailed`].
    pub fn fail_next_connects(&self, count: usize) {
        self.inner.fail_connects.store(count, Ordering::SeqCst);
    }

    fn take_failure(&self) -> bool {
        self.inner
            .fail_connects
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn next_id(&self) -> usize {
        self.inner.connects.fetch_add(1, Ordering::SeqCst)
    }

    fn record_close(&self) {
        self.inner.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Options for constructing a [`MockConnection`].
#[derive(Debug, Clone)]
pub struct MockOptions {
    /// Bucket subdomain reported by connections built from these options.
    pub subdomain: String,
    /// Whether connections report a persistent transport.
    pub persistent: bool,
    /// Simulated establishment latency.
    pub connect_delay: Duration,
    /// Activity ledger shared by all connections built from these options.
    pub ledger: MockLedger,
}

impl MockOptions {
    /// Options for connections routing to `subdomain`, persistent by
    /// default, with no simulated latency.
    pub fn new(subdomain: impl Into<String>) -> Self {
        Self {
            subdomain: subdomain.into(),
            persistent: true,
            connect_delay: Duration::ZERO,
            ledger: MockLedger::new(),
        }
    }

    /// Set whether connections report a persistent transport.
    #[must_use]
    pub fn persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    /// Set the simulated establishment latency.
    #[must_use]
    pub fn connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = delay;
        self
    }
}

/// In-memory connection implementing the pool's connection contract.
#[derive(Debug)]
pub struct MockConnection {
    id: usize,
    subdomain: String,
    persistent: bool,
    closed: bool,
    ledger: MockLedger,
}

impl MockConnection {
    /// Identifier assigned in creation order, starting at 0.
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Whether [`close`](PoolableConnection::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl PoolableConnection for MockConnection {
    type Options = MockOptions;
    type Error = MockError;

    async fn connect(options: &MockOptions) -> Result<Self, MockError> {
        if !options.connect_delay.is_zero() {
            tokio::time::sleep(options.connect_delay).await;
        }
        if options.ledger.take_failure() {
            return Err(MockError::ConnectFailed);
        }

        let id = options.ledger.next_id();
        tracing::debug!(id, subdomain = %options.subdomain, "mock connection established");

        Ok(Self {
            id,
            subdomain: options.subdomain.clone(),
            persistent: options.persistent,
            closed: false,
            ledger: options.ledger.clone(),
        })
    }

    fn is_persistent(&self) -> bool {
        self.persistent
    }

    async fn close(&mut self) -> Result<(), MockError> {
        if self.closed {
            return Err(MockError::AlreadyClosed);
        }
        self.closed = true;
        self.ledger.record_close();
        Ok(())
    }

    fn subdomain(&self) -> &str {
        &self.subdomain
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_assigns_sequential_ids() {
        let options = MockOptions::new("assets");

        let first = MockConnection::connect(&options).await.unwrap();
        let second = MockConnection::connect(&options).await.unwrap();

        assert_eq!(first.id(), 0);
        assert_eq!(second.id(), 1);
        assert_eq!(options.ledger.connects(), 2);
    }

    #[tokio::test]
    async fn test_armed_failures_are_consumed() {
        let options = MockOptions::new("assets");
        options.ledger.fail_next_connects(1);

        assert_eq!(
            MockConnection::connect(&options).await.unwrap_err(),
            MockError::ConnectFailed
        );
        // The armed failure is spent; the next attempt succeeds.
        assert!(MockConnection::connect(&options).await.is_ok());
        assert_eq!(options.ledger.connects(), 1);
    }

    #[tokio::test]
    async fn test_close_records_and_rejects_double_close() {
        let options = MockOptions::new("assets");
        let mut conn = MockConnection::connect(&options).await.unwrap();

        assert!(conn.close().await.is_ok());
        assert!(conn.is_closed());
        assert_eq!(options.ledger.closes(), 1);

        assert_eq!(conn.close().await.unwrap_err(), MockError::AlreadyClosed);
        assert_eq!(options.ledger.closes(), 1);
    }
}
