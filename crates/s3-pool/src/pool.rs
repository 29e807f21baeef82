//! Connection pool implementation.

use std::collections::VecDeque;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};
use tokio::time::timeout;

use crate::config::PoolConfig;
use crate::connection::PoolableConnection;
use crate::error::PoolError;
use crate::metrics::{MetricsRecorder, PoolMetrics};

/// A bounded pool of reusable endpoint connections.
///
/// The pool creates connections lazily up to [`PoolConfig::pool_size`],
/// hands them out with a bounded wait, and recycles them when the guard
/// returned by [`checkout`](Self::checkout) is dropped.
///
/// Capacity is enforced structurally: a semaphore holds one permit per
/// connection slot, so a checked-in connection wakes a waiting checkout
/// immediately rather than being discovered on a poll tick. Each pool
/// instance synchronizes independently; distinct pools never contend with
/// each other.
///
/// Share the pool across tasks by wrapping it in an [`Arc`].
pub struct ConnectionPool<C: PoolableConnection> {
    inner: Arc<PoolInner<C>>,
}

struct PoolInner<C: PoolableConnection> {
    config: PoolConfig,
    options: C::Options,
    semaphore: Arc<Semaphore>,
    state: Mutex<PoolState<C>>,
    metrics: MetricsRecorder,
}

struct PoolState<C> {
    /// Idle connections, FIFO: the longest-idle connection is reused first.
    available: VecDeque<C>,
    /// Connections created over the life of the pool. Grows monotonically,
    /// reset only by [`ConnectionPool::disconnect`].
    total_created: usize,
    /// Routing identity captured from the first-created connection.
    subdomain: Option<String>,
}

impl<C: PoolableConnection> ConnectionPool<C> {
    /// Create a pool and eagerly establish its first connection.
    ///
    /// The eager connection guarantees the first checkout never waits and
    /// surfaces bad options here rather than on first use; if it fails, the
    /// whole pool construction fails.
    pub async fn connect(
        config: PoolConfig,
        options: C::Options,
    ) -> Result<Self, PoolError<C::Error>> {
        config.validate()?;

        let pool = Self {
            inner: Arc::new(PoolInner {
                semaphore: Arc::new(Semaphore::new(config.pool_size)),
                state: Mutex::new(PoolState {
                    available: VecDeque::with_capacity(config.pool_size),
                    total_created: 0,
                    subdomain: None,
                }),
                metrics: MetricsRecorder::default(),
                options,
                config,
            }),
        };

        let conn = pool.new_connection().await?;
        pool.inner.state.lock().available.push_back(conn);

        Ok(pool)
    }

    /// Create a pool with the default [`PoolConfig`].
    pub async fn with_defaults(options: C::Options) -> Result<Self, PoolError<C::Error>> {
        Self::connect(PoolConfig::default(), options).await
    }

    /// Get a connection from the pool, waiting up to
    /// [`PoolConfig::max_connection_wait`] for one to become available.
    ///
    /// Returns an idle connection if one exists (FIFO), creates a new one if
    /// the pool is under capacity, and otherwise waits for a checkin. The
    /// wait is bounded: after `max_connection_attempts` intervals of
    /// `connection_wait` each, checkout fails with
    /// [`PoolError::ConnectionUnavailable`].
    pub async fn checkout(&self) -> Result<PooledConnection<C>, PoolError<C::Error>> {
        tracing::trace!("acquiring connection from pool");

        let mut attempts = self.inner.config.max_connection_attempts();
        let permit = loop {
            let acquire = Arc::clone(&self.inner.semaphore).acquire_owned();
            match timeout(self.inner.config.connection_wait, acquire).await {
                Ok(Ok(permit)) => break permit,
                // The pool never closes the semaphore.
                Ok(Err(_)) => return Err(self.exhausted()),
                Err(_) => {
                    attempts -= 1;
                    if attempts == 0 {
                        return Err(self.exhausted());
                    }
                    tracing::debug!(
                        remaining_attempts = attempts,
                        "pool exhausted, waiting for a connection"
                    );
                }
            }
        };

        self.acquire_with_permit(permit).await
    }

    /// Single non-blocking checkout attempt.
    ///
    /// Returns `Ok(None)` when the pool is exhausted (all connections
    /// checked out and the size cap reached); absence, not an error.
    pub async fn try_checkout(&self) -> Result<Option<PooledConnection<C>>, PoolError<C::Error>> {
        let permit = match Arc::clone(&self.inner.semaphore).try_acquire_owned() {
            Ok(permit) => permit,
            Err(TryAcquireError::NoPermits | TryAcquireError::Closed) => return Ok(None),
        };
        self.acquire_with_permit(permit).await.map(Some)
    }

    /// Check out a connection, run `action` with it, and check it back in
    /// on every exit path.
    ///
    /// The action's result or failure is forwarded to the caller. If the
    /// checkout itself fails, no checkin is attempted and the failure
    /// propagates.
    pub async fn with_connection<T, E, F>(&self, action: F) -> Result<T, E>
    where
        F: AsyncFnOnce(&mut C) -> Result<T, E>,
        E: From<PoolError<C::Error>>,
    {
        let mut conn = self.checkout().await?;
        action(&mut *conn).await
    }

    /// Close every idle connection and reset the pool to empty.
    ///
    /// Persistent connections are closed explicitly; close failures are
    /// logged and do not abort the drain. A subsequent checkout starts
    /// creating connections from scratch.
    ///
    /// Must only be called while no connections are checked out: a guard
    /// still held across a drain keeps custody of a connection the pool no
    /// longer accounts for.
    pub async fn disconnect(&self) {
        let drained: Vec<C> = {
            let mut state = self.inner.state.lock();
            state.total_created = 0;
            state.subdomain = None;
            state.available.drain(..).collect()
        };

        let count = drained.len();
        for mut conn in drained {
            if conn.is_persistent() {
                if let Err(error) = conn.close().await {
                    tracing::warn!(%error, "failed to close pooled connection");
                }
            }
            self.inner.metrics.record_connection_closed();
        }

        tracing::info!(closed = count, "connection pool drained");
    }

    /// Whether the pool has created any connections since construction or
    /// the last [`disconnect`](Self::disconnect).
    #[must_use]
    pub fn has_connections(&self) -> bool {
        self.inner.state.lock().total_created > 0
    }

    /// Bucket subdomain of the first-created connection.
    ///
    /// `None` once the pool has been drained. The value derives solely from
    /// the immutable connection options, so it is stable across the life of
    /// the pool's connections.
    #[must_use]
    pub fn subdomain(&self) -> Option<String> {
        self.inner.state.lock().subdomain.clone()
    }

    /// Get the current pool status.
    #[must_use]
    pub fn status(&self) -> PoolStatus {
        let state = self.inner.state.lock();
        let available = state.available.len();
        PoolStatus {
            available,
            in_use: state.total_created.saturating_sub(available),
            total: state.total_created,
            max: self.inner.config.pool_size,
        }
    }

    /// Snapshot of the pool's activity counters.
    #[must_use]
    pub fn metrics(&self) -> PoolMetrics {
        self.inner.metrics.snapshot()
    }

    /// Get the pool configuration.
    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }

    /// Pop the longest-idle connection, or establish a new one. The caller
    /// must hold a capacity permit, which keeps `total_created` within
    /// `pool_size`.
    async fn acquire_with_permit(
        &self,
        permit: OwnedSemaphorePermit,
    ) -> Result<PooledConnection<C>, PoolError<C::Error>> {
        let idle = self.inner.state.lock().available.pop_front();
        let conn = match idle {
            Some(conn) => {
                tracing::trace!("reusing idle connection");
                conn
            }
            None => match self.new_connection().await {
                Ok(conn) => conn,
                Err(error) => {
                    self.inner.metrics.record_checkout_failure();
                    return Err(error);
                }
            },
        };

        self.inner.metrics.record_checkout_success();
        Ok(PooledConnection {
            conn: Some(conn),
            inner: Arc::clone(&self.inner),
            permit: Some(permit),
        })
    }

    async fn new_connection(&self) -> Result<C, PoolError<C::Error>> {
        let conn = C::connect(&self.inner.options)
            .await
            .map_err(PoolError::Connect)?;

        let mut state = self.inner.state.lock();
        state.total_created += 1;
        if state.subdomain.is_none() {
            state.subdomain = Some(conn.subdomain().to_owned());
        }
        self.inner.metrics.record_connection_created();
        tracing::debug!(total = state.total_created, "established new pooled connection");

        Ok(conn)
    }

    fn exhausted(&self) -> PoolError<C::Error> {
        self.inner.metrics.record_checkout_failure();
        tracing::debug!(
            pool_size = self.inner.config.pool_size,
            "connection pool exhausted"
        );
        PoolError::ConnectionUnavailable {
            pool_size: self.inner.config.pool_size,
            waited: self.inner.config.max_connection_wait,
        }
    }
}

impl<C: PoolableConnection> PoolInner<C> {
    fn checkin(&self, conn: C) {
        let mut state = self.state.lock();
        state.available.push_back(conn);
        tracing::trace!(idle = state.available.len(), "returned connection to pool");
    }
}

/// Status information about the pool.
#[derive(Debug, Clone, Copy)]
pub struct PoolStatus {
    /// Number of idle connections available.
    pub available: usize,
    /// Number of connections currently checked out.
    pub in_use: usize,
    /// Total number of connections created so far.
    pub total: usize,
    /// Maximum allowed connections.
    pub max: usize,
}

impl PoolStatus {
    /// Checked-out connections as a percentage of the size cap.
    #[must_use]
    pub fn utilization(&self) -> f64 {
        if self.max == 0 {
            return 0.0;
        }
        self.in_use as f64 / self.max as f64 * 100.0
    }
}

/// A connection checked out from the pool.
///
/// Dereferences to the underlying connection. When dropped, the connection
/// is returned to the pool and the freed slot immediately wakes one waiting
/// checkout.
pub struct PooledConnection<C: PoolableConnection> {
    conn: Option<C>,
    inner: Arc<PoolInner<C>>,
    permit: Option<OwnedSemaphorePermit>,
}

impl<C: PoolableConnection> PooledConnection<C> {
    /// Remove the connection from pool custody.
    ///
    /// The connection will not be returned to the pool, and its capacity
    /// slot is forfeited for the life of the pool: the pool never creates a
    /// replacement for a detached connection.
    #[must_use]
    pub fn detach(mut self) -> Option<C> {
        if let Some(permit) = self.permit.take() {
            permit.forget();
        }
        self.conn.take()
    }
}

impl<C: PoolableConnection> Deref for PooledConnection<C> {
    type Target = C;

    fn deref(&self) -> &C {
        match &self.conn {
            Some(conn) => conn,
            // conn is only None after detach(), which consumes self
            None => unreachable!("connection already detached"),
        }
    }
}

impl<C: PoolableConnection> DerefMut for PooledConnection<C> {
    fn deref_mut(&mut self) -> &mut C {
        match &mut self.conn {
            Some(conn) => conn,
            None => unreachable!("connection already detached"),
        }
    }
}

impl<C> fmt::Debug for PooledConnection<C>
where
    C: PoolableConnection + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledConnection")
            .field("conn", &self.conn)
            .finish_non_exhaustive()
    }
}

impl<C: PoolableConnection> Drop for PooledConnection<C> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.inner.checkin(conn);
        }
        // The permit drops after the checkin above, so a woken waiter always
        // finds the idle connection.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_utilization() {
        let status = PoolStatus {
            available: 1,
            in_use: 3,
            total: 4,
            max: 4,
        };
        assert!((status.utilization() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_status_utilization_empty_pool() {
        let status = PoolStatus {
            available: 0,
            in_use: 0,
            total: 0,
            max: 0,
        };
        assert!((status.utilization() - 0.0).abs() < f64::EPSILON);
    }
}
