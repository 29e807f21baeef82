//! Connection contract between the pool and the endpoint transport.
//!
//! The pool treats a connection as an opaque handle. The transport layer
//! (HTTP keep-alive handling, request signing, the S3 wire protocol) lives
//! behind this trait; the pool only creates, hands out, and closes
//! instances of it.

/// A connection the pool can create and recycle.
///
/// # Native Async Traits
///
/// This uses native async traits (Rust 2024 Edition) for zero overhead.
/// The pool is generic over the implementation, so no trait objects are
/// involved.
#[allow(async_fn_in_trait)]
pub trait PoolableConnection: Send + Sized + 'static {
    /// Options the connection is constructed from.
    ///
    /// The pool clones the options once at construction time and passes the
    /// same value to every connection it creates, so later mutation of the
    /// caller's original has no effect on the pool.
    type Options: Clone + Send + Sync + 'static;

    /// Error produced when establishing or closing a connection.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Establish a new connection from the given options.
    async fn connect(options: &Self::Options) -> Result<Self, Self::Error>;

    /// Whether the underlying transport is persistent (keep-alive).
    ///
    /// Only persistent connections are explicitly closed during
    /// [`ConnectionPool::disconnect`](crate::ConnectionPool::disconnect);
    /// non-persistent transports tear down on their own.
    fn is_persistent(&self) -> bool;

    /// Close the connection.
    ///
    /// Must succeed on a connection that was never used.
    async fn close(&mut self) -> Result<(), Self::Error>;

    /// Bucket subdomain this connection routes requests to.
    fn subdomain(&self) -> &str;
}
