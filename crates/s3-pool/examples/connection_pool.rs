//! Connection pooling with metrics example.
//!
//! Demonstrates checkout/checkin against a simulated endpoint connection
//! and how to monitor pool health through status and metrics.
//!
//! # Running
//!
//! ```bash
//! cargo run --example connection_pool
//! ```

// Allow common patterns in example code
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use s3_driver_pool::{ConnectionPool, PoolConfig, PoolError, PoolableConnection};

/// Simulated endpoint connection; stands in for a real HTTPS transport.
#[derive(Debug)]
struct DemoConnection {
    subdomain: String,
    persistent: bool,
}

#[derive(Debug, Clone)]
struct DemoOptions {
    subdomain: String,
    connect_latency: Duration,
}

#[derive(Debug, thiserror::Error)]
#[error("demo endpoint unreachable")]
struct DemoError;

impl PoolableConnection for DemoConnection {
    type Options = DemoOptions;
    type Error = DemoError;

    async fn connect(options: &DemoOptions) -> Result<Self, DemoError> {
        tokio::time::sleep(options.connect_latency).await;
        Ok(Self {
            subdomain: options.subdomain.clone(),
            persistent: true,
        })
    }

    fn is_persistent(&self) -> bool {
        self.persistent
    }

    async fn close(&mut self) -> Result<(), DemoError> {
        self.persistent = false;
        Ok(())
    }

    fn subdomain(&self) -> &str {
        &self.subdomain
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("=== Connection Pool with Metrics Example ===\n");

    let config = PoolConfig::new()
        .pool_size(4)
        .max_connection_wait(Duration::from_secs(2))
        .connection_wait(Duration::from_millis(100));

    println!("Pool configuration:");
    println!("  Pool size: {}", config.pool_size);
    println!("  Max connection wait: {:?}", config.max_connection_wait);
    println!("  Connection wait: {:?}", config.connection_wait);
    println!();

    let options = DemoOptions {
        subdomain: "assets".into(),
        connect_latency: Duration::from_millis(30),
    };

    let pool: Arc<ConnectionPool<DemoConnection>> =
        Arc::new(ConnectionPool::connect(config, options).await?);

    println!(
        "Pool created; routing to subdomain {:?}\n",
        pool.subdomain().unwrap_or_default()
    );

    // Example 1: Basic checkout/checkin
    println!("1. Basic checkout:");
    {
        let conn = pool.checkout().await?;
        println!("  Checked out connection to {:?}", conn.subdomain());
        // Connection is automatically returned to the pool when dropped
    }
    print_pool_status(&pool);

    // Example 2: Scoped acquisition
    println!("\n2. Scoped acquisition:");
    let bytes = pool
        .with_connection(async |conn| {
            // Simulate a GET against the endpoint
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok::<_, PoolError<DemoError>>(conn.subdomain().len() * 512)
        })
        .await?;
    println!("  Fetched {bytes} bytes");

    // Example 3: Concurrent usage (12 tasks over 4 connections)
    println!("\n3. Concurrent pool usage:");
    let mut handles = vec![];
    for i in 0..12 {
        let pool = Arc::clone(&pool);
        handles.push(tokio::spawn(async move {
            let conn = pool.checkout().await?;
            // Simulate some work
            tokio::time::sleep(Duration::from_millis(50)).await;
            drop(conn);
            Ok::<_, PoolError<DemoError>>(i)
        }));
    }

    let mut completed = 0;
    for handle in handles {
        if handle.await?.is_ok() {
            completed += 1;
        }
    }
    println!("  Completed {completed} requests");
    print_pool_status(&pool);
    print_pool_metrics(&pool);

    // Example 4: Graceful teardown
    println!("\n4. Graceful teardown:");
    pool.disconnect().await;
    println!("  Pool drained; has connections: {}", pool.has_connections());
    print_pool_metrics(&pool);

    Ok(())
}

fn print_pool_status(pool: &ConnectionPool<DemoConnection>) {
    let status = pool.status();
    println!(
        "  Status: {}/{} connections in use ({:.1}% utilization), {} idle",
        status.in_use,
        status.max,
        status.utilization(),
        status.available
    );
}

fn print_pool_metrics(pool: &ConnectionPool<DemoConnection>) {
    let metrics = pool.metrics();
    println!("  Metrics:");
    println!("    Connections created: {}", metrics.connections_created);
    println!("    Connections closed: {}", metrics.connections_closed);
    println!(
        "    Checkout success rate: {:.2}%",
        metrics.checkout_success_rate() * 100.0
    );
}
