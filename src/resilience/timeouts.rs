//! Timeout enforcement for connection establishment.
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other dial errors
//! - The circuit breaker imposes no deadline of its own; the transport dialer does

use std::future::Future;
use std::time::Duration;

use crate::error::{DialError, DialResult};

/// Default per-address connect timeout of [`TcpDialer`](crate::net::TcpDialer).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Run a connect future under a deadline, mapping expiry to [`DialError::Timeout`].
pub async fn with_connect_timeout<T, F>(address: &str, after: Duration, connect: F) -> DialResult<T>
where
    F: Future<Output = std::io::Result<T>>,
{
    match tokio::time::timeout(after, connect).await {
        Ok(result) => result.map_err(DialError::from),
        Err(_) => Err(DialError::Timeout {
            address: address.to_string(),
            after,
        }),
    }
}
