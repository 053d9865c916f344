//! Plain TCP transport dialer.

use std::time::Duration;

use async_trait::async_trait;
use tokio::net::{lookup_host, TcpStream};

use crate::error::{DialError, DialResult};
use crate::net::{BoxedConnection, Dialer, Network};
use crate::resilience::timeouts::{with_connect_timeout, DEFAULT_CONNECT_TIMEOUT};

/// Direct TCP dialer used at the bottom of a dialer stack.
#[derive(Debug, Clone)]
pub struct TcpDialer {
    connect_timeout: Duration,
}

impl TcpDialer {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}

impl Default for TcpDialer {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

#[async_trait]
impl Dialer for TcpDialer {
    async fn dial(&self, network: Network, address: &str) -> DialResult<BoxedConnection> {
        let candidates: Vec<_> = lookup_host(address)
            .await?
            .filter(|addr| network.accepts(addr))
            .collect();

        // Each resolved address gets its own deadline; the last error wins.
        let mut last_error = None;
        for addr in candidates {
            match with_connect_timeout(address, self.connect_timeout, TcpStream::connect(addr)).await {
                Ok(stream) => {
                    if let Err(e) = stream.set_nodelay(true) {
                        tracing::debug!(%addr, error = %e, "Failed to set TCP_NODELAY");
                    }
                    return Ok(Box::new(stream));
                }
                Err(e) => {
                    tracing::trace!(%addr, error = %e, "Connect attempt failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DialError::NoAddresses {
            address: address.to_string(),
            network: network.to_string(),
        }))
    }
}
