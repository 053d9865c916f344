//! Failover across several upstream relays.

use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use url::Url;

use crate::error::{DialError, DialResult};
use crate::net::{BoxedConnection, Dialer, Network, ProxyDialer};

/// Tries upstream dialers in ring order from a random start.
pub struct LoadBalancedDialer {
    upstreams: Vec<Arc<dyn Dialer>>,
}

impl LoadBalancedDialer {
    pub fn new(upstreams: Vec<Arc<dyn Dialer>>) -> DialResult<Self> {
        if upstreams.is_empty() {
            return Err(DialError::NoUpstreams);
        }
        Ok(Self { upstreams })
    }

    /// One circuit-breaking [`ProxyDialer`] per URL, all sharing `inner`.
    pub fn from_urls(inner: Arc<dyn Dialer>, urls: &[Url]) -> DialResult<Self> {
        let upstreams = urls
            .iter()
            .map(|url| {
                ProxyDialer::from_url(inner.clone(), url).map(|d| Arc::new(d) as Arc<dyn Dialer>)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(upstreams)
    }

    pub fn len(&self) -> usize {
        self.upstreams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upstreams.is_empty()
    }

    async fn dial_from(
        &self,
        start: usize,
        network: Network,
        address: &str,
    ) -> DialResult<BoxedConnection> {
        let len = self.upstreams.len();
        let mut last_error = None;

        for i in 0..len {
            let index = (start + i) % len;
            match self.upstreams[index].dial(network, address).await {
                Ok(conn) => return Ok(conn),
                Err(e) => {
                    tracing::debug!(upstream = index, error = %e, "Upstream dial failed, trying next");
                    last_error = Some(e);
                }
            }
        }

        Err(DialError::AllUpstreamsFailed {
            attempted: len,
            last: Box::new(last_error.unwrap_or(DialError::NoUpstreams)),
        })
    }
}

impl std::fmt::Debug for LoadBalancedDialer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadBalancedDialer")
            .field("upstreams", &self.upstreams.len())
            .finish()
    }
}

#[async_trait]
impl Dialer for LoadBalancedDialer {
    async fn dial(&self, network: Network, address: &str) -> DialResult<BoxedConnection> {
        let start = rand::thread_rng().gen_range(0..self.upstreams.len());
        self.dial_from(start, network, address).await
    }
}
