//! Error definitions shared by the dialers.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by [`Dialer::dial`](crate::net::Dialer::dial).
#[derive(Debug, Error)]
pub enum DialError {
    /// The upstream's circuit breaker rejected the attempt without dialing.
    #[error("circuit breaker is open for upstream {upstream}")]
    CircuitOpen { upstream: String },

    /// Transport-level failure reported by the underlying dialer.
    #[error("dial failed: {0}")]
    Io(#[from] io::Error),

    /// Connection establishment exceeded its deadline.
    #[error("connect to {address} timed out after {after:?}")]
    Timeout { address: String, after: Duration },

    /// Name resolution returned no address usable for the requested network.
    #[error("no {network} address found for {address}")]
    NoAddresses { address: String, network: String },

    /// Network name is not one of tcp, tcp4, tcp6.
    #[error("unsupported network: {0}")]
    UnsupportedNetwork(String),

    /// Every upstream of a load-balanced dialer failed or was rejected.
    #[error("all {attempted} upstreams failed, last error: {last}")]
    AllUpstreamsFailed {
        attempted: usize,
        #[source]
        last: Box<DialError>,
    },

    /// A load-balanced dialer was built without upstreams.
    #[error("no upstream proxies configured")]
    NoUpstreams,

    /// An upstream URL could not be turned into a proxy endpoint.
    #[error("invalid upstream: {0}")]
    InvalidUpstream(#[from] EndpointError),
}

impl DialError {
    /// True when the attempt was refused by a circuit breaker rather than the network.
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, DialError::CircuitOpen { .. })
    }
}

/// Result type for dial operations.
pub type DialResult<T> = Result<T, DialError>;

/// Errors building a [`ProxyEndpoint`](crate::net::ProxyEndpoint) from a URL.
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("invalid proxy URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported proxy scheme: {0}")]
    UnsupportedScheme(String),

    #[error("proxy URL has no host")]
    MissingHost,
}
