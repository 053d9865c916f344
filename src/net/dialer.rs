//! Dialer capability shared by every layer.
//!
//! A [`Dialer`] turns `(network, address)` into an established stream. Layers
//! compose by wrapping one dialer in another: a [`TcpDialer`](super::TcpDialer)
//! at the bottom, a [`ProxyDialer`](super::ProxyDialer) guarding each relay,
//! a [`LoadBalancedDialer`](crate::load_balancer::LoadBalancedDialer) on top.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::{DialError, DialResult};
use crate::net::ProxyEndpoint;

/// Any bidirectional byte stream a dialer can hand back.
pub trait Connection: AsyncRead + AsyncWrite + Unpin + Send + Sync + fmt::Debug {}

impl<T> Connection for T where T: AsyncRead + AsyncWrite + Unpin + Send + Sync + fmt::Debug {}

/// Type-erased connection returned by all dialers.
pub type BoxedConnection = Box<dyn Connection>;

/// Stream-oriented network to dial over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Network {
    /// IPv4 or IPv6.
    #[default]
    Tcp,
    Tcp4,
    Tcp6,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Tcp => "tcp",
            Network::Tcp4 => "tcp4",
            Network::Tcp6 => "tcp6",
        }
    }

    /// Whether an address of this family may be used for this network.
    pub fn accepts(&self, addr: &std::net::SocketAddr) -> bool {
        match self {
            Network::Tcp => true,
            Network::Tcp4 => addr.is_ipv4(),
            Network::Tcp6 => addr.is_ipv6(),
        }
    }
}

impl FromStr for Network {
    type Err = DialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tcp" => Ok(Network::Tcp),
            "tcp4" => Ok(Network::Tcp4),
            "tcp6" => Ok(Network::Tcp6),
            other => Err(DialError::UnsupportedNetwork(other.to_string())),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Establishes outbound connections.
#[async_trait]
pub trait Dialer: Send + Sync {
    /// Connect to `address` over `network`.
    async fn dial(&self, network: Network, address: &str) -> DialResult<BoxedConnection>;

    /// Connect to `address` through the relay described by `upstream`.
    ///
    /// The default opens a transport connection to the relay itself. Dialers
    /// that speak a proxy protocol override this to negotiate the tunnel to
    /// `address` using the relay's credentials.
    async fn dial_via(
        &self,
        upstream: &ProxyEndpoint,
        network: Network,
        address: &str,
    ) -> DialResult<BoxedConnection> {
        let _ = address;
        self.dial(network, &upstream.address()).await
    }
}

#[async_trait]
impl<D> Dialer for Arc<D>
where
    D: Dialer + ?Sized,
{
    async fn dial(&self, network: Network, address: &str) -> DialResult<BoxedConnection> {
        (**self).dial(network, address).await
    }

    async fn dial_via(
        &self,
        upstream: &ProxyEndpoint,
        network: Network,
        address: &str,
    ) -> DialResult<BoxedConnection> {
        (**self).dial_via(upstream, network, address).await
    }
}
