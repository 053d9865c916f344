//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Dial(network, address)
//!     → proxy_dialer.rs (circuit breaker admit: reject fast when open)
//!     → dialer.rs (Dialer::dial_via with the relay endpoint)
//!     → tcp.rs (resolve, connect with timeout)
//!     → proxy_dialer.rs (record outcome, return connection or error unchanged)
//! ```
//!
//! # Design Decisions
//! - Every layer exposes the same `Dialer` capability, so layers compose freely
//! - Proxy protocol negotiation is layered beneath by overriding `dial_via`
//! - The breaker never wraps or rewrites underlying errors

pub mod dialer;
pub mod endpoint;
pub mod proxy_dialer;
pub mod tcp;

pub use dialer::{BoxedConnection, Connection, Dialer, Network};
pub use endpoint::{Credentials, ProxyEndpoint, ProxyScheme};
pub use proxy_dialer::ProxyDialer;
pub use tcp::TcpDialer;
