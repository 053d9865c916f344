//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Dial(network, address)
//!     → balanced.rs (pick a random starting upstream)
//!     → ProxyDialer per upstream (own circuit breaker each)
//!     → first success wins; rejections and failures move to the next upstream
//!     → all failed: AllUpstreamsFailed with the last error
//! ```
//!
//! # Design Decisions
//! - Random start spreads load without shared counters
//! - Open circuits cost nothing to skip (rejected without I/O)

pub mod balanced;

pub use balanced::LoadBalancedDialer;
