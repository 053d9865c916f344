//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! ProxyDialer / LoadBalancedDialer produce:
//!     → logging.rs (structured log events: breaker transitions, failovers)
//!     → metrics.rs (attempt/rejection counters, circuit state gauge)
//! ```
//!
//! # Design Decisions
//! - The circuit breaker itself stays silent; the dialer wrapping it reports
//! - Metrics are cheap (no-ops without a recorder)

pub mod logging;
pub mod metrics;
