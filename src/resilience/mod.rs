//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Dial to upstream relay:
//!     → circuit_breaker.rs (admit, or reject fast while open)
//!     → timeouts.rs (connect deadline inside the transport dialer)
//!     → circuit_breaker.rs (record outcome, open/close circuit)
//!
//! Caller on failure (optional):
//!     → backoff.rs (jittered delay before its own retry)
//! ```
//!
//! # Design Decisions
//! - Dialers never retry; retry policy belongs to the caller
//! - Open circuits cost no I/O and no latency
//! - Breaker state is per upstream and lives only in memory

pub mod backoff;
pub mod circuit_breaker;
pub mod timeouts;
