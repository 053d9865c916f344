//! Dialer metrics.
//!
//! # Metrics
//! - `proxy_dialer_attempts_total` (counter): dials that reached the upstream, by outcome
//! - `proxy_dialer_rejections_total` (counter): dials refused by an open circuit
//! - `proxy_dialer_circuit_state` (gauge): 0=closed, 1=half-open, 2=open
//!
//! # Design Decisions
//! - Emitted through the `metrics` facade; no-ops until the binary installs a recorder
//! - Labelled by upstream (`scheme://host:port`, never credentials)

use crate::resilience::circuit_breaker::CircuitState;

/// Record the outcome of a dial that was attempted.
pub fn record_dial_attempt(upstream: &str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    ::metrics::counter!(
        "proxy_dialer_attempts_total",
        "upstream" => upstream.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record a dial refused by the circuit breaker.
pub fn record_dial_rejected(upstream: &str) {
    ::metrics::counter!("proxy_dialer_rejections_total", "upstream" => upstream.to_string())
        .increment(1);
}

/// Publish the current breaker state.
pub fn record_circuit_state(upstream: &str, state: CircuitState) {
    let value = match state {
        CircuitState::Closed => 0.0,
        CircuitState::HalfOpen => 1.0,
        CircuitState::Open => 2.0,
    };
    ::metrics::gauge!("proxy_dialer_circuit_state", "upstream" => upstream.to_string()).set(value);
}
