//! Circuit breaker guarding dials to one upstream relay.
//!
//! # States
//! - Closed: normal operation, dials pass through
//! - Open: upstream assumed down, dials fail fast
//! - Half-Open: a single probe dial tests whether the upstream recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive_failures >= open_threshold
//!               (streak decays to zero after reset_failures_timeout without failures)
//! Open → Half-Open: half_open_timeout elapsed since opening, one probe admitted
//! Half-Open → Closed: probe succeeds
//! Half-Open → Open: probe fails, half-open wait restarts
//! ```
//!
//! # Design Decisions
//! - One breaker per upstream (not global)
//! - All state lives behind one mutex; every transition is a single critical section
//! - The lock is never held across the dial itself
//! - Admitting the probe and marking it in flight happen under the same lock

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::time::Instant;

use crate::config::BreakerConfig;

/// Mode of a [`CircuitBreaker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

/// State change caused by settling an admitted dial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Failure threshold reached while closed.
    Opened,
    /// Probe succeeded.
    Closed,
    /// Probe failed; the half-open wait starts over.
    Reopened,
}

/// Point-in-time view of a breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerSnapshot {
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub probe_in_flight: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdmissionKind {
    Regular,
    Probe,
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    consecutive_failures: u32,
    last_failure_at: Option<Instant>,
    opened_at: Option<Instant>,
    probe_in_flight: bool,
}

/// Thread-safe circuit breaker.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: BreakerConfig,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    /// Create a closed breaker with no recorded failures.
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                last_failure_at: None,
                opened_at: None,
                probe_in_flight: false,
            }),
        }
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let inner = self.lock();
        BreakerSnapshot {
            state: inner.state,
            consecutive_failures: inner.consecutive_failures,
            probe_in_flight: inner.probe_in_flight,
        }
    }

    /// Decide whether a dial may be attempted now.
    ///
    /// Every `true` must be followed by exactly one [`record`](Self::record).
    /// Prefer [`try_admit`](Self::try_admit), which settles through a token.
    pub fn admit(&self) -> bool {
        self.admit_at(Instant::now()).is_some()
    }

    /// Report the outcome of a dial admitted by [`admit`](Self::admit).
    ///
    /// While half-open the outcome is taken as the probe's.
    pub fn record(&self, success: bool) -> Option<Transition> {
        self.settle_at(Instant::now(), success, None)
    }

    /// Admit a dial and return a token to settle it with.
    ///
    /// Dropping the token unsettled (e.g. the dial future was cancelled)
    /// frees the probe slot without counting a failure.
    pub fn try_admit(&self) -> Option<Admission<'_>> {
        self.admit_at(Instant::now()).map(|kind| Admission {
            breaker: self,
            kind,
            settled: false,
        })
    }

    fn admit_at(&self, now: Instant) -> Option<AdmissionKind> {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => Some(AdmissionKind::Regular),
            CircuitState::HalfOpen if inner.probe_in_flight => None,
            CircuitState::Open | CircuitState::HalfOpen => {
                let opened_at = inner.opened_at?;
                if now.saturating_duration_since(opened_at) < self.config.half_open_timeout() {
                    return None;
                }
                inner.state = CircuitState::HalfOpen;
                inner.probe_in_flight = true;
                Some(AdmissionKind::Probe)
            }
        }
    }

    fn settle_at(
        &self,
        now: Instant,
        success: bool,
        kind: Option<AdmissionKind>,
    ) -> Option<Transition> {
        let mut inner = self.lock();
        let probe = match kind {
            Some(kind) => kind == AdmissionKind::Probe,
            None => inner.state == CircuitState::HalfOpen,
        };

        match inner.state {
            CircuitState::HalfOpen if probe => {
                inner.probe_in_flight = false;
                if success {
                    inner.state = CircuitState::Closed;
                    inner.consecutive_failures = 0;
                    Some(Transition::Closed)
                } else {
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(now);
                    Some(Transition::Reopened)
                }
            }
            CircuitState::Closed if success => {
                inner.consecutive_failures = 0;
                None
            }
            CircuitState::Closed => {
                let decayed = inner.last_failure_at.is_some_and(|last| {
                    now.saturating_duration_since(last) > self.config.reset_failures_timeout()
                });
                if decayed {
                    inner.consecutive_failures = 0;
                }
                inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);
                inner.last_failure_at = Some(now);

                if inner.consecutive_failures >= self.config.open_threshold() {
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(now);
                    Some(Transition::Opened)
                } else {
                    None
                }
            }
            // Dials admitted while closed that finish after the circuit opened.
            CircuitState::Open | CircuitState::HalfOpen => None,
        }
    }

    fn abandon(&self, kind: AdmissionKind) {
        if kind != AdmissionKind::Probe {
            return;
        }
        let mut inner = self.lock();
        if inner.state == CircuitState::HalfOpen {
            inner.probe_in_flight = false;
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Permission to perform one dial, obtained from [`CircuitBreaker::try_admit`].
#[must_use = "an admission must be settled with `record`"]
#[derive(Debug)]
pub struct Admission<'a> {
    breaker: &'a CircuitBreaker,
    kind: AdmissionKind,
    settled: bool,
}

impl Admission<'_> {
    /// True for the single trial dial of a half-open breaker.
    pub fn is_probe(&self) -> bool {
        self.kind == AdmissionKind::Probe
    }

    /// Report the dial outcome.
    pub fn record(mut self, success: bool) -> Option<Transition> {
        self.settled = true;
        self.breaker.settle_at(Instant::now(), success, Some(self.kind))
    }
}

impl Drop for Admission<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.breaker.abandon(self.kind);
        }
    }
}
