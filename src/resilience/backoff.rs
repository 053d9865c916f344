//! Exponential backoff with jitter for callers that retry failed dials.
//!
//! The dialers never retry on their own; this is for the layer above them.

use std::time::Duration;

use rand::Rng;

/// Exponential backoff schedule capped at `max`.
#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    attempt: u32,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max: max.max(base),
            attempt: 0,
        }
    }

    /// Delay before the next retry. Grows as `base * 2^n` up to `max`,
    /// plus up to 10% jitter.
    pub fn next_delay(&mut self) -> Duration {
        let exponent = self.attempt.min(31);
        self.attempt = self.attempt.saturating_add(1);

        let delay = self.base.saturating_mul(1u32 << exponent).min(self.max);
        let jitter_range = delay.as_millis() as u64 / 10;
        let jitter = if jitter_range > 0 {
            rand::thread_rng().gen_range(0..jitter_range)
        } else {
            0
        };

        delay + Duration::from_millis(jitter)
    }

    /// Start over after a success.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_exponentially_with_bounded_jitter() {
        let mut backoff = Backoff::new(Duration::from_millis(100), Duration::from_secs(2));

        let first = backoff.next_delay();
        assert!(first >= Duration::from_millis(100) && first < Duration::from_millis(110));

        let second = backoff.next_delay();
        assert!(second >= Duration::from_millis(200) && second < Duration::from_millis(220));
    }

    #[test]
    fn caps_at_max() {
        let mut backoff = Backoff::new(Duration::from_millis(100), Duration::from_secs(1));
        for _ in 0..40 {
            let delay = backoff.next_delay();
            assert!(delay < Duration::from_millis(1_100));
        }
        assert!(backoff.next_delay() >= Duration::from_secs(1));
    }

    #[test]
    fn reset_restarts_schedule() {
        let mut backoff = Backoff::new(Duration::from_millis(50), Duration::from_secs(1));
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert!(backoff.next_delay() < Duration::from_millis(55));
    }
}
