//! Retry policy with exponential backoff and jitter

use std::time::Duration;

use rand::Rng;

/// How transient API failures are retried
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound for any single delay, including `Retry-After`
    pub max_delay: Duration,
    /// Extra random delay as a fraction of the computed delay (0.0 - 1.0)
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            jitter_factor: 0.2,
        }
    }
}

impl RetryPolicy {
    /// Policy with the given attempt budget and no waiting, for tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter_factor: 0.0,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Backoff before retry number `retry` (1-based), without jitter.
    ///
    /// A server-provided `Retry-After` replaces the backoff when longer.
    pub fn backoff(&self, retry: u32, retry_after: Option<Duration>) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        let backoff = self.base_delay.saturating_mul(1 << exponent);
        let delay = match retry_after {
            Some(after) if after > backoff => after,
            _ => backoff,
        };
        delay.min(self.max_delay)
    }

    /// Backoff plus random jitter, still capped at `max_delay`.
    pub fn delay(&self, retry: u32, retry_after: Option<Duration>) -> Duration {
        let delay = self.backoff(retry, retry_after);
        if self.jitter_factor <= 0.0 || delay.is_zero() {
            return delay;
        }
        let jitter = rand::rng().random_range(0.0..=self.jitter_factor);
        delay.mul_f64(1.0 + jitter).min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1, None), Duration::from_millis(500));
        assert_eq!(policy.backoff(2, None), Duration::from_secs(1));
        assert_eq!(policy.backoff(3, None), Duration::from_secs(2));
        assert_eq!(policy.backoff(5, None), Duration::from_secs(8));
        assert_eq!(policy.backoff(30, None), Duration::from_secs(8));
    }

    #[test]
    fn test_retry_after_is_honoured_up_to_cap() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.backoff(1, Some(Duration::from_secs(3))),
            Duration::from_secs(3)
        );
        assert_eq!(
            policy.backoff(1, Some(Duration::from_secs(60))),
            Duration::from_secs(8)
        );
        assert_eq!(
            policy.backoff(3, Some(Duration::from_millis(100))),
            Duration::from_secs(2)
        );
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let policy = RetryPolicy::default();
        for _ in 0..50 {
            let delay = policy.delay(1, None);
            assert!(delay >= Duration::from_millis(500));
            assert!(delay <= Duration::from_millis(600));
        }
        assert_eq!(policy.delay(10, None), Duration::from_secs(8));
    }

    #[test]
    fn test_immediate_policy_never_waits() {
        let policy = RetryPolicy::immediate(3);
        assert_eq!(policy.delay(1, Some(Duration::from_secs(5))), Duration::ZERO);
    }

    #[test]
    fn test_max_attempts_is_at_least_one() {
        assert_eq!(RetryPolicy::default().with_max_attempts(0).max_attempts, 1);
    }
}
