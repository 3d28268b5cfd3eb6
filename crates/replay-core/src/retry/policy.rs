use std::time::Duration;

use crate::config::RetryConfig;

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Exponential backoff policy with a cap: `min(base * 2^attempt, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (3 means at most 4 invocations).
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound on backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(4000),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        Self {
            max_retries: cfg.max_retries,
            base_delay: Duration::from_millis(cfg.base_delay_ms),
            max_delay: Duration::from_millis(cfg.max_delay_ms.max(cfg.base_delay_ms)),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retrying after failed attempt `attempt` (0-based).
    /// Negative attempts behave as 0.
    pub fn delay_for_attempt(&self, attempt: i64) -> Duration {
        let attempt = u32::try_from(attempt.max(0)).unwrap_or(u32::MAX);
        let multiplier = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(multiplier)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Like `delay_for_attempt` for untrusted numeric input: the attempt is
    /// floored, and NaN or negative values clamp to 0.
    pub fn delay_for_attempt_f64(&self, attempt: f64) -> Duration {
        // `as` saturates and maps NaN to 0.
        self.delay_for_attempt(attempt.floor() as i64)
    }

    /// `attempt` is 0-based (0 = the initial call just failed).
    pub fn decide(&self, attempt: u32, retryable: bool) -> RetryDecision {
        if attempt >= self.max_retries || !retryable {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.delay_for_attempt(i64::from(attempt)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn default_schedule_is_1_2_4_4() {
        let p = RetryPolicy::default();
        assert_eq!(p.delay_for_attempt(0), ms(1000));
        assert_eq!(p.delay_for_attempt(1), ms(2000));
        assert_eq!(p.delay_for_attempt(2), ms(4000));
        assert_eq!(p.delay_for_attempt(3), ms(4000));
        assert_eq!(p.delay_for_attempt(1000), ms(4000));
    }

    #[test]
    fn delay_is_monotonic_and_bounded() {
        let p = RetryPolicy::default();
        let mut prev = Duration::ZERO;
        for n in 0..64 {
            let d = p.delay_for_attempt(n);
            assert_eq!(d, ms((1000u64 << n.min(20)).min(4000)));
            assert!(d >= prev);
            assert!(d >= ms(1000));
            prev = d;
        }
    }

    #[test]
    fn negative_and_fractional_attempts() {
        let p = RetryPolicy::default();
        assert_eq!(p.delay_for_attempt(-5), p.delay_for_attempt(0));
        assert_eq!(p.delay_for_attempt_f64(-0.5), ms(1000));
        assert_eq!(p.delay_for_attempt_f64(1.9), ms(2000));
        assert_eq!(p.delay_for_attempt_f64(f64::NAN), ms(1000));
        assert_eq!(p.delay_for_attempt_f64(f64::INFINITY), ms(4000));
    }

    #[test]
    fn respects_max_retries() {
        let p = RetryPolicy::default();
        assert_eq!(p.decide(0, true), RetryDecision::RetryAfter(ms(1000)));
        assert_eq!(p.decide(2, true), RetryDecision::RetryAfter(ms(4000)));
        assert_eq!(p.decide(3, true), RetryDecision::NoRetry);
    }

    #[test]
    fn no_retry_when_not_retryable() {
        let p = RetryPolicy::default();
        assert_eq!(p.decide(0, false), RetryDecision::NoRetry);
    }

    #[test]
    fn from_config() {
        let cfg = RetryConfig {
            max_retries: 5,
            base_delay_ms: 250,
            max_delay_ms: 100,
        };
        let p = RetryPolicy::from(&cfg);
        assert_eq!(p.max_retries, 5);
        // max never below base
        assert_eq!(p.max_delay, ms(250));
    }
}
