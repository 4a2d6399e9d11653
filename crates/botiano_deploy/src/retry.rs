use std::time::Duration;

use tracing::{info, warn};

use crate::error::{DeployError, Result};

/// Bounded retry with a fixed delay between attempts; no backoff growth,
/// no jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// Calls `op` with the 1-based attempt number until it succeeds or the
    /// attempts run out. At least one attempt is always made.
    pub fn run<T, F>(&self, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Result<T>,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;
        loop {
            info!(attempt, attempts, "{what}");
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(err) if attempt < attempts => {
                    warn!(
                        attempt,
                        error = %err,
                        retry_in = %humantime::format_duration(self.delay),
                        "{what} failed"
                    );
                    std::thread::sleep(self.delay);
                    attempt += 1;
                }
                Err(err) => {
                    return Err(DeployError::RetryExhausted {
                        attempts,
                        last: Box::new(err),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fail(attempt: u32) -> DeployError {
        DeployError::InvalidArg(format!("attempt {attempt}"))
    }

    #[test]
    fn defaults_match_three_attempts_five_seconds() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 3);
        assert_eq!(policy.delay, Duration::from_secs(5));
    }

    #[test]
    fn succeeds_after_transient_failures() {
        let policy = RetryPolicy::new(3, Duration::ZERO);
        let mut seen = Vec::new();
        let value = policy
            .run("connect", |attempt| {
                seen.push(attempt);
                if attempt < 3 { Err(fail(attempt)) } else { Ok("up") }
            })
            .unwrap();
        assert_eq!(value, "up");
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn stops_after_the_last_attempt() {
        let policy = RetryPolicy::new(3, Duration::ZERO);
        let mut calls = 0;
        let err = policy
            .run("connect", |attempt| -> Result<()> {
                calls += 1;
                Err(fail(attempt))
            })
            .unwrap_err();

        assert_eq!(calls, 3);
        match err {
            DeployError::RetryExhausted { attempts, last } => {
                assert_eq!(attempts, 3);
                assert_eq!(last.to_string(), "Invalid argument: attempt 3");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        let mut calls = 0;
        let result = policy.run("connect", |_| {
            calls += 1;
            Ok(())
        });
        assert!(result.is_ok());
        assert_eq!(calls, 1);
    }

    #[test]
    fn waits_between_attempts() {
        let policy = RetryPolicy::new(2, Duration::from_millis(20));
        let start = std::time::Instant::now();
        let _ = policy.run("connect", |attempt| -> Result<()> { Err(fail(attempt)) });
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
