// src/retry.rs
use std::future::Future;
use std::time::Duration;

/// Bounded-attempt exponential backoff. Delay after the n-th failure is
/// `floor * 2^(n-1)`, capped at `ceiling`: 4s, 8s, 10s, 10s, ...
///
/// No jitter and no retryable-vs-fatal classification: every error triggers a
/// retry. Callers needing fatal-error short-circuiting must wrap this.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    pub max_attempts: u32,
    pub floor: Duration,
    pub ceiling: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            floor: Duration::from_secs(4),
            ceiling: Duration::from_secs(10),
        }
    }
}

impl Backoff {
    /// Sleep duration after `failed_attempts` consecutive failures (1-based).
    pub fn delay(&self, failed_attempts: u32) -> Duration {
        let exp = failed_attempts.saturating_sub(1).min(20);
        let d = self
            .floor
            .checked_mul(1u32 << exp)
            .unwrap_or(self.ceiling);
        d.min(self.ceiling)
    }
}

/// Invoke `op` until it succeeds or `max_attempts` is exhausted, sleeping the
/// backoff delay between attempts. The final error is propagated unchanged.
pub async fn with_retry<T, E, F, Fut>(policy: Backoff, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) if attempt < policy.max_attempts => {
                let delay = policy.delay(attempt);
                tracing::warn!(
                    attempt,
                    max = policy.max_attempts,
                    delay_secs = delay.as_secs(),
                    error = %e,
                    "call failed, backing off before retry"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
