//! Resilient-call wrapper shared by every curator operation.

use std::future::Future;
use std::time::Duration;

use super::error::CuratorError;
use super::types::Task;

/// Retry strategy for curator calls.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry
    pub initial_backoff: Duration,
    /// Upper bound for a single delay
    pub max_backoff: Duration,
    /// Bound on a single attempt; expiry counts as a transient failure
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(8),
            attempt_timeout: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Policy that never waits between attempts.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            ..Default::default()
        }
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Delay before retry number `retry_index` (0-based).
    pub fn backoff_for(&self, retry_index: u32) -> Duration {
        let cap = self.max_backoff.max(self.initial_backoff);
        let factor = 1u32.checked_shl(retry_index.min(20)).unwrap_or(u32::MAX);
        self.initial_backoff.saturating_mul(factor).min(cap)
    }

    /// Total attempts this policy allows.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Run `attempt` until it succeeds, fails terminally, or retries run out.
///
/// Only [`CuratorError::is_retryable`] failures are retried. Quota and
/// credential failures return immediately.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    task: Task,
    mut attempt: F,
) -> Result<T, CuratorError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CuratorError>>,
{
    let mut retry_index = 0;

    loop {
        let outcome = match tokio::time::timeout(policy.attempt_timeout, attempt()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(CuratorError::Transient(format!(
                "timed out after {:?}",
                policy.attempt_timeout
            ))),
        };

        match outcome {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && retry_index < policy.max_retries => {
                let delay = policy.backoff_for(retry_index);
                tracing::warn!(
                    "Curator {} attempt {}/{} failed: {}; retrying in {:?}",
                    task,
                    retry_index + 1,
                    policy.max_attempts(),
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                retry_index += 1;
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::warn!(
                        "Curator {} failed after {} attempts: {}",
                        task,
                        retry_index + 1,
                        e
                    );
                }
                return Err(e);
            }
        }
    }
}
