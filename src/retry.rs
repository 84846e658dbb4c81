use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// RetryPolicy
///
/// Bounded retry with exponential backoff. Every attempt is individually bounded by
/// `attempt_timeout`, so the worst case is `(max_retries + 1) * attempt_timeout` plus backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
            attempt_timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    #[error("timed out after {attempts} attempt(s)")]
    TimedOut { attempts: u32 },
    #[error("failed after {attempts} attempt(s): {last_error}")]
    Failed { attempts: u32, last_error: E },
}

/// with_retry
///
/// Runs `op` until it succeeds or the policy is exhausted. The error of the last
/// attempt is returned.
pub async fn with_retry<F, Fut, T, E>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;
    let mut backoff = policy.initial_backoff;

    loop {
        attempt += 1;

        let error = match tokio::time::timeout(policy.attempt_timeout, op()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => {
                warn!("{} attempt {} failed: {}", label, attempt, e);
                RetryError::Failed {
                    attempts: attempt,
                    last_error: e,
                }
            }
            Err(_) => {
                warn!(
                    "{} attempt {} timed out after {:?}",
                    label, attempt, policy.attempt_timeout
                );
                RetryError::TimedOut { attempts: attempt }
            }
        };

        if attempt > policy.max_retries {
            return Err(error);
        }

        tokio::time::sleep(backoff).await;
        backoff = (backoff * 2).min(policy.max_backoff);
    }
}
