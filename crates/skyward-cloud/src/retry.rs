//! Retry policy for API calls
//!
//! Rate limits (HTTP 429), transport failures and server errors are retried
//! with exponential backoff. Anything else is handed straight back.

use crate::error::{CloudError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Retry configuration for API calls
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_attempts: u32,

    /// Initial delay between retries
    pub initial_delay: Duration,

    /// Maximum delay between retries
    pub max_delay: Duration,

    /// Backoff multiplier
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(120),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt + 1`
    ///
    /// A server-provided `Retry-After` wins over the exponential schedule,
    /// but never exceeds `max_delay`.
    pub fn delay_for(&self, attempt: u32, err: &CloudError) -> Duration {
        if let CloudError::RateLimited {
            retry_after: Some(after),
        } = err
        {
            return (*after).min(self.max_delay);
        }

        let factor = self.backoff_multiplier.powi(attempt as i32);
        Duration::try_from_secs_f64(self.initial_delay.as_secs_f64() * factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// retry budget is spent
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Err(err) if err.is_retryable() && attempt < config.max_attempts => {
                let delay = config.delay_for(attempt, &err);
                attempt += 1;
                tracing::debug!(
                    "Retrying API call in {:?} (attempt {}/{}): {}",
                    delay,
                    attempt,
                    config.max_attempts,
                    err
                );
                sleep(delay).await;
            }
            result => return result,
        }
    }
}
