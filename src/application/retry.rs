//! Bounded retry with timeout for external capability calls.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, timeout};
use tracing::warn;

use crate::config::GenerationConfig;
use crate::domain::cost::Capability;
use crate::ports::GenerationError;

/// Retry policy for transient capability failures.
///
/// Every attempt runs under the configured deadline; retryable failures
/// back off exponentially from the base delay. Non-retryable failures and
/// exhausted budgets surface the last error.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    call_timeout: Duration,
    max_transient_retries: u32,
    backoff_base: Duration,
}

impl RetryPolicy {
    /// Builds the policy from configuration.
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            call_timeout: config.request_timeout(),
            max_transient_retries: config.max_transient_retries,
            backoff_base: config.transient_backoff_base(),
        }
    }

    /// Policy used by tests: tight timeout, no waiting between retries.
    #[cfg(test)]
    pub fn immediate(max_transient_retries: u32) -> Self {
        Self {
            call_timeout: Duration::from_secs(5),
            max_transient_retries,
            backoff_base: Duration::from_millis(0),
        }
    }

    /// Runs `attempt` until it succeeds, fails non-retryably, or the retry
    /// budget is spent. The closure is invoked once per attempt.
    pub async fn call<T, F, Fut>(
        &self,
        capability: Capability,
        mut attempt: F,
    ) -> Result<T, GenerationError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GenerationError>>,
    {
        let mut tries = 0u32;
        loop {
            let result = match timeout(self.call_timeout, attempt()).await {
                Ok(result) => result,
                Err(_) => Err(GenerationError::Timeout {
                    timeout_secs: self.call_timeout.as_secs(),
                }),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(error) if error.is_retryable() && tries < self.max_transient_retries => {
                    let delay = self.backoff_base * 2u32.saturating_pow(tries);
                    warn!(
                        capability = %capability,
                        attempt = tries + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "transient capability failure, retrying"
                    );
                    sleep(delay).await;
                    tries += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}
