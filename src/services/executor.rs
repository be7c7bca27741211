use crate::config::RetryConfig;
use crate::error::UploadError;
use crate::models::{CandidateFile, UploadResponse};
use crate::services::connectivity::Connectivity;
use crate::services::store::ImageStore;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_jitter: Duration::from_millis(config.max_jitter_ms),
        }
    }

    /// `base_delay * 2^retries_used`, without jitter.
    pub fn backoff(&self, retries_used: u32) -> Duration {
        let factor = 1u32.checked_shl(retries_used.min(16)).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    pub fn delay_for(&self, retries_used: u32) -> Duration {
        let jitter_ms = self.max_jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
        };
        self.backoff(retries_used) + jitter
    }

    pub fn should_retry(&self, error: &UploadError, retries_used: u32) -> bool {
        retries_used < self.max_retries && error.is_retryable()
    }
}

#[derive(Debug)]
pub struct ExecutionSuccess {
    pub response: UploadResponse,
    pub attempts: u32,
    pub retries_used: u32,
}

#[derive(Debug)]
pub struct ExecutionFailure {
    pub error: UploadError,
    pub attempts: u32,
    /// Retry counter after the last attempt, including the starting value.
    pub retries_used: u32,
}

/// Sends one prepared batch, retrying transient failures with exponential
/// backoff. Attempts are strictly sequential.
#[derive(Clone)]
pub struct UploadExecutor {
    store: Arc<dyn ImageStore>,
    policy: RetryPolicy,
    connectivity: Connectivity,
}

impl std::fmt::Debug for UploadExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadExecutor")
            .field("policy", &self.policy)
            .field("connectivity", &self.connectivity)
            .finish_non_exhaustive()
    }
}

impl UploadExecutor {
    pub fn new(store: Arc<dyn ImageStore>, policy: RetryPolicy, connectivity: Connectivity) -> Self {
        Self {
            store,
            policy,
            connectivity,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    /// Run the batch. `retries_used` is the counter the files already carry;
    /// automatic retries continue from it and stop at the policy maximum.
    pub async fn execute(
        &self,
        files: &[CandidateFile],
        retries_used: u32,
    ) -> Result<ExecutionSuccess, ExecutionFailure> {
        let mut retries = retries_used;
        let mut attempts = 0;

        loop {
            if !self.connectivity.is_online() {
                tracing::warn!("Upload refused: no network connection");
                return Err(ExecutionFailure {
                    error: UploadError::Offline,
                    attempts,
                    retries_used: retries,
                });
            }

            attempts += 1;
            match self.store.upload(files).await {
                Ok(response) => {
                    return Ok(ExecutionSuccess {
                        response,
                        attempts,
                        retries_used: retries,
                    });
                }
                Err(error) => {
                    tracing::warn!(
                        "Upload attempt {} failed: {} (retryable: {})",
                        attempts,
                        error,
                        error.is_retryable()
                    );

                    if !self.policy.should_retry(&error, retries) {
                        return Err(ExecutionFailure {
                            error,
                            attempts,
                            retries_used: retries,
                        });
                    }

                    let delay = self.policy.delay_for(retries);
                    tracing::info!(
                        "Retrying upload in {}ms (attempt {}/{})",
                        delay.as_millis(),
                        retries + 2,
                        self.policy.max_retries + 1
                    );
                    tokio::time::sleep(delay).await;
                    retries += 1;
                }
            }
        }
    }
}
