//! Error types for the StatefulCluster controller
//!
//! The decision engine itself is infallible; everything here originates in
//! the snapshot reader or the action executor and is classified for the
//! controller's retry policy.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Missing object key: {0}")]
    MissingObjectKey(&'static str),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl Error {
    /// Check if this error indicates the resource is gone.
    ///
    /// Not-found is terminal for the pass, not a failure: owned objects are
    /// garbage collected by the store, so the correct response is to stop.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::KubeError(kube::Error::Api(e)) if e.code == 404)
    }

    /// Check if this error should be retried
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::KubeError(e) => match e {
                // 4xx errors are not retryable apart from conflicts and
                // rate limiting; 5xx errors are store unavailability
                kube::Error::Api(api_err) => {
                    let code = api_err.code;
                    if (400..500).contains(&code) {
                        return code == 409 || code == 429;
                    }
                    true
                }
                // Network and other transport errors are retryable
                _ => true,
            },
            // A malformed blueprint will fail identically on replay
            Error::ValidationError(_) => false,
            Error::SerializationError(_) => false,
            Error::MissingObjectKey(_) => false,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Exponential backoff configuration for requeue-on-error
#[derive(Clone, Debug)]
pub struct BackoffConfig {
    /// Initial delay for first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for each subsequent retry
    pub multiplier: f64,
    /// Random jitter factor (0.0 to 1.0)
    pub jitter: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(300),
            multiplier: 2.0,
            jitter: 0.1,
        }
    }
}

impl BackoffConfig {
    /// Calculate the backoff delay for a given retry attempt
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_delay_secs =
            self.initial_delay.as_secs_f64() * self.multiplier.powi(attempt as i32);

        // Apply jitter so concurrent failures don't requeue in lockstep
        let jitter_range = base_delay_secs * self.jitter;
        let jitter = rand::random::<f64>() * jitter_range * 2.0 - jitter_range;
        let delay_with_jitter = (base_delay_secs + jitter).max(0.0);

        let capped_delay = delay_with_jitter.min(self.max_delay.as_secs_f64());

        Duration::from_secs_f64(capped_delay)
    }

    /// Get the delay for an error, with different handling for retryable
    /// vs non-retryable errors
    pub fn delay_for_error(&self, error: &Error, attempt: u32) -> Duration {
        if error.is_retryable() {
            self.delay_for_attempt(attempt)
        } else {
            // Non-retryable errors park at the maximum delay so an operator
            // can intervene without the loop hammering the store
            self.max_delay
        }
    }
}
