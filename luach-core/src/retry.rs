//! Retryable execution of external service calls.
//!
//! Every remote call the engine makes goes through [`execute`], which
//! classifies failures by HTTP status and retries only the transient ones
//! with exponential backoff. Sequential calls plus this backoff are the
//! whole throttling story; there is no extra admission control.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{LuachError, LuachResult};
use crate::service::ServiceError;

/// Retry/backoff parameters. Plain data so tests can run with zero delay.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 4,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Same attempt budget, no waiting. For tests.
    pub fn no_backoff() -> Self {
        RetryPolicy {
            max_attempts: 4,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }
}

/// How a failed call is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Rate limit, server error or transport failure: worth retrying.
    Transient,
    /// Credential rejected. Never retried.
    Auth,
    /// The addressed remote entity is gone. Never retried here; callers use
    /// this as the signal to re-resolve the calendar binding.
    NotFound,
    /// The service rejected the payload.
    Validation,
    /// State precondition violated on the remote side.
    Conflict,
    /// Anything else.
    Internal,
}

/// Classify a service failure by its reported status.
pub fn classify(err: &ServiceError) -> FailureClass {
    match err.status {
        None => FailureClass::Transient,
        Some(429) => FailureClass::Transient,
        Some(status) if status >= 500 => FailureClass::Transient,
        Some(401) | Some(403) => FailureClass::Auth,
        Some(404) | Some(410) => FailureClass::NotFound,
        Some(400) => FailureClass::Validation,
        Some(409) => FailureClass::Conflict,
        Some(_) => FailureClass::Internal,
    }
}

/// Run `op`, retrying transient failures with exponential backoff, and wrap
/// the terminal failure into a typed error carrying `label` for context.
pub async fn execute<T, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> LuachResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ServiceError>>,
{
    let mut delay = policy.base_delay;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let class = classify(&err);
        if class == FailureClass::Transient && attempt < policy.max_attempts {
            warn!(
                label,
                attempt,
                backoff_ms = delay.as_millis() as u64,
                error = %err,
                "transient failure, backing off"
            );
            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(policy.max_delay);
            continue;
        }

        return Err(wrap(class, label, attempt, &err));
    }
}

fn wrap(class: FailureClass, label: &str, attempts: u32, err: &ServiceError) -> LuachError {
    match class {
        FailureClass::Auth => LuachError::Auth(format!("{}: {}", label, err)),
        FailureClass::NotFound => LuachError::NotFound(format!("{}: {}", label, err)),
        FailureClass::Validation => LuachError::Validation(format!("{}: {}", label, err)),
        FailureClass::Conflict => LuachError::Conflict(format!("{}: {}", label, err)),
        FailureClass::Transient => LuachError::Sync(format!(
            "{}: gave up after {} attempts: {}",
            label, attempts, err
        )),
        FailureClass::Internal => LuachError::Internal(format!("{}: {}", label, err)),
    }
}
