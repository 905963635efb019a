//! Caller-configurable deadlines for store calls.

use std::future::Future;
use std::time::Duration;

use crate::core::error::{AppError, Result};

/// Run `operation` with a deadline; an elapsed deadline becomes a retryable [`AppError::Timeout`].
///
/// The inner future is dropped on timeout, which rolls back any open transaction it owns.
pub async fn bounded<T, F>(limit: Duration, what: &str, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("{} exceeded its {:?} deadline", what, limit);
            Err(AppError::Timeout(format!(
                "{} timed out after {} ms",
                what,
                limit.as_millis()
            )))
        }
    }
}

impl AppError {
    /// Whether a failed write may still have committed (timeouts, lost connections).
    pub fn is_indeterminate(&self) -> bool {
        matches!(self, AppError::Timeout(_) | AppError::StoreUnavailable(_))
    }
}
