//! Time limits for persistence calls.

use marginalia_core::{MarginaliaError, Result};
use std::future::Future;
use std::time::Duration;

/// Runs `call`, turning an elapsed `timeout` into a transient persistence error.
pub(crate) async fn bounded<T, F>(timeout: Duration, operation: &str, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(MarginaliaError::persistence(format!(
            "{operation} timed out after {}ms",
            timeout.as_millis()
        ))),
    }
}
