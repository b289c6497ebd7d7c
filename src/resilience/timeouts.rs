//! Timeout enforcement for upstream calls.
//!
//! Every upstream call gets a deadline. A timed-out call surfaces as
//! [`UpstreamError::Timeout`], which the gateway answers with 504.

use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;

use crate::upstream::error::{UpstreamError, UpstreamResult};

/// Run `fut` with a deadline, mapping expiry to [`UpstreamError::Timeout`].
pub async fn with_deadline<F, T>(deadline: Duration, fut: F) -> UpstreamResult<T>
where
    F: Future<Output = UpstreamResult<T>>,
{
    match timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(UpstreamError::Timeout(deadline)),
    }
}
