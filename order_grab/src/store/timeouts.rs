//! Storage I/O timeout helpers
//!
//! Provides timeout wrappers for file operations to prevent indefinite hangs
//! on slow or wedged filesystems.

use std::time::Duration;
use tokio::time::timeout;

/// Default timeout for single file reads/writes (5 seconds)
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(5);

/// Error type for timeout operations
#[derive(Debug, thiserror::Error)]
pub enum TimeoutError {
    /// Operation timed out
    #[error("Storage operation timed out after {0:?}")]
    Timeout(Duration),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for timeout operations
pub type TimeoutResult<T> = Result<T, TimeoutError>;

/// Execute a file operation with timeout
///
/// # Arguments
///
/// * `duration` - Timeout duration
/// * `future` - Async operation to execute
///
/// # Returns
///
/// * `TimeoutResult<T>` - Result or timeout error
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> TimeoutResult<T>
where
    F: std::future::Future<Output = std::io::Result<T>>,
{
    match timeout(duration, future).await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(e)) => Err(TimeoutError::Io(e)),
        Err(_) => Err(TimeoutError::Timeout(duration)),
    }
}

/// Execute a file operation with the default timeout (5 seconds)
pub async fn with_default_timeout<F, T>(future: F) -> TimeoutResult<T>
where
    F: std::future::Future<Output = std::io::Result<T>>,
{
    with_timeout(DEFAULT_IO_TIMEOUT, future).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_timeout_constants() {
        assert_eq!(DEFAULT_IO_TIMEOUT.as_secs(), 5);
    }

    #[tokio::test]
    async fn test_timeout_error_display() {
        let err = TimeoutError::Timeout(Duration::from_secs(5));
        assert!(err.to_string().contains("timed out"));
        assert!(err.to_string().contains("5s"));
    }

    #[tokio::test]
    async fn test_with_timeout_passes_through_result() {
        let result = with_default_timeout(async { Ok::<_, std::io::Error>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }
}
