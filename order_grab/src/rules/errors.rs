//! Inject rule error types.

use crate::store::StoreError;
use thiserror::Error;

/// Inject rule errors
#[derive(Debug, Error)]
pub enum RuleError {
    /// Referenced rule does not exist
    #[error("Inject rule not found: {0}")]
    NotFound(String),

    /// Commission percent outside (0, 100]
    #[error("Invalid commission percent: {0}")]
    InvalidPercent(f64),

    /// Task number outside the daily range
    #[error("Invalid task number: {0}")]
    InvalidTaskNo(u32),

    /// A rule already targets this user and task number
    #[error("A rule already exists for user {user_id} at task #{task_no}")]
    Duplicate { user_id: String, task_no: u32 },

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl RuleError {
    /// Get a client-safe error message
    pub fn client_message(&self) -> String {
        match self {
            RuleError::Storage(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type for inject rule operations
pub type RuleResult<T> = Result<T, RuleError>;
