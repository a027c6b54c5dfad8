//! Task engine error types.

use crate::rules::RuleError;
use crate::store::StoreError;
use crate::user::UserError;
use thiserror::Error;

/// Task engine errors
///
/// These are the truly unexpected conditions. Expected business states
/// (daily ceiling, pending conflict, insufficient balance, tier mismatch)
/// are values on the outcome enums, never errors.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Referenced user does not exist
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Frozen accounts are blocked from all task actions
    #[error("Account is frozen")]
    AccountFrozen,

    /// Submitted task id does not match the user's pending task
    #[error("No pending task matches id {0}")]
    UnknownTask(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// Inject rule error
    #[error("Inject rule error: {0}")]
    Rule(#[from] RuleError),

    /// Unexpected user-registry error
    #[error("User error: {0}")]
    User(String),
}

impl From<UserError> for TaskError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => TaskError::UserNotFound(id),
            UserError::Storage(e) => TaskError::Storage(e),
            other => TaskError::User(other.to_string()),
        }
    }
}

impl TaskError {
    /// Get a client-safe error message
    pub fn client_message(&self) -> String {
        match self {
            TaskError::Storage(_) | TaskError::Rule(_) | TaskError::User(_) => {
                "Internal server error".to_string()
            }
            TaskError::UserNotFound(_) => "user_not_found".to_string(),
            TaskError::AccountFrozen => "account_frozen".to_string(),
            TaskError::UnknownTask(_) => "unknown_task".to_string(),
        }
    }
}

/// Result type for task operations
pub type TaskResult<T> = Result<T, TaskError>;
