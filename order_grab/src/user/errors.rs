//! User error types.

use super::models::UserId;
use crate::store::StoreError;
use thiserror::Error;

/// User errors
#[derive(Debug, Error)]
pub enum UserError {
    /// Referenced user does not exist
    #[error("User not found: {0}")]
    NotFound(UserId),

    /// Username already registered
    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    /// Username format invalid
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    /// A debit would push the balance negative
    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: f64, required: f64 },

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl UserError {
    /// Get a client-safe error message that doesn't leak internal detail
    pub fn client_message(&self) -> String {
        match self {
            UserError::Storage(_) => "Internal server error".to_string(),
            UserError::NotFound(_) => "user_not_found".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for user operations
pub type UserResult<T> = Result<T, UserError>;
