//! Authentication error types.

use crate::store::StoreError;
use thiserror::Error;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Bearer token missing, malformed, or expired
    #[error("Invalid or expired token")]
    InvalidToken,

    /// New password failed the strength check
    #[error("Weak password: {0}")]
    WeakPassword(String),

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// JWT error
    #[error("Token error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak internals
    pub fn client_message(&self) -> String {
        match self {
            AuthError::InvalidCredentials => "Invalid credentials".to_string(),
            AuthError::InvalidToken | AuthError::Jwt(_) => "Invalid or expired token".to_string(),
            AuthError::WeakPassword(msg) => format!("Weak password: {msg}"),
            AuthError::HashingFailed | AuthError::Storage(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
