//! Ledger error types.

use crate::store::StoreError;
use crate::user::UserError;
use thiserror::Error;

/// Ledger errors
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Referenced ledger record does not exist
    #[error("Ledger record not found: {0}")]
    NotFound(String),

    /// Record is already approved or rejected
    #[error("Ledger record {0} is already decided")]
    AlreadyDecided(String),

    /// Amount must be positive
    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),

    /// Every pool address is currently assigned
    #[error("No free deposit address available")]
    NoFreeAddress,

    /// Address is assigned to a pending deposit
    #[error("Address {0} is in use")]
    AddressInUse(String),

    /// Address already exists in the pool
    #[error("Address {0} already pooled")]
    DuplicateAddress(String),

    /// Withdrawal exceeds the available balance
    #[error("Insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance { available: f64, requested: f64 },

    /// Referenced user does not exist
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Unexpected user-registry error
    #[error("User error: {0}")]
    User(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl From<UserError> for LedgerError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => LedgerError::UserNotFound(id),
            UserError::InsufficientBalance {
                available,
                required,
            } => LedgerError::InsufficientBalance {
                available,
                requested: required,
            },
            UserError::Storage(e) => LedgerError::Storage(e),
            other => LedgerError::User(other.to_string()),
        }
    }
}

impl LedgerError {
    /// Get a client-safe error message
    pub fn client_message(&self) -> String {
        match self {
            LedgerError::Storage(_) | LedgerError::User(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
