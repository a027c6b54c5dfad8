//! Ledger: admin-moderated deposits, withdrawals, and the deposit address pool.
//!
//! No real chain integration. A deposit request borrows a free address from
//! the operator-managed pool and waits for approval; a withdrawal debits the
//! balance up front and refunds on rejection. All movements settle through
//! [`crate::user::UserManager::adjust_balance`].

mod errors;
mod manager;
mod models;

pub use errors::{LedgerError, LedgerResult};
pub use manager::LedgerManager;
pub use models::{LedgerKind, LedgerRecord, LedgerStatus, PoolAddress};
