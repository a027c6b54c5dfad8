//! User accounts module.
//!
//! This module implements:
//! - The persisted `User` record (balance, counters, history, pending task,
//!   per-day aggregates)
//! - `UserManager`: the in-memory registry with flat-JSON persistence and a
//!   keyed lock table giving every user single-writer discipline
//!
//! ## Concurrency
//!
//! Every read-modify-write of a user record (task generation, settlement,
//! admin balance patches, ledger approvals) must hold that user's lock from
//! [`UserManager::lock_for`]. Two concurrent "grab order" requests for the
//! same user therefore serialize instead of both observing `pending == None`.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{UserError, UserResult};
pub use manager::UserManager;
pub use models::{DailyBucket, HistoryRecord, TaskStatus, User, UserId};
