//! # Order Grab
//!
//! Core engine for a task/order-grabbing investment platform: users hold a
//! USDT balance, get assigned simulated e-commerce orders, earn commission on
//! settlement, and deposit/withdraw through an admin-moderated ledger.
//!
//! ## Core Modules
//!
//! - [`task`]: Task assignment and settlement engine (daily counters, store
//!   tier gating, pending gate, settlement)
//! - [`rules`]: Admin-authored inject rules that script specific task outcomes
//! - [`user`]: User accounts with per-user single-writer discipline
//! - [`ledger`]: Deposit/withdrawal records and the TRC-20 address pool
//! - [`auth`]: Admin credential storage and JWT access tokens
//! - [`store`]: Flat-JSON persistence with bounded I/O timeouts
//!
//! ## Example
//!
//! ```no_run
//! use order_grab::store::{JsonStore, StoreConfig};
//! use order_grab::task::TaskEngine;
//! use order_grab::rules::RuleManager;
//! use order_grab::user::UserManager;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(JsonStore::new(StoreConfig::from_env()));
//!     store.init().await?;
//!     let users = Arc::new(UserManager::load(store.clone()).await?);
//!     let rules = Arc::new(RuleManager::load(store.clone()).await?);
//!     let engine = TaskEngine::new(users, rules);
//!     let _ = engine;
//!     Ok(())
//! }
//! ```

/// Admin credential storage and JWT access tokens.
pub mod auth;

/// Deposit/withdrawal ledger and TRC-20 address pool.
pub mod ledger;

/// USDT amount rounding helpers.
pub mod money;

/// Admin-authored inject rules.
pub mod rules;

/// Flat-JSON persistence layer.
pub mod store;

/// Task assignment and settlement engine.
pub mod task;

/// User accounts and per-user exclusivity.
pub mod user;

pub use auth::AuthManager;
pub use ledger::LedgerManager;
pub use rules::RuleManager;
pub use task::{
    MAX_TASKS_PER_DAY, NextTaskOutcome, SettleOutcome, StoreTier, Task, TaskEngine, TaskError,
};
pub use user::{User, UserManager};
