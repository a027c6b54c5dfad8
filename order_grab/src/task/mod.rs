//! Task assignment and settlement engine.
//!
//! This module implements the platform's only real state machine:
//!
//! - **Daily counter tracking**: per-user per-day completed/commission
//!   buckets, resynchronized at day rollover ([`ensure_daily`])
//! - **Task generation**: store tier gating by balance, inject-rule
//!   precedence, random single-order synthesis, the 25/day ceiling
//! - **Unpaid/pending gate**: at most one outstanding task per user, with a
//!   balance deficit exposed for the "recharge to submit" prompt
//! - **Settlement**: balance-guarded commission credit and history recording
//!
//! All business-rule outcomes (`no more tasks`, `unpaid`, `not eligible`,
//! `need recharge`) are modeled as values, not errors; see
//! [`NextTaskOutcome`] and [`SettleOutcome`].

pub mod catalog;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod models;

pub use constants::MAX_TASKS_PER_DAY;
pub use engine::{TaskEngine, ensure_daily, ensure_daily_for, today_key};
pub use errors::{TaskError, TaskResult};
pub use models::{
    NextTaskOutcome, PendingStatus, ProgressSummary, SettleOutcome, SettlementSummary, StoreTier,
    Task, TaskItem, TaskKind,
};
