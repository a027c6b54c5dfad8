//! User data models.

use crate::task::Task;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// User ID type
pub type UserId = String;

/// Per-calendar-day aggregate of completed tasks and earned commission,
/// keyed by `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyBucket {
    pub completed: u32,
    pub commission: f64,
}

/// Outcome status of a historical task record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Completed,
}

/// A settled task, kept most-recent-first in `User::history`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub task: Task,
    pub status: TaskStatus,
    #[serde(default)]
    pub note: Option<String>,
    pub settled_at: DateTime<Utc>,
}

/// User account record
///
/// Invariants maintained by the task engine:
/// - `completed_today` equals `daily[today].completed` after any mutation
/// - `pending` holds at most one in-flight task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Balance in USDT
    pub balance: f64,
    #[serde(default)]
    pub is_frozen: bool,
    /// Legacy sequence pointer carried in the persisted format; never read
    #[serde(default)]
    pub cursor: u32,
    #[serde(default)]
    pub completed_today: u32,
    #[serde(default)]
    pub total_completed: u64,
    /// Calendar-day key of the last task action, or `None` for fresh users
    #[serde(default)]
    pub last_task_date: Option<String>,
    /// Past task outcomes, most-recent-first
    #[serde(default)]
    pub history: Vec<HistoryRecord>,
    /// The single outstanding unsettled task, if any
    #[serde(default)]
    pub pending: Option<Task>,
    /// Day key -> completed/commission aggregate
    #[serde(default)]
    pub daily: HashMap<String, DailyBucket>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a fresh account with zero balance and counters
    pub fn new(id: UserId, username: String) -> Self {
        Self {
            id,
            username,
            balance: 0.0,
            is_frozen: false,
            cursor: 0,
            completed_today: 0,
            total_completed: 0,
            last_task_date: None,
            history: Vec::new(),
            pending: None,
            daily: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Shortfall between the pending task's order amount and the balance,
    /// zero when there is no pending task or the balance covers it.
    pub fn pending_deficit(&self) -> f64 {
        match &self.pending {
            Some(task) => crate::money::round3((task.order_amount - self.balance).max(0.0)),
            None => 0.0,
        }
    }
}
