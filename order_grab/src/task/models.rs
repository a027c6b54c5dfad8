//! Task data models and engine outcome types.

use super::constants::{
    ALIBABA_COMMISSION_RATE, ALIBABA_MIN_BALANCE, ALIEXPRESS_COMMISSION_RATE,
    ALIEXPRESS_MIN_BALANCE, AMAZON_COMMISSION_RATE,
};
use crate::money::round3;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Store tier, gating task eligibility by balance bracket and setting the
/// commission rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreTier {
    Amazon,
    Alibaba,
    Aliexpress,
}

impl StoreTier {
    /// Commission rate advertised for this tier
    pub fn commission_rate(self) -> f64 {
        match self {
            StoreTier::Amazon => AMAZON_COMMISSION_RATE,
            StoreTier::Alibaba => ALIBABA_COMMISSION_RATE,
            StoreTier::Aliexpress => ALIEXPRESS_COMMISSION_RATE,
        }
    }

    /// Whether a balance falls inside this tier's bracket
    ///
    /// Brackets are contiguous, so `for_balance(b).allows(b)` holds for every
    /// non-negative balance, fractional values included.
    pub fn allows(self, balance: f64) -> bool {
        match self {
            StoreTier::Amazon => balance < ALIBABA_MIN_BALANCE,
            StoreTier::Alibaba => (ALIBABA_MIN_BALANCE..ALIEXPRESS_MIN_BALANCE).contains(&balance),
            StoreTier::Aliexpress => balance >= ALIEXPRESS_MIN_BALANCE,
        }
    }

    /// The tier a balance qualifies for
    pub fn for_balance(balance: f64) -> StoreTier {
        if balance >= ALIEXPRESS_MIN_BALANCE {
            StoreTier::Aliexpress
        } else if balance >= ALIBABA_MIN_BALANCE {
            StoreTier::Alibaba
        } else {
            StoreTier::Amazon
        }
    }
}

impl std::fmt::Display for StoreTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreTier::Amazon => write!(f, "amazon"),
            StoreTier::Alibaba => write!(f, "alibaba"),
            StoreTier::Aliexpress => write!(f, "aliexpress"),
        }
    }
}

impl std::str::FromStr for StoreTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "amazon" => Ok(StoreTier::Amazon),
            "alibaba" => Ok(StoreTier::Alibaba),
            "aliexpress" => Ok(StoreTier::Aliexpress),
            other => Err(format!("unknown store tier: {other}")),
        }
    }
}

/// Task kind discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// One product line
    Single,
    /// Multiple product lines, usually materialized from an inject rule
    Combine,
}

/// A product line within a task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskItem {
    pub title: String,
    pub image: String,
    pub unit_price: f64,
    pub quantity: u32,
}

/// A simulated e-commerce order
///
/// Ephemeral: generated on demand, held as `User::pending` until settled
/// (moved into history) or cleared by an admin/reset action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub kind: TaskKind,
    pub store: StoreTier,
    pub items: Vec<TaskItem>,
    pub order_amount: f64,
    pub commission: f64,
    pub commission_rate: f64,
    /// Shortfall versus the balance at generation time; only set on
    /// rule-materialized combine orders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deficit: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Build a single-line task; commission is derived from the rate
    pub fn single(store: StoreTier, title: &str, order_amount: f64, rate: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: TaskKind::Single,
            store,
            items: vec![TaskItem {
                title: title.to_string(),
                image: super::catalog::image_url(title),
                unit_price: order_amount,
                quantity: 1,
            }],
            order_amount,
            commission: round3(order_amount * rate),
            commission_rate: rate,
            deficit: None,
            created_at: Utc::now(),
        }
    }

    /// Build a combine task from prepared product lines
    pub fn combine(
        store: StoreTier,
        items: Vec<TaskItem>,
        order_amount: f64,
        rate: f64,
        deficit: Option<f64>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: TaskKind::Combine,
            store,
            items,
            order_amount,
            commission: round3(order_amount * rate),
            commission_rate: rate,
            deficit,
            created_at: Utc::now(),
        }
    }
}

/// Outcome of a next-task request
///
/// All variants except `Task` are soft business states that serialize as
/// successful responses with a discriminating field.
#[derive(Debug, Clone)]
pub enum NextTaskOutcome {
    /// A freshly generated task, now held as the user's pending task
    Task(Task),
    /// An earlier task is still pending; no new task was generated
    Unpaid { task: Task, deficit: f64 },
    /// The daily ceiling was reached; terminal for the day
    NoMore { message: String },
    /// The requested tier does not match the balance bracket
    NotEligible {
        message: String,
        suggested: StoreTier,
    },
}

/// Outcome of a settlement attempt
#[derive(Debug, Clone)]
pub enum SettleOutcome {
    /// Task settled; commission credited, counters advanced
    Settled {
        user: crate::user::User,
        summary: SettlementSummary,
    },
    /// Balance does not cover the pending order; pending unchanged
    NeedRecharge { deficit: f64 },
}

/// What a successful settlement changed
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementSummary {
    pub task: Task,
    pub commission: f64,
    pub balance: f64,
    pub completed_today: u32,
    pub total_completed: u64,
}

/// A recorded (or re-observed) unpaid pending task
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingStatus {
    pub task: Task,
    pub deficit: f64,
}

/// Snapshot returned by the progress endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub balance: f64,
    pub completed_today: u32,
    pub total_completed: u64,
    pub unpaid_task: Option<Task>,
    pub last_task_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_brackets() {
        assert!(StoreTier::Amazon.allows(0.0));
        assert!(StoreTier::Amazon.allows(498.0));
        assert!(StoreTier::Amazon.allows(498.5));
        assert!(!StoreTier::Amazon.allows(499.0));

        assert!(!StoreTier::Alibaba.allows(498.5));
        assert!(StoreTier::Alibaba.allows(499.0));
        assert!(StoreTier::Alibaba.allows(900.5));
        assert!(!StoreTier::Alibaba.allows(901.0));

        assert!(!StoreTier::Aliexpress.allows(900.5));
        assert!(StoreTier::Aliexpress.allows(901.0));
    }

    #[test]
    fn test_tier_for_balance() {
        assert_eq!(StoreTier::for_balance(50.0), StoreTier::Amazon);
        assert_eq!(StoreTier::for_balance(600.0), StoreTier::Alibaba);
        assert_eq!(StoreTier::for_balance(2000.0), StoreTier::Aliexpress);
    }

    #[test]
    fn test_fractional_boundary_balances_stay_eligible() {
        // Commission credits land at 3 decimal places, so balances like
        // 498.5 occur in practice; the suggested tier must accept them.
        for balance in [498.5, 498.999, 900.5, 900.999] {
            let tier = StoreTier::for_balance(balance);
            assert!(tier.allows(balance), "{tier} rejects {balance}");
        }
    }

    #[test]
    fn test_tier_rates() {
        assert_eq!(StoreTier::Amazon.commission_rate(), 0.04);
        assert_eq!(StoreTier::Alibaba.commission_rate(), 0.08);
        assert_eq!(StoreTier::Aliexpress.commission_rate(), 0.12);
    }

    #[test]
    fn test_tier_parse_roundtrip() {
        for tier in [StoreTier::Amazon, StoreTier::Alibaba, StoreTier::Aliexpress] {
            let parsed: StoreTier = tier.to_string().parse().unwrap();
            assert_eq!(parsed, tier);
        }
        assert!("ebay".parse::<StoreTier>().is_err());
    }

    #[test]
    fn test_single_task_commission_derived() {
        let task = Task::single(StoreTier::Amazon, "widget", 100.0, 0.04);
        assert_eq!(task.commission, 4.0);
        assert_eq!(task.items.len(), 1);
        assert_eq!(task.items[0].quantity, 1);
        assert!(matches!(task.kind, TaskKind::Single));
    }
}
