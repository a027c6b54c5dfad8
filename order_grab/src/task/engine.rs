//! Task engine: daily counters, generation, pending gate, settlement.

use super::{
    catalog,
    constants::{
        DRAW_HIGH_FRACTION, DRAW_LOW_FRACTION, MAX_TASKS_PER_DAY, MIN_ORDER_AMOUNT,
        ORDER_AMOUNT_CAP,
    },
    errors::{TaskError, TaskResult},
    models::{
        NextTaskOutcome, PendingStatus, ProgressSummary, SettleOutcome, SettlementSummary,
        StoreTier, Task,
    },
};
use crate::money::{round2, round3};
use crate::rules::{InjectRule, RuleManager};
use crate::user::{DailyBucket, HistoryRecord, TaskStatus, User, UserManager};
use chrono::{Local, Utc};
use log::{debug, info};
use rand::Rng;
use std::sync::Arc;

/// Today's calendar-day key (`YYYY-MM-DD`, local time)
pub fn today_key() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Ensure today's daily bucket exists and the cached counters agree with it
///
/// Mutates the user in place; the caller is responsible for persisting.
/// Returns the day key the user is now tracking.
pub fn ensure_daily(user: &mut User) -> String {
    ensure_daily_for(user, today_key())
}

/// [`ensure_daily`] against an explicit day key, so tests can drive rollover
pub fn ensure_daily_for(user: &mut User, day_key: String) -> String {
    if !user.daily.contains_key(&day_key) {
        user.daily.insert(day_key.clone(), DailyBucket::default());
        user.completed_today = 0;
        user.last_task_date = Some(day_key.clone());
    } else if user.last_task_date.as_deref() != Some(day_key.as_str()) {
        // Bucket survived from an earlier run but the cached field drifted;
        // resync from the bucket rather than blindly zeroing.
        user.completed_today = user.daily[&day_key].completed;
        user.last_task_date = Some(day_key.clone());
    }
    day_key
}

/// Task assignment and settlement engine
///
/// Serializes all per-user mutation behind [`UserManager::lock_for`], so the
/// pending-exclusivity and daily-ceiling invariants hold under concurrent
/// requests.
#[derive(Clone)]
pub struct TaskEngine {
    users: Arc<UserManager>,
    rules: Arc<RuleManager>,
}

impl TaskEngine {
    /// Create a new engine over the user registry and rule overlay
    pub fn new(users: Arc<UserManager>, rules: Arc<RuleManager>) -> Self {
        Self { users, rules }
    }

    /// Produce the next task for a user, or the blocking business state
    ///
    /// Order of checks: frozen account, pending gate, daily ceiling, tier
    /// eligibility, inject-rule overlay, random synthesis.
    ///
    /// # Errors
    ///
    /// * `TaskError::UserNotFound` - No such user
    /// * `TaskError::AccountFrozen` - Account blocked from task actions
    pub async fn next_task(&self, user_id: &str, store: StoreTier) -> TaskResult<NextTaskOutcome> {
        let lock = self.users.lock_for(user_id).await;
        let _guard = lock.lock().await;

        let mut user = self.users.get(user_id).await?;
        if user.is_frozen {
            return Err(TaskError::AccountFrozen);
        }
        let day = ensure_daily(&mut user);

        // Pending gate: never generate while a task is outstanding
        if let Some(pending) = user.pending.clone() {
            let deficit = user.pending_deficit();
            self.users.replace(user).await?;
            debug!("user {user_id} still holds pending task, deficit {deficit}");
            return Ok(NextTaskOutcome::Unpaid {
                task: pending,
                deficit,
            });
        }

        if user.completed_today >= MAX_TASKS_PER_DAY {
            self.users.replace(user).await?;
            return Ok(NextTaskOutcome::NoMore {
                message: "No more tasks today".to_string(),
            });
        }

        if !store.allows(user.balance) {
            let suggested = StoreTier::for_balance(user.balance);
            self.users.replace(user).await?;
            return Ok(NextTaskOutcome::NotEligible {
                message: format!("Your balance does not qualify for {store}; try {suggested}"),
                suggested,
            });
        }

        // Inject rules take precedence over random generation and are
        // consumed exactly once.
        let task_no = user.completed_today + 1;
        let task = match self.rules.consume(&user.id, task_no).await? {
            Some(rule) => {
                info!(
                    "materializing inject rule {} for user {user_id} at task #{task_no}",
                    rule.id
                );
                materialize_rule_task(&user, store, &rule)
            }
            None => synthesize_task(&user, store),
        };

        user.pending = Some(task.clone());
        user.last_task_date = Some(day);
        self.users.replace(user).await?;
        Ok(NextTaskOutcome::Task(task))
    }

    /// Settle the user's pending task
    ///
    /// Fails closed for any `task_id` that does not match the pending task;
    /// the reference system's silent zero-value completion path is a bug.
    ///
    /// # Errors
    ///
    /// * `TaskError::UnknownTask` - `task_id` does not match `pending`
    pub async fn complete_task(
        &self,
        user_id: &str,
        task_id: &str,
        note: Option<String>,
    ) -> TaskResult<SettleOutcome> {
        let lock = self.users.lock_for(user_id).await;
        let _guard = lock.lock().await;

        let mut user = self.users.get(user_id).await?;
        if user.is_frozen {
            return Err(TaskError::AccountFrozen);
        }
        let day = ensure_daily(&mut user);

        let pending = match &user.pending {
            Some(task) if task.id == task_id => task.clone(),
            _ => return Err(TaskError::UnknownTask(task_id.to_string())),
        };

        let need = round3((pending.order_amount - user.balance).max(0.0));
        if need > 0.0 {
            self.users.replace(user).await?;
            return Ok(SettleOutcome::NeedRecharge { deficit: need });
        }

        user.balance = round3(user.balance + pending.commission);
        let bucket = user.daily.entry(day).or_default();
        bucket.completed += 1;
        bucket.commission = round3(bucket.commission + pending.commission);
        user.completed_today = bucket.completed;
        user.total_completed += 1;
        user.history.insert(
            0,
            HistoryRecord {
                task: pending.clone(),
                status: TaskStatus::Completed,
                note,
                settled_at: Utc::now(),
            },
        );
        user.pending = None;

        let summary = SettlementSummary {
            task: pending,
            commission: user.history[0].task.commission,
            balance: user.balance,
            completed_today: user.completed_today,
            total_completed: user.total_completed,
        };
        info!(
            "user {user_id} settled task {} (+{} USDT, {} today)",
            summary.task.id, summary.commission, summary.completed_today
        );
        self.users.replace(user.clone()).await?;
        Ok(SettleOutcome::Settled { user, summary })
    }

    /// Explicitly record an unpaid pending task
    ///
    /// If a task is already pending it wins; the supplied task is ignored.
    /// Either way the pending task persists until settled or reset.
    pub async fn record_incomplete(&self, user_id: &str, task: Task) -> TaskResult<PendingStatus> {
        let lock = self.users.lock_for(user_id).await;
        let _guard = lock.lock().await;

        let mut user = self.users.get(user_id).await?;
        if user.is_frozen {
            return Err(TaskError::AccountFrozen);
        }
        ensure_daily(&mut user);

        if user.pending.is_none() {
            user.pending = Some(task);
        }
        let pending = user
            .pending
            .clone()
            .expect("pending was just populated if absent");
        let deficit = user.pending_deficit();
        self.users.replace(user).await?;
        Ok(PendingStatus {
            task: pending,
            deficit,
        })
    }

    /// Snapshot the user's task progress
    pub async fn progress(&self, user_id: &str) -> TaskResult<ProgressSummary> {
        let lock = self.users.lock_for(user_id).await;
        let _guard = lock.lock().await;

        let mut user = self.users.get(user_id).await?;
        ensure_daily(&mut user);
        let summary = ProgressSummary {
            balance: user.balance,
            completed_today: user.completed_today,
            total_completed: user.total_completed,
            unpaid_task: user.pending.clone(),
            last_task_date: user.last_task_date.clone(),
        };
        self.users.replace(user).await?;
        Ok(summary)
    }

    /// Reset today's counters and clear any pending task (admin/ops)
    pub async fn reset_daily(&self, user_id: &str) -> TaskResult<User> {
        let lock = self.users.lock_for(user_id).await;
        let _guard = lock.lock().await;

        let mut user = self.users.get(user_id).await?;
        let day = today_key();
        user.daily.insert(day.clone(), DailyBucket::default());
        user.completed_today = 0;
        user.last_task_date = Some(day);
        user.pending = None;
        self.users.replace(user.clone()).await?;
        Ok(user)
    }

    /// Reset all counters, history and pending state (admin/ops)
    ///
    /// The balance is deliberately untouched.
    pub async fn full_reset(&self, user_id: &str) -> TaskResult<User> {
        let lock = self.users.lock_for(user_id).await;
        let _guard = lock.lock().await;

        let mut user = self.users.get(user_id).await?;
        user.daily.clear();
        user.history.clear();
        user.pending = None;
        user.completed_today = 0;
        user.total_completed = 0;
        user.last_task_date = None;
        self.users.replace(user.clone()).await?;
        Ok(user)
    }
}

/// Draw a random order amount from the balance-scaled window
///
/// `[max(10, balance*0.25), min(balance*0.75, 120)]`, degenerate windows
/// collapse to the upper bound.
fn draw_amount<R: Rng + ?Sized>(balance: f64, rng: &mut R) -> f64 {
    let hi = (balance * DRAW_HIGH_FRACTION).min(ORDER_AMOUNT_CAP);
    let lo = (balance * DRAW_LOW_FRACTION).max(MIN_ORDER_AMOUNT).min(hi);
    if hi <= lo {
        return round2(hi.max(0.0));
    }
    round2(rng.random_range(lo..=hi))
}

/// Synthesize a random single-line task for the tier
fn synthesize_task(user: &User, store: StoreTier) -> Task {
    let mut rng = rand::rng();
    let amount = draw_amount(user.balance, &mut rng);
    let title = catalog::sample_title(store, &mut rng);
    Task::single(store, title, amount, store.commission_rate())
}

/// Materialize a combine task from a confirmed inject rule
fn materialize_rule_task(user: &User, store: StoreTier, rule: &InjectRule) -> Task {
    let mut rng = rand::rng();
    let amount = rule.amount_spec.pick(&mut rng);
    let rate = rule
        .percent
        .map(|p| p / 100.0)
        .unwrap_or_else(|| store.commission_rate());
    let line_count = rng.random_range(2..=3);
    let items = catalog::split_items(store, amount, line_count, &mut rng);
    let deficit = round3((amount - user.balance).max(0.0));
    let deficit = (deficit > 0.0).then_some(deficit);
    Task::combine(store, items, amount, rate, deficit)
}
