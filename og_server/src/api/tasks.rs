//! Task engine handlers: grab, settle, incomplete, progress, resets.
//!
//! Business outcomes (`noMore`, `unpaid`, `notEligible`) come back as
//! `200 OK` with a discriminating field; a settlement blocked on balance
//! returns `400` with `needRecharge:true` so the client can prompt for a
//! recharge. Hard errors carry `{"ok": false, "error": ...}`.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use order_grab::task::{NextTaskOutcome, SettleOutcome, StoreTier, Task, TaskError};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{ApiError, AppState, error_response};
use crate::metrics;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextTaskPayload {
    pub user_id: String,
    pub store: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPayload {
    pub user_id: String,
    pub task_id: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncompletePayload {
    pub user_id: String,
    pub task: Task,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdPayload {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressQuery {
    pub user_id: String,
}

/// Map engine errors to HTTP responses
fn task_error(err: TaskError) -> ApiError {
    let status = match &err {
        TaskError::UserNotFound(_) => StatusCode::NOT_FOUND,
        TaskError::AccountFrozen => StatusCode::FORBIDDEN,
        TaskError::UnknownTask(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, err.client_message())
}

/// Grab the next task for a user.
///
/// # Request Body
///
/// ```json
/// {"userId": "...", "store": "amazon"}
/// ```
///
/// # Response
///
/// One of:
/// - `{"ok": true, "task": {...}}` - a fresh task, now pending
/// - `{"ok": true, "unpaid": true, "task": {...}, "deficit": 27.5}` - an
///   earlier task is still unsettled
/// - `{"ok": true, "noMore": true, "message": "..."}` - daily ceiling reached
/// - `{"ok": true, "notEligible": true, "message": "...", "suggested": "alibaba"}`
pub async fn next_task(
    State(state): State<AppState>,
    Json(payload): Json<NextTaskPayload>,
) -> Result<Json<Value>, ApiError> {
    let store: StoreTier = payload
        .store
        .parse()
        .map_err(|e: String| error_response(StatusCode::BAD_REQUEST, e))?;

    match state.engine.next_task(&payload.user_id, store).await {
        Ok(NextTaskOutcome::Task(task)) => {
            metrics::tasks_generated_total(&task.store.to_string());
            // Combine orders only come out of the rule overlay
            if task.kind == order_grab::task::TaskKind::Combine {
                metrics::inject_rules_fired_total();
            }
            Ok(Json(json!({ "ok": true, "task": task })))
        }
        Ok(NextTaskOutcome::Unpaid { task, deficit }) => Ok(Json(json!({
            "ok": true,
            "unpaid": true,
            "task": task,
            "deficit": deficit,
        }))),
        Ok(NextTaskOutcome::NoMore { message }) => Ok(Json(json!({
            "ok": true,
            "noMore": true,
            "message": message,
        }))),
        Ok(NextTaskOutcome::NotEligible { message, suggested }) => Ok(Json(json!({
            "ok": true,
            "notEligible": true,
            "message": message,
            "suggested": suggested,
        }))),
        Err(err) => Err(task_error(err)),
    }
}

/// Settle the user's pending task.
///
/// # Response
///
/// On success the full user record plus a settlement summary:
/// ```json
/// {"ok": true, "user": {...}, "summary": {"commission": 1.5, "balance": 41.5, ...}}
/// ```
///
/// When the balance does not cover the order, `400` with:
/// ```json
/// {"ok": false, "needRecharge": true, "deficit": 27.5}
/// ```
pub async fn submit_task(
    State(state): State<AppState>,
    Json(payload): Json<SubmitPayload>,
) -> Result<Json<Value>, ApiError> {
    match state
        .engine
        .complete_task(&payload.user_id, &payload.task_id, payload.note)
        .await
    {
        Ok(SettleOutcome::Settled { user, summary }) => {
            metrics::tasks_settled_total(summary.commission);
            Ok(Json(json!({
                "ok": true,
                "user": user,
                "summary": summary,
            })))
        }
        Ok(SettleOutcome::NeedRecharge { deficit }) => {
            metrics::recharge_prompts_total();
            Err((
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "ok": false,
                    "needRecharge": true,
                    "deficit": deficit,
                })),
            ))
        }
        Err(err) => Err(task_error(err)),
    }
}

/// Record an unpaid task against the user.
///
/// Idempotent with respect to an already-pending task: the earlier task wins
/// and is echoed back with the current deficit.
pub async fn record_incomplete(
    State(state): State<AppState>,
    Json(payload): Json<IncompletePayload>,
) -> Result<Json<Value>, ApiError> {
    match state
        .engine
        .record_incomplete(&payload.user_id, payload.task)
        .await
    {
        Ok(status) => Ok(Json(json!({
            "ok": true,
            "unpaid": true,
            "task": status.task,
            "deficit": status.deficit,
        }))),
        Err(err) => Err(task_error(err)),
    }
}

/// Progress snapshot: balance, daily/lifetime counters, unpaid task.
pub async fn progress(
    State(state): State<AppState>,
    Query(query): Query<ProgressQuery>,
) -> Result<Json<Value>, ApiError> {
    match state.engine.progress(&query.user_id).await {
        Ok(summary) => Ok(Json(json!({
            "ok": true,
            "balance": summary.balance,
            "completedToday": summary.completed_today,
            "totalCompleted": summary.total_completed,
            "unpaidTask": summary.unpaid_task,
            "lastTaskDate": summary.last_task_date,
        }))),
        Err(err) => Err(task_error(err)),
    }
}

/// Reset today's counters and clear any pending task (admin).
pub async fn reset_daily(
    State(state): State<AppState>,
    Json(payload): Json<UserIdPayload>,
) -> Result<Json<Value>, ApiError> {
    match state.engine.reset_daily(&payload.user_id).await {
        Ok(user) => Ok(Json(json!({ "ok": true, "user": user }))),
        Err(err) => Err(task_error(err)),
    }
}

/// Reset all counters and history, keeping the balance (admin).
pub async fn full_reset(
    State(state): State<AppState>,
    Json(payload): Json<UserIdPayload>,
) -> Result<Json<Value>, ApiError> {
    match state.engine.full_reset(&payload.user_id).await {
        Ok(user) => Ok(Json(json!({ "ok": true, "user": user }))),
        Err(err) => Err(task_error(err)),
    }
}
