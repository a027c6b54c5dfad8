//! Admin moderation handlers: inject rules, users, ledger decisions, the
//! address pool.
//!
//! All routes here sit behind [`super::middleware::admin_auth_middleware`].

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use order_grab::ledger::{LedgerKind, LedgerStatus};
use order_grab::rules::{AmountSpec, RuleError, RulePatch, RuleUpdateOutcome};
use order_grab::user::UserError;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{ApiError, AppState, error_response, wallet::ledger_error};
use crate::metrics;

// ============================================================================
// Inject rules
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesQuery {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRulePayload {
    pub user_id: String,
    pub task_no: u32,
    pub amount_spec: AmountSpec,
    #[serde(default)]
    pub percent: Option<f64>,
}

fn rule_error(err: RuleError) -> ApiError {
    let status = match &err {
        RuleError::NotFound(_) => StatusCode::NOT_FOUND,
        RuleError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    };
    error_response(status, err.client_message())
}

/// List inject rules, optionally filtered by user.
pub async fn list_rules(
    State(state): State<AppState>,
    Query(query): Query<RulesQuery>,
) -> Result<Json<Value>, ApiError> {
    let rules = state.rules.list(query.user_id.as_deref()).await;
    Ok(Json(json!({ "ok": true, "rules": rules })))
}

/// Create an inject rule in `new` status.
///
/// # Request Body
///
/// ```json
/// {"userId": "...", "taskNo": 3, "amountSpec": "300-500", "percent": 12}
/// ```
pub async fn create_rule(
    State(state): State<AppState>,
    Json(payload): Json<CreateRulePayload>,
) -> Result<Json<Value>, ApiError> {
    match state
        .rules
        .create(
            &payload.user_id,
            payload.task_no,
            payload.amount_spec,
            payload.percent,
        )
        .await
    {
        Ok(rule) => Ok(Json(json!({ "ok": true, "rule": rule }))),
        Err(err) => Err(rule_error(err)),
    }
}

/// Patch a rule; `{"action": "confirm"}` arms it, `{"action": "used"}`
/// removes it.
pub async fn update_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<String>,
    Json(patch): Json<RulePatch>,
) -> Result<Json<Value>, ApiError> {
    match state.rules.update(&rule_id, patch).await {
        Ok(RuleUpdateOutcome::Updated(rule)) => Ok(Json(json!({ "ok": true, "rule": rule }))),
        Ok(RuleUpdateOutcome::Removed { removed }) => {
            Ok(Json(json!({ "ok": true, "removed": removed })))
        }
        Err(err) => Err(rule_error(err)),
    }
}

/// Delete a rule.
pub async fn delete_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    match state.rules.delete(&rule_id).await {
        Ok(()) => Ok(Json(json!({ "ok": true }))),
        Err(err) => Err(rule_error(err)),
    }
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatchPayload {
    /// Signed balance delta in USDT
    #[serde(default)]
    pub balance_delta: Option<f64>,
    #[serde(default)]
    pub frozen: Option<bool>,
}

fn user_error(err: UserError) -> ApiError {
    let status = match &err {
        UserError::NotFound(_) => StatusCode::NOT_FOUND,
        UserError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    };
    error_response(status, err.client_message())
}

/// List all user records.
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let users = state.users.list().await;
    Ok(Json(json!({ "ok": true, "users": users })))
}

/// Patch a user: apply a balance delta and/or set the frozen flag.
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(patch): Json<UserPatchPayload>,
) -> Result<Json<Value>, ApiError> {
    if let Some(delta) = patch.balance_delta {
        state
            .users
            .adjust_balance(&user_id, delta)
            .await
            .map_err(user_error)?;
    }
    if let Some(frozen) = patch.frozen {
        state
            .users
            .set_frozen(&user_id, frozen)
            .await
            .map_err(user_error)?;
    }
    let user = state.users.get(&user_id).await.map_err(user_error)?;
    Ok(Json(json!({ "ok": true, "user": user })))
}

/// Delete a user account.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    match state.users.delete(&user_id).await {
        Ok(()) => {
            metrics::users_total(state.users.list().await.len());
            Ok(Json(json!({ "ok": true })))
        }
        Err(err) => Err(user_error(err)),
    }
}

// ============================================================================
// Ledger moderation
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerListQuery {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub status: Option<LedgerStatus>,
}

async fn list_ledger(
    state: &AppState,
    kind: LedgerKind,
    query: LedgerListQuery,
) -> Json<Value> {
    let records = state
        .ledger
        .list(query.user_id.as_deref(), Some(kind), query.status)
        .await;
    Json(json!({ "ok": true, "records": records }))
}

async fn decide_ledger(
    state: &AppState,
    kind: LedgerKind,
    record_id: &str,
    approve: bool,
) -> Result<Json<Value>, ApiError> {
    // Kind check before any money moves, so a deposit id posted to the
    // withdrawal route never mutates a balance
    let existing = state.ledger.get(record_id).await.map_err(ledger_error)?;
    if existing.kind != kind {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            format!("record {record_id} is not a {kind:?}").to_lowercase(),
        ));
    }

    match state.ledger.decide(record_id, approve).await {
        Ok(record) => {
            let kind_label = match kind {
                LedgerKind::Deposit => "deposit",
                LedgerKind::Withdrawal => "withdrawal",
            };
            metrics::ledger_decisions_total(kind_label, approve);
            Ok(Json(json!({ "ok": true, "record": record })))
        }
        Err(err) => Err(ledger_error(err)),
    }
}

/// List deposit records.
pub async fn list_deposits(
    State(state): State<AppState>,
    Query(query): Query<LedgerListQuery>,
) -> Json<Value> {
    list_ledger(&state, LedgerKind::Deposit, query).await
}

/// Approve a deposit: credits the balance and releases the address.
pub async fn approve_deposit(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    decide_ledger(&state, LedgerKind::Deposit, &record_id, true).await
}

/// Reject a deposit: releases the address, no credit.
pub async fn reject_deposit(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    decide_ledger(&state, LedgerKind::Deposit, &record_id, false).await
}

/// List withdrawal records.
pub async fn list_withdrawals(
    State(state): State<AppState>,
    Query(query): Query<LedgerListQuery>,
) -> Json<Value> {
    list_ledger(&state, LedgerKind::Withdrawal, query).await
}

/// Approve a withdrawal: finalizes the held amount.
pub async fn approve_withdrawal(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    decide_ledger(&state, LedgerKind::Withdrawal, &record_id, true).await
}

/// Reject a withdrawal: refunds the held amount.
pub async fn reject_withdrawal(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    decide_ledger(&state, LedgerKind::Withdrawal, &record_id, false).await
}

// ============================================================================
// Address pool
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AddAddressPayload {
    pub address: String,
}

/// List the deposit address pool.
pub async fn list_addresses(State(state): State<AppState>) -> Json<Value> {
    let addresses = state.ledger.list_addresses().await;
    Json(json!({ "ok": true, "addresses": addresses }))
}

/// Add an address to the pool.
pub async fn add_address(
    State(state): State<AppState>,
    Json(payload): Json<AddAddressPayload>,
) -> Result<Json<Value>, ApiError> {
    match state.ledger.add_address(&payload.address).await {
        Ok(entry) => Ok(Json(json!({ "ok": true, "address": entry }))),
        Err(err) => Err(ledger_error(err)),
    }
}

/// Remove an unassigned address from the pool.
pub async fn remove_address(
    State(state): State<AppState>,
    Path(address_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    match state.ledger.remove_address(&address_id).await {
        Ok(()) => Ok(Json(json!({ "ok": true }))),
        Err(err) => Err(ledger_error(err)),
    }
}
