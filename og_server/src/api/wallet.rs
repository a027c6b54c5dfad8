//! Wallet handlers: deposit/withdrawal requests and ledger history.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use order_grab::ledger::LedgerError;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{ApiError, AppState, error_response};
use crate::metrics;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositPayload {
    pub user_id: String,
    pub amount: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawPayload {
    pub user_id: String,
    pub amount: f64,
    pub address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordsQuery {
    pub user_id: String,
}

/// Map ledger errors to HTTP responses
pub(super) fn ledger_error(err: LedgerError) -> ApiError {
    let status = match &err {
        LedgerError::UserNotFound(_) | LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::InvalidAmount(_)
        | LedgerError::InsufficientBalance { .. }
        | LedgerError::AlreadyDecided(_)
        | LedgerError::AddressInUse(_)
        | LedgerError::DuplicateAddress(_) => StatusCode::BAD_REQUEST,
        LedgerError::NoFreeAddress => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, err.client_message())
}

/// Open a deposit request and return the assigned deposit address.
///
/// # Response
///
/// ```json
/// {"ok": true, "record": {"id": "...", "address": "T...", "status": "PENDING", ...}}
/// ```
///
/// # Errors
///
/// - `503 Service Unavailable`: Every pool address is assigned
pub async fn request_deposit(
    State(state): State<AppState>,
    Json(payload): Json<DepositPayload>,
) -> Result<Json<Value>, ApiError> {
    match state
        .ledger
        .request_deposit(&payload.user_id, payload.amount)
        .await
    {
        Ok(record) => {
            metrics::ledger_requests_total("deposit");
            Ok(Json(json!({ "ok": true, "record": record })))
        }
        Err(err) => Err(ledger_error(err)),
    }
}

/// Open a withdrawal request; the amount is held immediately.
///
/// # Errors
///
/// - `400 Bad Request`: Amount exceeds the balance
pub async fn request_withdrawal(
    State(state): State<AppState>,
    Json(payload): Json<WithdrawPayload>,
) -> Result<Json<Value>, ApiError> {
    match state
        .ledger
        .request_withdrawal(&payload.user_id, payload.amount, &payload.address)
        .await
    {
        Ok(record) => {
            metrics::ledger_requests_total("withdrawal");
            Ok(Json(json!({ "ok": true, "record": record })))
        }
        Err(err) => Err(ledger_error(err)),
    }
}

/// List the user's ledger records, most recent first.
pub async fn list_records(
    State(state): State<AppState>,
    Query(query): Query<RecordsQuery>,
) -> Result<Json<Value>, ApiError> {
    let records = state.ledger.list(Some(&query.user_id), None, None).await;
    Ok(Json(json!({ "ok": true, "records": records })))
}
