//! End-user registration handler.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{ApiError, AppState, error_response};
use crate::metrics;

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub username: String,
}

/// Register a new user account with a zero balance.
///
/// # Request Body
///
/// ```json
/// {"username": "alice_01"}
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Username taken or format invalid
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<Json<Value>, ApiError> {
    use order_grab::user::UserError;

    match state.users.register(&payload.username).await {
        Ok(user) => {
            metrics::users_total(state.users.list().await.len());
            Ok(Json(json!({ "ok": true, "user": user })))
        }
        Err(err @ (UserError::UsernameTaken(_) | UserError::InvalidUsername(_))) => Err(
            error_response(StatusCode::BAD_REQUEST, err.client_message()),
        ),
        Err(err) => Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            err.client_message(),
        )),
    }
}
