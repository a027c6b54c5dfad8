//! Admin authentication handlers.
//!
//! Login mints a bearer token for the moderation surface; password changes
//! require the current password and a confirmed admin token.
//!
//! ```bash
//! curl -X POST http://localhost:8686/api/auth/admin/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "admin", "password": "Admin12345"}'
//! ```

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{ApiError, AppState, error_response};
use crate::{logging, metrics};

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordPayload {
    pub current_password: String,
    pub new_password: String,
}

/// Authenticate the admin and mint a bearer token.
///
/// # Response
///
/// ```json
/// {"ok": true, "accessToken": "eyJhbGciOiJIUzI1NiIs...", "expiresAt": 1756500000}
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown username or wrong password
pub async fn admin_login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<Value>, ApiError> {
    match state.auth.login(&payload.username, &payload.password).await {
        Ok(token) => {
            metrics::login_attempts_total(true);
            Ok(Json(json!({
                "ok": true,
                "accessToken": token.access_token,
                "expiresAt": token.expires_at,
            })))
        }
        Err(err) => {
            metrics::login_attempts_total(false);
            logging::log_security_event(
                "failed_admin_login",
                Some(&payload.username),
                "Admin login rejected",
            );
            Err(error_response(
                StatusCode::UNAUTHORIZED,
                err.client_message(),
            ))
        }
    }
}

/// Change the admin password (admin token required).
///
/// # Errors
///
/// - `401 Unauthorized`: Current password wrong
/// - `400 Bad Request`: New password too weak
pub async fn change_password(
    State(state): State<AppState>,
    Json(payload): Json<ChangePasswordPayload>,
) -> Result<Json<Value>, ApiError> {
    use order_grab::auth::AuthError;

    match state
        .auth
        .change_password(&payload.current_password, &payload.new_password)
        .await
    {
        Ok(()) => Ok(Json(json!({ "ok": true }))),
        Err(err @ AuthError::InvalidCredentials) => Err(error_response(
            StatusCode::UNAUTHORIZED,
            err.client_message(),
        )),
        Err(err @ AuthError::WeakPassword(_)) => Err(error_response(
            StatusCode::BAD_REQUEST,
            err.client_message(),
        )),
        Err(err) => Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            err.client_message(),
        )),
    }
}
