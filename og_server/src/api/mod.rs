//! HTTP API for the order-grab platform.
//!
//! # Architecture
//!
//! - **Axum**: Async web framework
//! - **Tower-http**: CORS middleware
//! - **JWT**: Bearer-token authentication for the admin surface
//!
//! # Modules
//!
//! - [`auth`]: Admin login and password change
//! - [`users`]: End-user registration
//! - [`tasks`]: Task grabbing, settlement, progress, resets
//! - [`wallet`]: Deposit/withdrawal requests and history
//! - [`admin`]: Inject rules, user moderation, ledger decisions, address pool
//! - [`middleware`]: Admin JWT middleware
//! - [`request_id`]: Request-id correlation and HTTP metrics
//!
//! # Endpoints Overview
//!
//! ## Public
//! - `GET  /health` - Server health status
//! - `POST /api/auth/admin/login` - Admin login
//! - `POST /api/users/register` - Register a user
//! - `POST /api/task/next` - Grab the next task
//! - `POST /api/task/submit` - Settle the pending task
//! - `POST /api/task/incomplete` - Record an unpaid task
//! - `GET  /api/progress?userId=` - Task progress snapshot
//! - `POST /api/wallet/deposit` - Open a deposit request
//! - `POST /api/wallet/withdraw` - Open a withdrawal request
//! - `GET  /api/wallet/records?userId=` - Ledger history
//!
//! ## Admin (Bearer token required)
//! - `POST /api/auth/admin/password` - Change admin password
//! - `POST /api/task/reset-daily` / `/api/task/full-reset` - Counter resets
//! - `GET/POST /api/admin/inject-rules`, `PATCH/DELETE /api/admin/inject-rules/{id}`
//! - `GET /api/admin/users`, `PATCH/DELETE /api/admin/users/{id}`
//! - `GET /api/admin/deposits`, `POST /api/admin/deposits/{id}/approve|reject`
//! - `GET /api/admin/withdrawals`, `POST /api/admin/withdrawals/{id}/approve|reject`
//! - `GET/POST /api/admin/addresses`, `DELETE /api/admin/addresses/{id}`
//!
//! # Wire format
//!
//! camelCase JSON. Business outcomes serialize as `{"ok": true, ...}` with a
//! discriminating field (`noMore`, `unpaid`, `eligible`); hard errors as
//! `{"ok": false, "error": "..."}` with the mapped status code.

pub mod admin;
pub mod auth;
pub mod middleware;
pub mod request_id;
pub mod tasks;
pub mod users;
pub mod wallet;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, patch, post},
};
use order_grab::{
    auth::AuthManager, ledger::LedgerManager, rules::RuleManager, store::JsonStore,
    task::TaskEngine, user::UserManager,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Cloned per request (cheap, everything is behind an Arc).
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<JsonStore>,
    pub users: Arc<UserManager>,
    pub rules: Arc<RuleManager>,
    pub engine: TaskEngine,
    pub ledger: Arc<LedgerManager>,
    pub auth: Arc<AuthManager>,
}

/// JSON error payload with the mapped status code
pub type ApiError = (StatusCode, Json<Value>);

/// Build an `{"ok": false, "error": ...}` response
pub fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "ok": false, "error": message.into() })))
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Example
///
/// ```rust,no_run
/// # use og_server::api::{create_router, AppState};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let state: AppState = unimplemented!();
/// let app = create_router(state);
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8686").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/admin/login", post(auth::admin_login))
        .route("/api/users/register", post(users::register))
        .route("/api/task/next", post(tasks::next_task))
        .route("/api/task/submit", post(tasks::submit_task))
        .route("/api/task/incomplete", post(tasks::record_incomplete))
        .route("/api/progress", get(tasks::progress))
        .route("/api/wallet/deposit", post(wallet::request_deposit))
        .route("/api/wallet/withdraw", post(wallet::request_withdrawal))
        .route("/api/wallet/records", get(wallet::list_records));

    let admin_routes = Router::new()
        .route("/api/auth/admin/password", post(auth::change_password))
        .route("/api/task/reset-daily", post(tasks::reset_daily))
        .route("/api/task/full-reset", post(tasks::full_reset))
        .route(
            "/api/admin/inject-rules",
            get(admin::list_rules).post(admin::create_rule),
        )
        .route(
            "/api/admin/inject-rules/{rule_id}",
            patch(admin::update_rule).delete(admin::delete_rule),
        )
        .route("/api/admin/users", get(admin::list_users))
        .route(
            "/api/admin/users/{user_id}",
            patch(admin::update_user).delete(admin::delete_user),
        )
        .route("/api/admin/deposits", get(admin::list_deposits))
        .route(
            "/api/admin/deposits/{record_id}/approve",
            post(admin::approve_deposit),
        )
        .route(
            "/api/admin/deposits/{record_id}/reject",
            post(admin::reject_deposit),
        )
        .route("/api/admin/withdrawals", get(admin::list_withdrawals))
        .route(
            "/api/admin/withdrawals/{record_id}/approve",
            post(admin::approve_withdrawal),
        )
        .route(
            "/api/admin/withdrawals/{record_id}/reject",
            post(admin::reject_withdrawal),
        )
        .route(
            "/api/admin/addresses",
            get(admin::list_addresses).post(admin::add_address),
        )
        .route("/api/admin/addresses/{address_id}", delete(admin::remove_address))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::admin_auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Probes the data directory for writability and reports the registry size.
/// Returns `200 OK` when healthy, `503 Service Unavailable` otherwise.
///
/// ```bash
/// curl http://localhost:8686/health
/// # {"status":"healthy","store":true,"users":3,"timestamp":"2026-08-29T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store_healthy = state.store.health_check().await.is_ok();
    let user_count = state.users.list().await.len();

    let status_code = if store_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if store_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "store": store_healthy,
        "users": user_count,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
