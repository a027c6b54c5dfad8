//! Admin authentication middleware.
//!
//! Extracts and validates the JWT bearer token from the Authorization header
//! and injects the admin username into request extensions. Every `/api/admin`
//! route (and the reset endpoints) sits behind this middleware.
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum::{Router, routing::get, middleware};
//! # use og_server::api::middleware::admin_auth_middleware;
//! # use og_server::api::AppState;
//! # async fn handler() {}
//! # let state: AppState = unimplemented!();
//!
//! let protected_routes: Router = Router::new()
//!     .route("/api/admin/users", get(handler))
//!     .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware));
//! # let _ = protected_routes;
//! ```

use axum::{
    extract::{Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use super::AppState;

/// Admin identity injected into request extensions after token verification
#[derive(Clone, Debug)]
pub struct AdminIdentity(pub String);

/// Middleware validating the admin bearer token.
///
/// Expects `Authorization: Bearer <jwt>`. Returns `401 Unauthorized` when the
/// header is missing, malformed, or carries an invalid/expired token.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let token = match auth_header {
        Some(t) => t,
        None => return Err(StatusCode::UNAUTHORIZED),
    };

    match state.auth.verify_access_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(AdminIdentity(claims.sub));
            Ok(next.run(request).await)
        }
        Err(_) => Err(StatusCode::UNAUTHORIZED),
    }
}
