//! Admin authentication: peppered Argon2id credentials and JWT sessions.
//!
//! The platform has a single operator role. Credentials live in `admin.json`
//! and a default account is bootstrapped on first start; moderation endpoints
//! require a bearer token minted by [`AuthManager::login`].

mod errors;
mod manager;
mod models;

pub use errors::{AuthError, AuthResult};
pub use manager::AuthManager;
pub use models::{AccessTokenClaims, AdminCredentials, SessionToken};
