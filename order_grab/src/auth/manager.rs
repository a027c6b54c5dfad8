//! Authentication manager implementation.

use super::{
    errors::{AuthError, AuthResult},
    models::{AccessTokenClaims, AdminCredentials, SessionToken},
};
use crate::store::JsonStore;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::RwLock;

const ADMIN_FILE: &str = "admin.json";
const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "Admin12345";

/// Authentication manager
///
/// Holds the single admin credential record and mints/verifies the bearer
/// tokens that gate the moderation API.
pub struct AuthManager {
    store: Arc<JsonStore>,
    credentials: RwLock<AdminCredentials>,
    pepper: String,
    jwt_secret: String,
    token_duration: Duration,
}

impl AuthManager {
    /// Load admin credentials, bootstrapping the default account on first run
    ///
    /// # Arguments
    ///
    /// * `store` - JSON store backing `admin.json`
    /// * `pepper` - Server-side pepper for password hashing
    /// * `jwt_secret` - Secret key for JWT signing
    pub async fn load(store: Arc<JsonStore>, pepper: String, jwt_secret: String) -> AuthResult<Self> {
        let manager = Self {
            store,
            credentials: RwLock::new(AdminCredentials {
                username: String::new(),
                password_hash: String::new(),
                updated_at: Utc::now(),
            }),
            pepper,
            jwt_secret,
            token_duration: Duration::hours(12),
        };

        match manager.store.load::<AdminCredentials>(ADMIN_FILE).await? {
            Some(creds) => {
                *manager.credentials.write().await = creds;
            }
            None => {
                warn!("No admin credentials found; bootstrapping default admin account");
                let creds = AdminCredentials {
                    username: DEFAULT_ADMIN_USERNAME.to_string(),
                    password_hash: manager.hash_password(DEFAULT_ADMIN_PASSWORD)?,
                    updated_at: Utc::now(),
                };
                manager.store.save(ADMIN_FILE, &creds).await?;
                *manager.credentials.write().await = creds;
            }
        }
        Ok(manager)
    }

    /// Authenticate and mint a bearer token
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidCredentials` - Unknown username or wrong password
    pub async fn login(&self, username: &str, password: &str) -> AuthResult<SessionToken> {
        let creds = self.credentials.read().await;
        if creds.username != username {
            return Err(AuthError::InvalidCredentials);
        }
        self.verify_password(password, &creds.password_hash)?;
        drop(creds);

        info!("Admin {username} logged in");
        self.generate_access_token(username)
    }

    /// Verify a bearer token and return its claims
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidToken` - Malformed, expired, or non-admin token
    pub fn verify_access_token(&self, token: &str) -> AuthResult<AccessTokenClaims> {
        let token_data = decode::<AccessTokenClaims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AuthError::InvalidToken)?;

        if !token_data.claims.is_admin {
            return Err(AuthError::InvalidToken);
        }
        Ok(token_data.claims)
    }

    /// Change the admin password
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidCredentials` - Current password wrong
    /// * `AuthError::WeakPassword` - New password fails the strength check
    pub async fn change_password(&self, current: &str, new_password: &str) -> AuthResult<()> {
        validate_password(new_password)?;

        let mut creds = self.credentials.write().await;
        self.verify_password(current, &creds.password_hash)?;

        creds.password_hash = self.hash_password(new_password)?;
        creds.updated_at = Utc::now();
        self.store.save(ADMIN_FILE, &*creds).await?;
        info!("Admin password changed");
        Ok(())
    }

    /// Hash password with Argon2id + pepper
    fn hash_password(&self, password: &str) -> AuthResult<String> {
        let peppered = format!("{}{}", password, self.pepper);
        let salt = SaltString::generate(&mut OsRng);
        Ok(Argon2::default()
            .hash_password(peppered.as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string())
    }

    /// Verify password against hash
    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<()> {
        let peppered = format!("{}{}", password, self.pepper);
        let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
        Argon2::default()
            .verify_password(peppered.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidCredentials)
    }

    /// Generate JWT access token
    fn generate_access_token(&self, username: &str) -> AuthResult<SessionToken> {
        let now = Utc::now();
        let expires_at = (now + self.token_duration).timestamp();
        let claims = AccessTokenClaims {
            sub: username.to_string(),
            is_admin: true,
            exp: expires_at,
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;
        Ok(SessionToken {
            access_token,
            expires_at,
        })
    }
}

/// Validate password strength
fn validate_password(password: &str) -> AuthResult<()> {
    if password.len() < 8 {
        return Err(AuthError::WeakPassword(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_uppercase = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lowercase = password.chars().any(|c| c.is_ascii_lowercase());
    if !has_digit || !has_uppercase || !has_lowercase {
        return Err(AuthError::WeakPassword(
            "Password must contain at least one number, one uppercase and one lowercase letter"
                .to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreConfig;

    async fn temp_auth() -> (tempfile::TempDir, AuthManager) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(JsonStore::new(StoreConfig::with_dir(dir.path())));
        store.init().await.unwrap();
        let auth = AuthManager::load(store, "pepper".into(), "jwt_secret".into())
            .await
            .unwrap();
        (dir, auth)
    }

    #[tokio::test]
    async fn test_bootstrap_and_login() {
        let (_dir, auth) = temp_auth().await;
        let token = auth
            .login(DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD)
            .await
            .unwrap();

        let claims = auth.verify_access_token(&token.access_token).unwrap();
        assert_eq!(claims.sub, DEFAULT_ADMIN_USERNAME);
        assert!(claims.is_admin);
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password() {
        let (_dir, auth) = temp_auth().await;
        let err = auth
            .login(DEFAULT_ADMIN_USERNAME, "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_verify_rejects_garbage_token() {
        let (_dir, auth) = temp_auth().await;
        assert!(matches!(
            auth.verify_access_token("not.a.jwt"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_change_password() {
        let (_dir, auth) = temp_auth().await;
        auth.change_password(DEFAULT_ADMIN_PASSWORD, "NewSecret99")
            .await
            .unwrap();

        assert!(auth.login(DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD).await.is_err());
        auth.login(DEFAULT_ADMIN_USERNAME, "NewSecret99").await.unwrap();

        let err = auth
            .change_password("NewSecret99", "short")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword(_)));
    }

    #[tokio::test]
    async fn test_credentials_survive_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(JsonStore::new(StoreConfig::with_dir(dir.path())));
        store.init().await.unwrap();

        let auth = AuthManager::load(store.clone(), "pepper".into(), "jwt_secret".into())
            .await
            .unwrap();
        auth.change_password(DEFAULT_ADMIN_PASSWORD, "NewSecret99")
            .await
            .unwrap();
        drop(auth);

        let reloaded = AuthManager::load(store, "pepper".into(), "jwt_secret".into())
            .await
            .unwrap();
        reloaded
            .login(DEFAULT_ADMIN_USERNAME, "NewSecret99")
            .await
            .unwrap();
    }
}
