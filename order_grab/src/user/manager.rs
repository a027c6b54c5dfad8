//! User manager: registry, per-user locks, and persistence.

use super::{
    errors::{UserError, UserResult},
    models::{User, UserId},
};
use crate::money::round3;
use crate::store::JsonStore;
use log::info;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

const USERS_FILE: &str = "users.json";

/// User manager
///
/// Owns the in-memory user map, mirrors every mutation to `users.json`, and
/// hands out per-user mutexes so callers can serialize their
/// read-modify-write sequences (see the module docs).
pub struct UserManager {
    store: Arc<JsonStore>,
    users: RwLock<HashMap<UserId, User>>,
    locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl UserManager {
    /// Load the registry from `users.json` (empty when the file is absent)
    pub async fn load(store: Arc<JsonStore>) -> UserResult<Self> {
        let records: Vec<User> = store.load(USERS_FILE).await?.unwrap_or_default();
        info!("Loaded {} user record(s)", records.len());

        let users = records.into_iter().map(|u| (u.id.clone(), u)).collect();
        Ok(Self {
            store,
            users: RwLock::new(users),
            locks: Mutex::new(HashMap::new()),
        })
    }

    /// Get the exclusive-access lock for a user id
    ///
    /// Callers must hold this lock across any read-modify-write of the user
    /// record. The lock is created on first use and shared afterwards.
    pub async fn lock_for(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Register a new account with zero balance and counters
    ///
    /// # Errors
    ///
    /// * `UserError::InvalidUsername` - Username format invalid
    /// * `UserError::UsernameTaken` - Username already exists
    pub async fn register(&self, username: &str) -> UserResult<User> {
        validate_username(username)?;

        let mut users = self.users.write().await;
        if users.values().any(|u| u.username == username) {
            return Err(UserError::UsernameTaken(username.to_string()));
        }

        let user = User::new(Uuid::new_v4().to_string(), username.to_string());
        users.insert(user.id.clone(), user.clone());
        self.persist(&users).await?;
        info!("Registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Get a snapshot of a user record
    pub async fn get(&self, user_id: &str) -> UserResult<User> {
        self.users
            .read()
            .await
            .get(user_id)
            .cloned()
            .ok_or_else(|| UserError::NotFound(user_id.to_string()))
    }

    /// List all user records
    pub async fn list(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        users
    }

    /// Write back a mutated user record and persist the registry
    ///
    /// The caller must hold the user's lock from [`lock_for`].
    ///
    /// [`lock_for`]: UserManager::lock_for
    pub async fn replace(&self, user: User) -> UserResult<()> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(UserError::NotFound(user.id));
        }
        users.insert(user.id.clone(), user);
        self.persist(&users).await
    }

    /// Apply a signed balance delta (admin adjustment, ledger settlement)
    ///
    /// Takes the per-user lock itself; do not call while already holding it.
    ///
    /// # Errors
    ///
    /// * `UserError::InsufficientBalance` - Debit exceeds the balance
    pub async fn adjust_balance(&self, user_id: &str, delta: f64) -> UserResult<User> {
        let lock = self.lock_for(user_id).await;
        let _guard = lock.lock().await;

        let mut users = self.users.write().await;
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| UserError::NotFound(user_id.to_string()))?;

        let next = round3(user.balance + delta);
        if next < 0.0 {
            return Err(UserError::InsufficientBalance {
                available: user.balance,
                required: -delta,
            });
        }
        user.balance = next;
        let snapshot = user.clone();
        self.persist(&users).await?;
        Ok(snapshot)
    }

    /// Freeze or unfreeze an account
    pub async fn set_frozen(&self, user_id: &str, frozen: bool) -> UserResult<User> {
        let lock = self.lock_for(user_id).await;
        let _guard = lock.lock().await;

        let mut users = self.users.write().await;
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| UserError::NotFound(user_id.to_string()))?;
        user.is_frozen = frozen;
        let snapshot = user.clone();
        self.persist(&users).await?;
        Ok(snapshot)
    }

    /// Delete an account
    pub async fn delete(&self, user_id: &str) -> UserResult<()> {
        let lock = self.lock_for(user_id).await;
        let _guard = lock.lock().await;

        let mut users = self.users.write().await;
        if users.remove(user_id).is_none() {
            return Err(UserError::NotFound(user_id.to_string()));
        }
        self.persist(&users).await
    }

    async fn persist(&self, users: &HashMap<UserId, User>) -> UserResult<()> {
        let mut records: Vec<&User> = users.values().collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        self.store.save(USERS_FILE, &records).await?;
        Ok(())
    }
}

/// Validate username format (3-20 chars, alphanumeric or underscore)
fn validate_username(username: &str) -> UserResult<()> {
    let len = username.chars().count();
    if !(3..=20).contains(&len) {
        return Err(UserError::InvalidUsername(
            "Username must be 3-20 characters".to_string(),
        ));
    }
    if !username.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(UserError::InvalidUsername(
            "Username can only contain letters, numbers, and underscores".to_string(),
        ));
    }
    Ok(())
}
