//! Ledger manager: requests, moderation, and the address pool.

use super::{
    errors::{LedgerError, LedgerResult},
    models::{LedgerKind, LedgerRecord, LedgerStatus, PoolAddress},
};
use crate::money::round2;
use crate::store::JsonStore;
use crate::user::UserManager;
use chrono::Utc;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

const LEDGER_FILE: &str = "ledger.json";
const ADDRESSES_FILE: &str = "addresses.json";

struct LedgerState {
    records: Vec<LedgerRecord>,
    addresses: Vec<PoolAddress>,
}

/// Ledger manager
///
/// A single mutex guards both the records and the address pool, since a
/// deposit decision touches both. Balance movements go through
/// [`UserManager::adjust_balance`], which must not be called while holding a
/// per-user lock.
pub struct LedgerManager {
    store: Arc<JsonStore>,
    users: Arc<UserManager>,
    state: Mutex<LedgerState>,
}

impl LedgerManager {
    /// Load ledger records and the address pool from disk
    pub async fn load(store: Arc<JsonStore>, users: Arc<UserManager>) -> LedgerResult<Self> {
        let records: Vec<LedgerRecord> = store.load(LEDGER_FILE).await?.unwrap_or_default();
        let addresses: Vec<PoolAddress> = store.load(ADDRESSES_FILE).await?.unwrap_or_default();
        info!(
            "Loaded {} ledger record(s), {} pool address(es)",
            records.len(),
            addresses.len()
        );
        Ok(Self {
            store,
            users,
            state: Mutex::new(LedgerState { records, addresses }),
        })
    }

    /// Open a deposit request and assign a free pool address
    ///
    /// # Errors
    ///
    /// * `LedgerError::InvalidAmount` - Amount not positive
    /// * `LedgerError::NoFreeAddress` - Pool exhausted
    pub async fn request_deposit(&self, user_id: &str, amount: f64) -> LedgerResult<LedgerRecord> {
        let amount = validate_amount(amount)?;
        // Existence check up front so a bad user id does not burn an address
        self.users.get(user_id).await?;

        let mut state = self.state.lock().await;
        let slot = state
            .addresses
            .iter_mut()
            .find(|a| a.assigned_to.is_none())
            .ok_or(LedgerError::NoFreeAddress)?;
        slot.assigned_to = Some(user_id.to_string());
        let address = slot.address.clone();

        let record = LedgerRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            kind: LedgerKind::Deposit,
            amount,
            status: LedgerStatus::Pending,
            address,
            created_at: Utc::now(),
            decided_at: None,
        };
        state.records.push(record.clone());
        self.persist(&state).await?;
        info!(
            "Deposit request {} opened: user {user_id}, {amount} USDT to {}",
            record.id, record.address
        );
        Ok(record)
    }

    /// Open a withdrawal request; the amount is debited immediately
    ///
    /// The hold prevents the balance from being spent on tasks while the
    /// request awaits moderation. Rejection refunds it.
    ///
    /// # Errors
    ///
    /// * `LedgerError::InvalidAmount` - Amount not positive
    /// * `LedgerError::InsufficientBalance` - Balance below the amount
    pub async fn request_withdrawal(
        &self,
        user_id: &str,
        amount: f64,
        address: &str,
    ) -> LedgerResult<LedgerRecord> {
        let amount = validate_amount(amount)?;
        self.users.adjust_balance(user_id, -amount).await?;

        let mut state = self.state.lock().await;
        let record = LedgerRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            kind: LedgerKind::Withdrawal,
            amount,
            status: LedgerStatus::Pending,
            address: address.to_string(),
            created_at: Utc::now(),
            decided_at: None,
        };
        state.records.push(record.clone());
        self.persist(&state).await?;
        info!(
            "Withdrawal request {} opened: user {user_id}, {amount} USDT held",
            record.id
        );
        Ok(record)
    }

    /// Approve or reject a pending record
    ///
    /// Deposit approval credits the user; withdrawal rejection refunds the
    /// hold. Deposit decisions release the assigned pool address either way.
    ///
    /// # Errors
    ///
    /// * `LedgerError::NotFound` - No such record
    /// * `LedgerError::AlreadyDecided` - Record not pending
    pub async fn decide(&self, record_id: &str, approve: bool) -> LedgerResult<LedgerRecord> {
        let mut state = self.state.lock().await;
        let idx = state
            .records
            .iter()
            .position(|r| r.id == record_id)
            .ok_or_else(|| LedgerError::NotFound(record_id.to_string()))?;
        if state.records[idx].status != LedgerStatus::Pending {
            return Err(LedgerError::AlreadyDecided(record_id.to_string()));
        }

        let (kind, user_id, amount, address) = {
            let r = &state.records[idx];
            (r.kind, r.user_id.clone(), r.amount, r.address.clone())
        };

        // Balance movement first; the record only flips once it succeeds
        match (kind, approve) {
            (LedgerKind::Deposit, true) => {
                self.users.adjust_balance(&user_id, amount).await?;
            }
            (LedgerKind::Withdrawal, false) => {
                self.users.adjust_balance(&user_id, amount).await?;
            }
            _ => {}
        }

        if kind == LedgerKind::Deposit {
            if let Some(slot) = state.addresses.iter_mut().find(|a| a.address == address) {
                slot.assigned_to = None;
            }
        }

        let record = &mut state.records[idx];
        record.status = if approve {
            LedgerStatus::Approved
        } else {
            LedgerStatus::Rejected
        };
        record.decided_at = Some(Utc::now());
        let snapshot = record.clone();
        self.persist(&state).await?;
        info!(
            "Ledger record {record_id} {}",
            if approve { "approved" } else { "rejected" }
        );
        Ok(snapshot)
    }

    /// Get a single ledger record
    pub async fn get(&self, record_id: &str) -> LedgerResult<LedgerRecord> {
        let state = self.state.lock().await;
        state
            .records
            .iter()
            .find(|r| r.id == record_id)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(record_id.to_string()))
    }

    /// List ledger records, optionally filtered by user, kind, or status
    ///
    /// Most recent first.
    pub async fn list(
        &self,
        user_id: Option<&str>,
        kind: Option<LedgerKind>,
        status: Option<LedgerStatus>,
    ) -> Vec<LedgerRecord> {
        let state = self.state.lock().await;
        let mut out: Vec<LedgerRecord> = state
            .records
            .iter()
            .filter(|r| user_id.is_none_or(|uid| r.user_id == uid))
            .filter(|r| kind.is_none_or(|k| r.kind == k))
            .filter(|r| status.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out
    }

    /// Add an address to the deposit pool
    ///
    /// # Errors
    ///
    /// * `LedgerError::DuplicateAddress` - Address already pooled
    pub async fn add_address(&self, address: &str) -> LedgerResult<PoolAddress> {
        let mut state = self.state.lock().await;
        if state.addresses.iter().any(|a| a.address == address) {
            return Err(LedgerError::DuplicateAddress(address.to_string()));
        }
        let entry = PoolAddress {
            id: Uuid::new_v4().to_string(),
            address: address.to_string(),
            assigned_to: None,
            created_at: Utc::now(),
        };
        state.addresses.push(entry.clone());
        self.persist(&state).await?;
        Ok(entry)
    }

    /// Remove a pool address
    ///
    /// # Errors
    ///
    /// * `LedgerError::NotFound` - No such address
    /// * `LedgerError::AddressInUse` - Assigned to a pending deposit
    pub async fn remove_address(&self, address_id: &str) -> LedgerResult<()> {
        let mut state = self.state.lock().await;
        let idx = state
            .addresses
            .iter()
            .position(|a| a.id == address_id)
            .ok_or_else(|| LedgerError::NotFound(address_id.to_string()))?;
        if state.addresses[idx].assigned_to.is_some() {
            return Err(LedgerError::AddressInUse(
                state.addresses[idx].address.clone(),
            ));
        }
        state.addresses.remove(idx);
        self.persist(&state).await
    }

    /// List the address pool
    pub async fn list_addresses(&self) -> Vec<PoolAddress> {
        let state = self.state.lock().await;
        state.addresses.clone()
    }

    async fn persist(&self, state: &LedgerState) -> LedgerResult<()> {
        self.store.save(LEDGER_FILE, &state.records).await?;
        self.store.save(ADDRESSES_FILE, &state.addresses).await?;
        Ok(())
    }
}

fn validate_amount(amount: f64) -> LedgerResult<f64> {
    if !(amount.is_finite() && amount > 0.0) {
        return Err(LedgerError::InvalidAmount(amount));
    }
    Ok(round2(amount))
}
