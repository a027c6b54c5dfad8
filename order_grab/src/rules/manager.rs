//! Inject rule manager: CRUD, confirmation, one-shot consumption.

use super::{
    errors::{RuleError, RuleResult},
    models::{AmountSpec, InjectRule, RulePatch, RuleStatus},
};
use crate::store::JsonStore;
use crate::task::MAX_TASKS_PER_DAY;
use chrono::Utc;
use log::info;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

const RULES_FILE: &str = "inject_rules.json";

/// Outcome of a rule update
#[derive(Debug, Clone)]
pub enum RuleUpdateOutcome {
    /// Rule fields changed in place
    Updated(InjectRule),
    /// Rule was marked used and removed
    Removed { removed: usize },
}

/// Inject rule manager
///
/// Owns the rule list and mirrors every mutation to `inject_rules.json`.
/// Consumption is serialized through the interior write lock; the engine
/// additionally holds the target user's lock, so a rule fires at most once.
pub struct RuleManager {
    store: Arc<JsonStore>,
    rules: RwLock<Vec<InjectRule>>,
}

impl RuleManager {
    /// Load rules from `inject_rules.json` (empty when the file is absent)
    pub async fn load(store: Arc<JsonStore>) -> RuleResult<Self> {
        let rules: Vec<InjectRule> = store.load(RULES_FILE).await?.unwrap_or_default();
        info!("Loaded {} inject rule(s)", rules.len());
        Ok(Self {
            store,
            rules: RwLock::new(rules),
        })
    }

    /// List rules, optionally filtered to one user, ordered by task number
    pub async fn list(&self, user_id: Option<&str>) -> Vec<InjectRule> {
        let rules = self.rules.read().await;
        let mut out: Vec<InjectRule> = rules
            .iter()
            .filter(|r| user_id.is_none_or(|uid| r.user_id == uid))
            .cloned()
            .collect();
        out.sort_by(|a, b| (a.user_id.as_str(), a.task_no).cmp(&(b.user_id.as_str(), b.task_no)));
        out
    }

    /// Create a rule in `new` status
    ///
    /// # Errors
    ///
    /// * `RuleError::InvalidTaskNo` - Task number outside `1..=25`
    /// * `RuleError::InvalidPercent` - Percent outside `(0, 100]`
    /// * `RuleError::Duplicate` - User/task-number pair already ruled
    pub async fn create(
        &self,
        user_id: &str,
        task_no: u32,
        amount_spec: AmountSpec,
        percent: Option<f64>,
    ) -> RuleResult<InjectRule> {
        validate_task_no(task_no)?;
        validate_percent(percent)?;

        let mut rules = self.rules.write().await;
        if rules
            .iter()
            .any(|r| r.user_id == user_id && r.task_no == task_no)
        {
            return Err(RuleError::Duplicate {
                user_id: user_id.to_string(),
                task_no,
            });
        }

        let rule = InjectRule {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            task_no,
            amount_spec,
            percent,
            status: RuleStatus::New,
            created_at: Utc::now(),
        };
        rules.push(rule.clone());
        self.persist(&rules).await?;
        info!(
            "Created inject rule {} for user {user_id} at task #{task_no}",
            rule.id
        );
        Ok(rule)
    }

    /// Apply a partial update; `action: used` removes the rule
    ///
    /// # Errors
    ///
    /// * `RuleError::NotFound` - No such rule
    pub async fn update(&self, rule_id: &str, patch: RulePatch) -> RuleResult<RuleUpdateOutcome> {
        if let Some(task_no) = patch.task_no {
            validate_task_no(task_no)?;
        }
        validate_percent(patch.percent)?;

        let mut rules = self.rules.write().await;
        let idx = rules
            .iter()
            .position(|r| r.id == rule_id)
            .ok_or_else(|| RuleError::NotFound(rule_id.to_string()))?;

        if patch.marks_used() {
            rules.remove(idx);
            self.persist(&rules).await?;
            info!("Inject rule {rule_id} marked used and removed");
            return Ok(RuleUpdateOutcome::Removed { removed: 1 });
        }

        let rule = &mut rules[idx];
        if let Some(spec) = patch.amount_spec {
            rule.amount_spec = spec;
        }
        if let Some(percent) = patch.percent {
            rule.percent = Some(percent);
        }
        if let Some(task_no) = patch.task_no {
            rule.task_no = task_no;
        }
        if let Some(status) = patch.status_change() {
            rule.status = status;
        }
        let updated = rule.clone();
        self.persist(&rules).await?;
        Ok(RuleUpdateOutcome::Updated(updated))
    }

    /// Delete a rule
    pub async fn delete(&self, rule_id: &str) -> RuleResult<()> {
        let mut rules = self.rules.write().await;
        let before = rules.len();
        rules.retain(|r| r.id != rule_id);
        if rules.len() == before {
            return Err(RuleError::NotFound(rule_id.to_string()));
        }
        self.persist(&rules).await
    }

    /// Pop the confirmed rule matching `(user_id, task_no)`, if any
    ///
    /// The rule is removed before it is returned, so it fires exactly once.
    /// Unconfirmed rules never match.
    pub async fn consume(&self, user_id: &str, task_no: u32) -> RuleResult<Option<InjectRule>> {
        let mut rules = self.rules.write().await;
        let idx = rules.iter().position(|r| {
            r.user_id == user_id && r.task_no == task_no && r.status == RuleStatus::Confirmed
        });
        let Some(idx) = idx else {
            return Ok(None);
        };
        let rule = rules.remove(idx);
        self.persist(&rules).await?;
        Ok(Some(rule))
    }

    async fn persist(&self, rules: &[InjectRule]) -> RuleResult<()> {
        self.store.save(RULES_FILE, &rules).await?;
        Ok(())
    }
}

fn validate_task_no(task_no: u32) -> RuleResult<()> {
    if !(1..=MAX_TASKS_PER_DAY).contains(&task_no) {
        return Err(RuleError::InvalidTaskNo(task_no));
    }
    Ok(())
}

fn validate_percent(percent: Option<f64>) -> RuleResult<()> {
    if let Some(p) = percent
        && !(p > 0.0 && p <= 100.0)
    {
        return Err(RuleError::InvalidPercent(p));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::models::{RuleAction, RuleStatusPatch};
    use crate::store::StoreConfig;

    async fn temp_manager() -> (tempfile::TempDir, RuleManager) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(JsonStore::new(StoreConfig::with_dir(dir.path())));
        store.init().await.unwrap();
        let manager = RuleManager::load(store).await.unwrap();
        (dir, manager)
    }

    #[tokio::test]
    async fn test_create_starts_new() {
        let (_dir, manager) = temp_manager().await;
        let rule = manager
            .create("u1", 3, AmountSpec::Literal(350.0), Some(12.0))
            .await
            .unwrap();
        assert_eq!(rule.status, RuleStatus::New);
        assert_eq!(manager.list(Some("u1")).await.len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicates_and_bad_input() {
        let (_dir, manager) = temp_manager().await;
        manager
            .create("u1", 3, AmountSpec::Literal(350.0), None)
            .await
            .unwrap();

        let err = manager
            .create("u1", 3, AmountSpec::Literal(400.0), None)
            .await
            .unwrap_err();
        assert!(matches!(err, RuleError::Duplicate { .. }));

        assert!(matches!(
            manager
                .create("u1", 0, AmountSpec::Literal(10.0), None)
                .await,
            Err(RuleError::InvalidTaskNo(0))
        ));
        assert!(matches!(
            manager
                .create("u1", 26, AmountSpec::Literal(10.0), None)
                .await,
            Err(RuleError::InvalidTaskNo(26))
        ));
        assert!(matches!(
            manager
                .create("u1", 5, AmountSpec::Literal(10.0), Some(101.0))
                .await,
            Err(RuleError::InvalidPercent(_))
        ));
    }

    #[tokio::test]
    async fn test_unconfirmed_rules_do_not_fire() {
        let (_dir, manager) = temp_manager().await;
        let rule = manager
            .create("u1", 3, AmountSpec::Literal(350.0), None)
            .await
            .unwrap();

        assert!(manager.consume("u1", 3).await.unwrap().is_none());

        manager
            .update(
                &rule.id,
                RulePatch {
                    action: Some(RuleAction::Confirm),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let fired = manager.consume("u1", 3).await.unwrap().unwrap();
        assert_eq!(fired.id, rule.id);
        // One-shot: a second consume finds nothing
        assert!(manager.consume("u1", 3).await.unwrap().is_none());
        assert!(manager.list(None).await.is_empty());
    }

    #[tokio::test]
    async fn test_update_used_removes() {
        let (_dir, manager) = temp_manager().await;
        let rule = manager
            .create("u1", 7, AmountSpec::Range(300.0, 500.0), None)
            .await
            .unwrap();

        let outcome = manager
            .update(
                &rule.id,
                RulePatch {
                    action: Some(RuleAction::Used),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(matches!(outcome, RuleUpdateOutcome::Removed { removed: 1 }));
        assert!(manager.list(None).await.is_empty());
    }

    #[tokio::test]
    async fn test_status_used_also_removes() {
        let (_dir, manager) = temp_manager().await;
        let rule = manager
            .create("u1", 2, AmountSpec::Literal(120.0), None)
            .await
            .unwrap();

        let outcome = manager
            .update(
                &rule.id,
                RulePatch {
                    status: Some(RuleStatusPatch::Used),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(matches!(outcome, RuleUpdateOutcome::Removed { removed: 1 }));
        assert!(manager.list(None).await.is_empty());
    }

    #[tokio::test]
    async fn test_rules_survive_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(JsonStore::new(StoreConfig::with_dir(dir.path())));
        store.init().await.unwrap();

        let manager = RuleManager::load(store.clone()).await.unwrap();
        manager
            .create("u1", 5, AmountSpec::Range(300.0, 500.0), Some(15.0))
            .await
            .unwrap();
        drop(manager);

        let reloaded = RuleManager::load(store).await.unwrap();
        let rules = reloaded.list(Some("u1")).await;
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].amount_spec, AmountSpec::Range(300.0, 500.0));
        assert_eq!(rules[0].percent, Some(15.0));
    }
}
