//! Inject rules: admin-seeded task overrides.
//!
//! A rule pins a combine order (amount, optional commission percent) to a
//! specific user at a specific task number. Rules start `new`, must be
//! confirmed before the engine will honor them, and are consumed exactly
//! once when the matching task is generated.

mod errors;
mod manager;
mod models;

pub use errors::{RuleError, RuleResult};
pub use manager::{RuleManager, RuleUpdateOutcome};
pub use models::{AmountSpec, InjectRule, RuleAction, RulePatch, RuleStatus, RuleStatusPatch};
