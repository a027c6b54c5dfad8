//! Inject rule data models.

use crate::money::round2;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Order amount specification: a literal value or an inclusive range
///
/// Serialized as the admin-facing string form: `"350"` or `"300-500"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AmountSpec {
    Literal(f64),
    Range(f64, f64),
}

impl AmountSpec {
    /// Resolve the spec to a concrete amount
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            AmountSpec::Literal(v) => round2(v),
            AmountSpec::Range(lo, hi) => round2(rng.random_range(lo..=hi)),
        }
    }
}

impl std::fmt::Display for AmountSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AmountSpec::Literal(v) => write!(f, "{v}"),
            AmountSpec::Range(lo, hi) => write!(f, "{lo}-{hi}"),
        }
    }
}

impl std::str::FromStr for AmountSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some((lo, hi)) = s.split_once('-') {
            let lo: f64 = lo
                .trim()
                .parse()
                .map_err(|_| format!("bad range start in {s:?}"))?;
            let hi: f64 = hi
                .trim()
                .parse()
                .map_err(|_| format!("bad range end in {s:?}"))?;
            if !(lo > 0.0 && hi >= lo) {
                return Err(format!("range must satisfy 0 < min <= max, got {s:?}"));
            }
            return Ok(AmountSpec::Range(lo, hi));
        }
        let v: f64 = s.parse().map_err(|_| format!("bad amount {s:?}"))?;
        if v <= 0.0 {
            return Err(format!("amount must be positive, got {s:?}"));
        }
        Ok(AmountSpec::Literal(v))
    }
}

impl TryFrom<String> for AmountSpec {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<AmountSpec> for String {
    fn from(spec: AmountSpec) -> Self {
        spec.to_string()
    }
}

/// Rule lifecycle status
///
/// Only confirmed rules are consumed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    New,
    Confirmed,
}

/// An admin-seeded task override
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectRule {
    pub id: String,
    pub user_id: String,
    /// 1-based position in the user's daily task sequence
    pub task_no: u32,
    pub amount_spec: AmountSpec,
    /// Commission percent override (e.g. `12.0` for 12%); tier rate when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<f64>,
    pub status: RuleStatus,
    pub created_at: DateTime<Utc>,
}

/// Action carried on a rule update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    /// Arm the rule for consumption
    Confirm,
    /// Mark the rule spent and remove it
    Used,
}

/// Status value accepted on a rule patch
///
/// `used` is a terminal pseudo-status: it removes the rule, same as
/// `action: "used"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatusPatch {
    New,
    Confirmed,
    Used,
}

/// Partial update applied to an existing rule
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulePatch {
    #[serde(default)]
    pub amount_spec: Option<AmountSpec>,
    #[serde(default)]
    pub percent: Option<f64>,
    #[serde(default)]
    pub task_no: Option<u32>,
    #[serde(default)]
    pub action: Option<RuleAction>,
    #[serde(default)]
    pub status: Option<RuleStatusPatch>,
}

impl RulePatch {
    /// Whether the patch spends the rule (`action: used` or `status: used`)
    pub fn marks_used(&self) -> bool {
        matches!(self.action, Some(RuleAction::Used))
            || matches!(self.status, Some(RuleStatusPatch::Used))
    }

    /// The status the patch asks for, once `used` has been handled
    pub fn status_change(&self) -> Option<RuleStatus> {
        if matches!(self.action, Some(RuleAction::Confirm)) {
            return Some(RuleStatus::Confirmed);
        }
        match self.status {
            Some(RuleStatusPatch::Confirmed) => Some(RuleStatus::Confirmed),
            Some(RuleStatusPatch::New) => Some(RuleStatus::New),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_spec_parse() {
        assert_eq!("350".parse::<AmountSpec>().unwrap(), AmountSpec::Literal(350.0));
        assert_eq!(
            "300-500".parse::<AmountSpec>().unwrap(),
            AmountSpec::Range(300.0, 500.0)
        );
        assert_eq!(
            " 12.5 - 20 ".parse::<AmountSpec>().unwrap(),
            AmountSpec::Range(12.5, 20.0)
        );
        assert!("".parse::<AmountSpec>().is_err());
        assert!("-5".parse::<AmountSpec>().is_err());
        assert!("500-300".parse::<AmountSpec>().is_err());
        assert!("abc".parse::<AmountSpec>().is_err());
    }

    #[test]
    fn test_amount_spec_display_roundtrip() {
        for spec in [AmountSpec::Literal(350.0), AmountSpec::Range(300.0, 500.0)] {
            let parsed: AmountSpec = spec.to_string().parse().unwrap();
            assert_eq!(parsed, spec);
        }
    }

    #[test]
    fn test_amount_spec_pick_within_range() {
        let mut rng = rand::rng();
        let spec = AmountSpec::Range(300.0, 500.0);
        for _ in 0..100 {
            let v = spec.pick(&mut rng);
            assert!((300.0..=500.0).contains(&v), "picked {v}");
        }
        assert_eq!(AmountSpec::Literal(42.119).pick(&mut rng), 42.12);
    }

    #[test]
    fn test_amount_spec_json_form() {
        let spec: AmountSpec = serde_json::from_str("\"300-500\"").unwrap();
        assert_eq!(spec, AmountSpec::Range(300.0, 500.0));
        assert_eq!(serde_json::to_string(&spec).unwrap(), "\"300-500\"");
    }
}
