use serde::Serialize;
use std::fmt;

use crate::domain::value_objects::Severity;

/// Result of evaluating one checklist rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    Pass,
    Fail,
    /// The rule's target text was not supplied. Counts as passed.
    Skip,
}

impl RuleStatus {
    pub fn is_passed(&self) -> bool {
        !matches!(self, Self::Fail)
    }
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Skip => "skip",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleOutcome {
    pub rule_id: &'static str,
    pub severity: Severity,
    pub status: RuleStatus,
    pub message: String,
}

/// Ordered outcomes for one validated Dockerfile (plus compose text).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    /// What was validated, e.g. `api/Dockerfile`.
    pub subject: String,
    pub outcomes: Vec<RuleOutcome>,
}

impl ValidationReport {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: RuleOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn failures(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.outcomes.iter().filter(|o| o.status == RuleStatus::Fail)
    }

    pub fn passed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_passed()).count()
    }

    /// True when no rule failed.
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Most serious severity among failed rules.
    pub fn worst_failure(&self) -> Option<Severity> {
        self.failures().map(|o| o.severity).max()
    }

    pub fn outcome(&self, rule_id: &str) -> Option<&RuleOutcome> {
        self.outcomes.iter().find(|o| o.rule_id == rule_id)
    }
}
