use crate::domain::{
    entities::{RuleOutcome, RuleStatus, ValidationReport},
    error::DomainError,
    rules::{RULES, RuleDef, RuleTarget, find_rule},
};

/// Runs the checklist rule table over generated artifact text.
///
/// Every enabled rule is evaluated, in table order, with no short-circuit:
/// a validator holding N rules always produces reports with N outcomes.
#[derive(Debug, Clone)]
pub struct ArtifactValidator {
    rules: Vec<&'static RuleDef>,
}

impl Default for ArtifactValidator {
    fn default() -> Self {
        Self {
            rules: RULES.iter().collect(),
        }
    }
}

impl ArtifactValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The default table minus the given rule identifiers.
    ///
    /// Unknown identifiers are rejected so a typo in configuration does not
    /// silently leave a rule enabled.
    pub fn without<I, S>(disabled: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let disabled: Vec<S> = disabled.into_iter().collect();
        for id in &disabled {
            if find_rule(id.as_ref()).is_none() {
                return Err(DomainError::UnknownRule {
                    id: id.as_ref().to_owned(),
                });
            }
        }

        Ok(Self {
            rules: RULES
                .iter()
                .filter(|rule| !disabled.iter().any(|id| id.as_ref() == rule.id))
                .collect(),
        })
    }

    pub fn rules(&self) -> &[&'static RuleDef] {
        &self.rules
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Validate a Dockerfile and, optionally, the compose file that builds it.
    ///
    /// Compose rules are reported as [`RuleStatus::Skip`] when no compose
    /// text is supplied.
    pub fn validate(
        &self,
        subject: impl Into<String>,
        dockerfile: &str,
        compose: Option<&str>,
    ) -> ValidationReport {
        let mut report = ValidationReport::new(subject);

        for rule in &self.rules {
            let text = match rule.target {
                RuleTarget::Dockerfile => Some(dockerfile),
                RuleTarget::Compose => compose,
            };

            let (status, message) = match text {
                None => (RuleStatus::Skip, "no compose file supplied".to_owned()),
                Some(text) => match (rule.check)(text) {
                    Ok(()) => (RuleStatus::Pass, rule.description.to_owned()),
                    Err(reason) => (RuleStatus::Fail, reason),
                },
            };

            report.push(RuleOutcome {
                rule_id: rule.id,
                severity: rule.severity,
                status,
                message,
            });
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_has_one_entry_per_rule() {
        let validator = ArtifactValidator::new();
        for text in ["", "FROM alpine\n", "garbage\nUSER root"] {
            let report = validator.validate("Dockerfile", text, Some("services: {}"));
            assert_eq!(report.len(), validator.rule_count());
        }
    }

    #[test]
    fn compose_rules_skip_without_compose() {
        let report = ArtifactValidator::new().validate("Dockerfile", "FROM alpine:3.19\n", None);
        let skipped: Vec<_> = report
            .outcomes
            .iter()
            .filter(|o| o.status == RuleStatus::Skip)
            .map(|o| o.rule_id)
            .collect();
        assert_eq!(
            skipped,
            vec![
                "compose.valid-yaml",
                "compose.healthcheck",
                "compose.no-hardcoded-secrets",
                "compose.resource-limits"
            ]
        );
    }

    #[test]
    fn outcomes_follow_table_order() {
        let report = ArtifactValidator::new().validate("Dockerfile", "", None);
        let ids: Vec<_> = report.outcomes.iter().map(|o| o.rule_id).collect();
        let table: Vec<_> = RULES.iter().map(|r| r.id).collect();
        assert_eq!(ids, table);
    }

    #[test]
    fn disabled_rules_are_removed() {
        let validator =
            ArtifactValidator::without(["dockerfile.multi-stage", "compose.resource-limits"])
                .unwrap();
        assert_eq!(validator.rule_count(), RULES.len() - 2);
        let report = validator.validate("Dockerfile", "FROM a:1\n", None);
        assert!(report.outcome("dockerfile.multi-stage").is_none());
        assert_eq!(report.len(), RULES.len() - 2);
    }

    #[test]
    fn unknown_disabled_rule_is_error() {
        let err = ArtifactValidator::without(["dockerfile.nope"]).unwrap_err();
        assert_eq!(
            err,
            DomainError::UnknownRule {
                id: "dockerfile.nope".into()
            }
        );
    }

    #[test]
    fn root_user_fails_and_app_user_passes() {
        let validator = ArtifactValidator::new();
        let root = validator.validate("Dockerfile", "FROM alpine:3.19\nUSER root\n", None);
        let app = validator.validate("Dockerfile", "FROM alpine:3.19\nUSER appuser\n", None);

        let status = |r: &ValidationReport| r.outcome("dockerfile.non-root-user").map(|o| o.status);
        assert_eq!(status(&root), Some(RuleStatus::Fail));
        assert_eq!(status(&app), Some(RuleStatus::Pass));
    }
}
