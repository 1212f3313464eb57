use serde::{Deserialize, Serialize};

use super::block::ActivityBlock;
use super::scoring::AssessmentMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleStatus {
    Pass,
    Fail,
    Warning,
}

/// One named check against an authored block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceRule {
    pub id: String,
    pub name: String,
    pub status: RuleStatus,
    pub message: String,
    pub score_impact: u32,
}

impl ComplianceRule {
    pub fn pass(id: &str, name: &str, message: impl Into<String>) -> Self {
        Self::new(id, name, RuleStatus::Pass, message, 0)
    }

    pub fn fail(id: &str, name: &str, message: impl Into<String>, impact: u32) -> Self {
        Self::new(id, name, RuleStatus::Fail, message, impact)
    }

    pub fn warning(id: &str, name: &str, message: impl Into<String>, impact: u32) -> Self {
        Self::new(id, name, RuleStatus::Warning, message, impact)
    }

    fn new(
        id: &str,
        name: &str,
        status: RuleStatus,
        message: impl Into<String>,
        score_impact: u32,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            status,
            message: message.into(),
            score_impact,
        }
    }

    pub fn is_pass(&self) -> bool {
        self.status == RuleStatus::Pass
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResult {
    pub block_id: String,
    pub score: u32,
    pub rules: Vec<ComplianceRule>,
}

impl AuditResult {
    /// Score is 100 minus the impact of every non-passing rule, floored at 0.
    pub fn from_rules(block_id: impl Into<String>, rules: Vec<ComplianceRule>) -> Self {
        let penalty: u32 = rules
            .iter()
            .filter(|rule| !rule.is_pass())
            .map(|rule| rule.score_impact)
            .fold(0u32, u32::saturating_add);
        Self {
            block_id: block_id.into(),
            score: 100u32.saturating_sub(penalty),
            rules,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &ComplianceRule> {
        self.rules
            .iter()
            .filter(|rule| rule.status == RuleStatus::Fail)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseAuditReport {
    pub results: Vec<AuditResult>,
    pub average_score: f64,
    /// Ids of blocks carrying at least one FAIL rule.
    pub blocking_issues: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditBlockRequest {
    pub block: ActivityBlock,
    #[serde(default)]
    pub mode: AssessmentMode,
    #[serde(default)]
    pub block_index: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditCourseRequest {
    pub blocks: Vec<ActivityBlock>,
    #[serde(default)]
    pub mode: AssessmentMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_ignores_passing_rules() {
        let result = AuditResult::from_rules(
            "b",
            vec![
                ComplianceRule::pass("a", "A", "ok"),
                ComplianceRule::warning("b", "B", "meh", 5),
                ComplianceRule::fail("c", "C", "bad", 20),
            ],
        );
        assert_eq!(result.score, 75);
        assert_eq!(result.failures().count(), 1);
    }

    #[test]
    fn score_is_floored_at_zero() {
        let result = AuditResult::from_rules(
            "b",
            vec![
                ComplianceRule::fail("a", "A", "bad", 100),
                ComplianceRule::fail("b", "B", "bad", 30),
            ],
        );
        assert_eq!(result.score, 0);
    }

    #[test]
    fn status_serializes_uppercase() {
        let rule = ComplianceRule::warning("x", "X", "m", 5);
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["status"], "WARNING");
        assert_eq!(json["scoreImpact"], 5);
    }
}
