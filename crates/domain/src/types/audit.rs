//! Audit runs: a product checked against a set of rules

use serde::{Deserialize, Serialize};

use super::rule::RuleSeverity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditStatus {
    Queued,
    Running,
    Passed,
    Failed,
    Error,
}

impl AuditStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Passed | Self::Failed | Self::Error)
    }
}

/// Start an audit; an empty `rule_ids` audits against every enabled rule
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRequest {
    pub product_id: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rule_ids: Vec<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub document_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditTask {
    pub id: i64,
    pub product_id: i64,
    pub status: AuditStatus,
    #[serde(default)]
    pub passed_count: u32,
    #[serde(default)]
    pub failed_count: u32,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub finished_at: Option<String>,
}

/// Outcome of one rule within an audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFinding {
    pub rule_id: i64,
    #[serde(default)]
    pub rule_name: Option<String>,
    pub passed: bool,
    #[serde(default)]
    pub severity: Option<RuleSeverity>,
    #[serde(default)]
    pub message: Option<String>,
}
