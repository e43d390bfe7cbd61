use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    Passing,
    Failing,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Completed,
    Running,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceCheck {
    pub id: String,
    pub framework: String,
    pub provider: String,
    pub severity: Severity,
    pub status: CheckStatus,
    pub risk_score: f64,
    pub description: String,
    pub last_checked: String,
    pub ai_summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderStats {
    pub total: u32,
    pub critical: u32,
}

/// Dashboard summary returned by `/dashboard`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceData {
    pub total_checks: u32,
    pub compliant: u32,
    pub non_compliant: u32,
    pub critical_count: u32,
    pub framework_scores: BTreeMap<String, f64>,
    pub provider_stats: BTreeMap<String, ProviderStats>,
    pub recent_violations: Vec<ComplianceCheck>,
}

impl ComplianceData {
    pub fn compliance_rate(&self) -> f64 {
        if self.total_checks == 0 {
            0.0
        } else {
            self.compliant as f64 / self.total_checks as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightSummary {
    pub total_violations: u32,
    pub critical_violations: u32,
    pub frameworks_affected: u32,
    pub last_updated: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Severity,
    pub description: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiInsights {
    pub summary: InsightSummary,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanRequest {
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub scan_id: String,
    pub status: ScanStatus,
    pub results: Vec<ComplianceCheck>,
    pub started_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkMetrics {
    pub total_checks: u32,
    pub passing: u32,
    pub failing: u32,
    pub average_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderData {
    pub total_resources: u32,
    pub compliant_resources: u32,
    pub critical_issues: u32,
    pub recent_scans: Vec<ComplianceCheck>,
}

/// Optional filters for `/checks`. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckFilters {
    pub framework: Option<String>,
    pub provider: Option<String>,
    pub severity: Option<String>,
}

impl CheckFilters {
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("framework", self.framework.as_deref()),
            ("provider", self.provider.as_deref()),
            ("severity", self.severity.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
    }
}
