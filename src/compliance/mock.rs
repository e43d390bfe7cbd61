//! Built-in demo data shown when the compliance backend is unreachable.

use std::collections::BTreeMap;

use chrono::{Duration, Utc};

use super::types::{
    AiInsights, CheckStatus, ComplianceCheck, ComplianceData, InsightSummary, ProviderStats,
    Recommendation, Severity,
};

fn hours_ago(hours: i64) -> String {
    (Utc::now() - Duration::hours(hours)).to_rfc3339()
}

fn violation(
    id: &str,
    framework: &str,
    provider: &str,
    severity: Severity,
    status: CheckStatus,
    risk_score: f64,
    description: &str,
    ai_summary: &str,
    checked_hours_ago: i64,
) -> ComplianceCheck {
    ComplianceCheck {
        id: id.to_string(),
        framework: framework.to_string(),
        provider: provider.to_string(),
        severity,
        status,
        risk_score,
        description: description.to_string(),
        last_checked: hours_ago(checked_hours_ago),
        ai_summary: ai_summary.to_string(),
    }
}

pub fn compliance_data() -> ComplianceData {
    let framework_scores = [
        ("SOC2", 85.2),
        ("GDPR", 92.1),
        ("HIPAA", 78.9),
        ("PCI-DSS", 88.7),
        ("ISO27001", 91.3),
    ]
    .into_iter()
    .map(|(name, score)| (name.to_string(), score))
    .collect();

    let provider_stats: BTreeMap<_, _> = [("AWS", 89, 2), ("Azure", 45, 1), ("GCP", 22, 0)]
        .into_iter()
        .map(|(name, total, critical)| (name.to_string(), ProviderStats { total, critical }))
        .collect();

    ComplianceData {
        total_checks: 156,
        compliant: 142,
        non_compliant: 14,
        critical_count: 3,
        framework_scores,
        provider_stats,
        recent_violations: vec![
            violation(
                "cv-001",
                "SOC2",
                "AWS",
                Severity::Critical,
                CheckStatus::Failing,
                9.2,
                "Unencrypted data transmission detected",
                "Critical security vulnerability: Data transmitted without encryption between services",
                0,
            ),
            violation(
                "cv-002",
                "GDPR",
                "Azure",
                Severity::High,
                CheckStatus::Failing,
                7.8,
                "Personal data retention policy violation",
                "GDPR compliance issue: Personal data retained beyond required period",
                1,
            ),
            violation(
                "cv-003",
                "HIPAA",
                "AWS",
                Severity::Medium,
                CheckStatus::Warning,
                6.1,
                "Access logging configuration incomplete",
                "HIPAA audit trail incomplete: Some access events not being logged",
                2,
            ),
            violation(
                "cv-004",
                "PCI-DSS",
                "GCP",
                Severity::Low,
                CheckStatus::Warning,
                4.3,
                "Network segmentation best practices",
                "PCI-DSS recommendation: Improve network segmentation for card data environment",
                3,
            ),
        ],
    }
}

pub fn ai_insights() -> AiInsights {
    let recommendation = |priority, description: &str, action: &str| Recommendation {
        priority,
        description: description.to_string(),
        action: action.to_string(),
    };

    AiInsights {
        summary: InsightSummary {
            total_violations: 14,
            critical_violations: 3,
            frameworks_affected: 4,
            last_updated: hours_ago(0),
        },
        recommendations: vec![
            recommendation(
                Severity::Critical,
                "Implement end-to-end encryption for all data transmissions",
                "Configure TLS 1.3 for all service communications and enable encryption at rest",
            ),
            recommendation(
                Severity::High,
                "Review and update data retention policies",
                "Implement automated data lifecycle management and purging processes",
            ),
            recommendation(
                Severity::Medium,
                "Enhance access logging and monitoring",
                "Deploy comprehensive audit logging across all systems and enable real-time monitoring",
            ),
        ],
    }
}
