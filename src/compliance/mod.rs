mod client;
pub mod mock;
mod types;

pub use client::{ApiError, ComplianceClient};
pub use types::{
    AiInsights, CheckFilters, CheckStatus, ComplianceCheck, ComplianceData, FrameworkMetrics,
    InsightSummary, ProviderData, ProviderStats, Recommendation, ScanRequest, ScanResult,
    ScanStatus, Severity,
};
