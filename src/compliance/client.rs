use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::UploaderConfig;

use super::mock;
use super::types::{
    AiInsights, CheckFilters, ComplianceCheck, ComplianceData, FrameworkMetrics, ProviderData,
    ScanRequest, ScanResult,
};

const COMPLIANCE_PREFIX: &str = "/api/v1/compliance";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request to {path} failed: {source}")]
    Request {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{path} returned status {status}")]
    Status { path: String, status: StatusCode },

    #[error("Could not decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Thin JSON client for the compliance backend.
#[derive(Clone)]
pub struct ComplianceClient {
    client: reqwest::Client,
    base_url: String,
}

impl ComplianceClient {
    pub fn new(config: &UploaderConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self::with_client(client, &config.api_base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: format!("{}{}", base_url.trim_end_matches('/'), COMPLIANCE_PREFIX),
        }
    }

    /// Dashboard summary; demo data when the backend is unavailable.
    pub async fn dashboard_data(&self) -> ComplianceData {
        match self.get_json("/dashboard", &[]).await {
            Ok(data) => data,
            Err(e) => {
                warn!("Compliance API not available, using mock data: {}", e);
                mock::compliance_data()
            }
        }
    }

    /// AI recommendations; demo data when the backend is unavailable.
    pub async fn ai_insights(&self) -> AiInsights {
        match self.get_json("/ai-insights", &[]).await {
            Ok(insights) => insights,
            Err(e) => {
                warn!("AI insights API not available, using mock data: {}", e);
                mock::ai_insights()
            }
        }
    }

    pub async fn compliance_checks(
        &self,
        filters: &CheckFilters,
    ) -> Result<Vec<ComplianceCheck>, ApiError> {
        self.get_json("/checks", &filters.query_pairs()).await
    }

    pub async fn perform_scan(&self, request: &ScanRequest) -> Result<ScanResult, ApiError> {
        self.post_json("/scan", request).await
    }

    pub async fn scan_results(&self, scan_id: &str) -> Result<ScanResult, ApiError> {
        self.get_json(&format!("/scan/{}", scan_id), &[]).await
    }

    pub async fn framework_metrics(&self, framework: &str) -> Result<FrameworkMetrics, ApiError> {
        self.get_json(&format!("/frameworks/{}/metrics", framework), &[])
            .await
    }

    pub async fn provider_data(&self, provider: &str) -> Result<ProviderData, ApiError> {
        self.get_json(&format!("/providers/{}", provider), &[]).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);
        let request = self.client.get(&url).query(query);
        Self::decode(path, request).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);
        let request = self.client.post(&url).json(body);
        Self::decode(path, request).await
    }

    async fn decode<T: DeserializeOwned>(
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|source| ApiError::Request {
            path: path.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                path: path.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(|source| ApiError::Request {
            path: path.to_string(),
            source,
        })?;

        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            path: path.to_string(),
            source,
        })
    }
}
