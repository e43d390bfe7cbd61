use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, StatusCode};
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::config::UploaderConfig;

use super::error::TransferError;
use super::types::{FileSource, ResultLocation};

/// Moves one file to the server. Implementations report progress through
/// the sink and resolve exactly once.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        source: FileSource,
        progress: ProgressSink,
    ) -> BoxFuture<'static, Result<ResultLocation, TransferError>>;
}

/// Forwards percentages to a listener, dropping repeats and regressions.
#[derive(Clone)]
pub struct ProgressSink {
    listener: Arc<dyn Fn(u8) + Send + Sync>,
    last: Arc<AtomicU8>,
}

impl ProgressSink {
    pub fn new(listener: impl Fn(u8) + Send + Sync + 'static) -> Self {
        Self {
            listener: Arc::new(listener),
            last: Arc::new(AtomicU8::new(0)),
        }
    }

    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    pub fn report_percent(&self, percent: u8) {
        let percent = percent.min(100);
        let previous = self.last.fetch_max(percent, Ordering::SeqCst);
        if percent > previous {
            (self.listener)(percent);
        }
    }

    pub fn report_bytes(&self, sent: u64, total: u64) {
        if total == 0 {
            return;
        }
        let percent = (sent.min(total) as f64 / total as f64 * 100.0).round() as u8;
        self.report_percent(percent);
    }
}

/// Success body. Servers answer with either `url` or `file_url`.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: Option<String>,
    file_url: Option<String>,
}

impl UploadResponse {
    fn into_location(self) -> Option<ResultLocation> {
        let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());
        non_empty(self.url)
            .or_else(|| non_empty(self.file_url))
            .map(ResultLocation::new)
    }
}

/// Maps a finished HTTP exchange onto the transfer outcome.
pub fn interpret_response(status: StatusCode, body: &str) -> Result<ResultLocation, TransferError> {
    if !status.is_success() {
        let message = if body.trim().is_empty() {
            format!("Upload failed with status {}", status.as_u16())
        } else {
            body.to_string()
        };
        return Err(TransferError::Server {
            status: status.as_u16(),
            message,
        });
    }

    let response: UploadResponse = serde_json::from_str(body)
        .map_err(|e| TransferError::ResponseParse(e.to_string()))?;

    response
        .into_location()
        .ok_or_else(|| TransferError::ResponseParse("missing url".to_string()))
}

/// Multipart POST of each file to the configured endpoint.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    document_type: String,
}

impl HttpTransport {
    pub fn new(config: &UploaderConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self::with_client(
            client,
            config.upload_endpoint.clone(),
            config.document_type.clone(),
        ))
    }

    pub fn with_client(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        document_type: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            document_type: document_type.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn upload(
        self,
        source: FileSource,
        progress: ProgressSink,
    ) -> Result<ResultLocation, TransferError> {
        let file = tokio::fs::File::open(&source.path)
            .await
            .map_err(|e| TransferError::Read(format!("{}: {}", source.name, e)))?;

        let total = source.size;
        let mut sent = 0u64;
        let body = ReaderStream::new(file).map(move |chunk| {
            if let Ok(bytes) = &chunk {
                sent += bytes.len() as u64;
                progress.report_bytes(sent, total);
            }
            chunk
        });

        let part = Part::stream_with_length(Body::wrap_stream(body), total)
            .file_name(source.name.clone());
        let form = Form::new()
            .part("file", part)
            .text("type", self.document_type.clone());

        debug!("POST {} -> {}", source.name, self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;

        interpret_response(status, &body)
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        source: FileSource,
        progress: ProgressSink,
    ) -> BoxFuture<'static, Result<ResultLocation, TransferError>> {
        self.clone().upload(source, progress).boxed()
    }
}
