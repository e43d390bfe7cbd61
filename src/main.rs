use std::sync::Arc;

use anyhow::{Context, Result};
use compliance_uploader::app::ComplianceUploader;
use compliance_uploader::compliance::ComplianceClient;
use compliance_uploader::config::UploaderConfig;
use compliance_uploader::upload::HttpTransport;
use eframe::CreationContext;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting compliance uploader v{}", env!("CARGO_PKG_VERSION"));

    let config = UploaderConfig::load()?;
    info!("Upload endpoint: {}", config.upload_endpoint);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let transport = HttpTransport::new(&config).context("Failed to build HTTP client")?;
    let client = ComplianceClient::new(&config).context("Failed to build API client")?;

    let app = ComplianceUploader::new(&config, runtime, Arc::new(transport), client);

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([960.0, 680.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Compliance Uploader",
        options,
        Box::new(move |_cc: &CreationContext| Box::new(app)),
    )
    .map_err(|e| anyhow::anyhow!("UI error: {}", e))
}
