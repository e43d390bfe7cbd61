mod state;
mod ui;

use std::path::PathBuf;
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;

use eframe::{egui, App};
use ignore::Walk;
use rfd::FileDialog;
use tokio::runtime::Runtime;
use tracing::{info, warn};

use crate::budget::{self, BudgetPlan, Threat, ThreatLandscape};
use crate::compliance::ComplianceClient;
use crate::config::UploaderConfig;
use crate::upload::{FileSource, ItemId, Transport, UploadCallbacks, UploadOrchestrator, Validator};
pub use state::{BatchSummary, HostState, Notice};

pub struct ComplianceUploader {
    runtime: Runtime,
    orchestrator: UploadOrchestrator,
    client: ComplianceClient,
    threats: Vec<Threat>,
    state: HostState,
}

impl ComplianceUploader {
    pub fn new(
        config: &UploaderConfig,
        runtime: Runtime,
        transport: Arc<dyn Transport>,
        client: ComplianceClient,
    ) -> Self {
        let (notice_sender, notice_receiver) = std_mpsc::channel();
        let error_sender = notice_sender.clone();

        let callbacks = UploadCallbacks::new()
            .on_upload_error(move |message| {
                let _ = error_sender.send(Notice::Error(message.to_string()));
            })
            .on_upload_complete(move |items| {
                let summary = BatchSummary::from_items(items);
                let _ = notice_sender.send(Notice::Completed {
                    total: summary.total,
                    successful: summary.successful,
                    failed: summary.failed,
                });
            });

        let orchestrator = UploadOrchestrator::new(
            Validator::new(config),
            transport,
            runtime.handle().clone(),
        )
        .with_callbacks(callbacks);

        let mut app = Self {
            runtime,
            orchestrator,
            client,
            threats: budget::demo_threats(),
            state: HostState {
                notice_receiver: Some(notice_receiver),
                ..HostState::default()
            },
        };
        app.refresh_dashboard();
        app
    }

    pub fn select_files(&mut self) {
        let extensions: Vec<String> = self
            .orchestrator
            .validator()
            .accepted_types()
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_string())
            .collect();

        if let Some(paths) = FileDialog::new()
            .add_filter("Compliance documents", &extensions)
            .pick_files()
        {
            self.admit_paths(paths);
        }
    }

    /// Queues every supported file under a folder, honouring `.gitignore`.
    pub fn add_folder(&mut self) {
        let Some(folder) = FileDialog::new().pick_folder() else {
            return;
        };
        info!("Scanning folder {}", folder.display());

        let validator = self.orchestrator.validator();
        let paths: Vec<PathBuf> = Walk::new(&folder)
            .flatten()
            .map(|entry| entry.into_path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map_or(false, |name| validator.accepts_type(name))
            })
            .collect();

        if paths.is_empty() {
            self.state
                .notices
                .push(Notice::Error(format!("No supported files in {}", folder.display())));
            return;
        }
        self.admit_paths(paths);
    }

    pub fn admit_paths(&mut self, paths: impl IntoIterator<Item = PathBuf>) {
        let mut sources = Vec::new();
        for path in paths {
            match FileSource::from_path(&path) {
                Ok(source) => sources.push(source),
                Err(e) => {
                    warn!("Cannot read {}: {}", path.display(), e);
                    self.state
                        .notices
                        .push(Notice::Error(format!("Cannot read {}: {}", path.display(), e)));
                }
            }
        }
        self.orchestrator.admit(sources);
    }

    pub fn start_upload(&mut self) {
        self.state.clear_notices();
        self.orchestrator.upload_all();
    }

    pub fn retry_failed(&mut self) {
        self.orchestrator.retry_failed();
    }

    pub fn clear_all(&mut self) {
        self.orchestrator.clear_all();
        self.state.clear_notices();
    }

    pub fn remove_item(&mut self, id: ItemId) {
        self.orchestrator.remove_item(id);
    }

    pub fn refresh_dashboard(&mut self) {
        let client = self.client.clone();
        let (sender, receiver) = std_mpsc::channel();
        self.state.dashboard_receiver = Some(receiver);

        self.runtime.spawn(async move {
            let dashboard = client.dashboard_data().await;
            let insights = client.ai_insights().await;
            let _ = sender.send((dashboard, insights));
        });
    }

    pub fn budget_plan(&self) -> BudgetPlan {
        budget::optimize_budget(
            self.state.budget,
            &ThreatLandscape::from_threats(&self.threats),
        )
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .collect()
        });
        if !dropped.is_empty() {
            self.admit_paths(dropped);
        }

        if self.orchestrator.poll() > 0 {
            ctx.request_repaint();
        }

        if let Some(receiver) = &self.state.notice_receiver {
            while let Ok(notice) = receiver.try_recv() {
                self.state.notices.push(notice);
            }
        }

        if let Some(receiver) = &self.state.dashboard_receiver {
            if let Ok((dashboard, insights)) = receiver.try_recv() {
                self.state.dashboard = Some(dashboard);
                self.state.insights = Some(insights);
                self.state.dashboard_receiver = None;
                ctx.request_repaint();
            }
        }

        if self.orchestrator.is_uploading() || self.state.dashboard_receiver.is_some() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

impl App for ComplianceUploader {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state(ctx);
        self.render(ctx);
    }
}
