use std::sync::mpsc::Receiver;

use crate::compliance::{AiInsights, ComplianceData};
use crate::upload::{StatusKind, UploadItem};

const DEFAULT_BUDGET: f64 = 250_000.0;

/// Messages pushed by orchestrator callbacks for the window to show.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Error(String),
    Completed {
        total: usize,
        successful: usize,
        failed: usize,
    },
}

impl Notice {
    pub fn text(&self) -> String {
        match self {
            Notice::Error(message) => message.clone(),
            Notice::Completed {
                total,
                successful,
                failed,
            } if *failed == 0 => format!("✅ Uploaded {}/{} files", successful, total),
            Notice::Completed {
                total,
                successful,
                failed,
            } => format!(
                "Upload finished: {}/{} uploaded, {} failed",
                successful, total, failed
            ),
        }
    }

    pub fn is_error(&self) -> bool {
        match self {
            Notice::Error(_) => true,
            Notice::Completed { failed, .. } => *failed > 0,
        }
    }
}

/// Per-status counts of the batch at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub pending: usize,
    pub uploading: usize,
}

impl BatchSummary {
    pub fn from_items(items: &[UploadItem]) -> Self {
        items.iter().fold(
            Self {
                total: items.len(),
                ..Self::default()
            },
            |mut summary, item| {
                match item.kind() {
                    StatusKind::Pending => summary.pending += 1,
                    StatusKind::Uploading => summary.uploading += 1,
                    StatusKind::Success => summary.successful += 1,
                    StatusKind::Error => summary.failed += 1,
                }
                summary
            },
        )
    }

    pub fn finished(&self) -> usize {
        self.successful + self.failed
    }

    pub fn progress_fraction(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.finished() as f32 / self.total as f32
        }
    }

    pub fn status_text(&self) -> String {
        format!(
            "Progress: {}/{} files | ✅ Uploaded: {} | ⏳ Pending: {} | ❌ Failed: {}",
            self.finished(),
            self.total,
            self.successful,
            self.pending,
            self.failed
        )
    }
}

pub struct HostState {
    pub notices: Vec<Notice>,
    pub show_details: bool,
    pub budget: f64,
    pub dashboard: Option<ComplianceData>,
    pub insights: Option<AiInsights>,
    pub notice_receiver: Option<Receiver<Notice>>,
    pub dashboard_receiver: Option<Receiver<(ComplianceData, AiInsights)>>,
}

impl Default for HostState {
    fn default() -> Self {
        Self {
            notices: Vec::new(),
            show_details: true,
            budget: DEFAULT_BUDGET,
            dashboard: None,
            insights: None,
            notice_receiver: None,
            dashboard_receiver: None,
        }
    }
}

impl HostState {
    pub fn error_count(&self) -> usize {
        self.notices.iter().filter(|n| n.is_error()).count()
    }

    pub fn clear_notices(&mut self) {
        self.notices.clear();
    }
}
