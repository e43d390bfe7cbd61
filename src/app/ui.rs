use super::state::BatchSummary;
use super::ComplianceUploader;
use crate::upload::{ItemId, StatusKind, UploadItem};
use crate::utils::color::{accent, severity_color, status_color};
use crate::utils::file_size::FileSizeUtils;
use eframe::egui::{self, Color32, RichText};

/// Button presses collected during a frame and applied after drawing.
enum UiAction {
    SelectFiles,
    AddFolder,
    Upload,
    RetryFailed,
    ClearAll,
    Remove(ItemId),
    OpenLocation(String),
    RefreshDashboard,
}

impl ComplianceUploader {
    pub fn render(&mut self, ctx: &egui::Context) {
        let mut actions = Vec::new();

        egui::SidePanel::right("compliance_panel")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.render_compliance(ui, &mut actions);
                    ui.add_space(16.0);
                    ui.separator();
                    self.render_budget(ui);
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(12.0);
                ui.vertical_centered(|ui| {
                    ui.heading("Compliance Document Upload");
                    ui.add_space(5.0);
                    ui.label(
                        RichText::new("Upload compliance documents, reports, and configuration files")
                            .color(ui.visuals().text_color().gamma_multiply(0.7)),
                    );
                });

                ui.add_space(16.0);
                self.render_drop_area(ui, &mut actions);

                if !self.orchestrator.is_empty() {
                    ui.add_space(16.0);
                    self.render_file_list(ui, &mut actions);
                }

                if !self.state.notices.is_empty() {
                    ui.add_space(12.0);
                    self.render_notices(ui);
                }
            });
        });

        for action in actions {
            match action {
                UiAction::SelectFiles => self.select_files(),
                UiAction::AddFolder => self.add_folder(),
                UiAction::Upload => self.start_upload(),
                UiAction::RetryFailed => self.retry_failed(),
                UiAction::ClearAll => self.clear_all(),
                UiAction::Remove(id) => self.remove_item(id),
                UiAction::OpenLocation(url) => {
                    if let Err(e) = open::that(&url) {
                        tracing::warn!("Could not open {}: {}", url, e);
                    }
                }
                UiAction::RefreshDashboard => self.refresh_dashboard(),
            }
        }
    }

    fn render_drop_area(&self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        let validator = self.orchestrator.validator();
        ui.group(|ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(8.0);
                ui.label(RichText::new("Drag and drop files here, or select them").strong());
                ui.label(
                    RichText::new(format!(
                        "Supported formats: {} • Max size: {}MB • Max files: {}",
                        validator.accepted_types().join(", "),
                        validator.max_file_size_mb(),
                        validator.max_files()
                    ))
                    .small(),
                );
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("📄 Select Files").clicked() {
                        actions.push(UiAction::SelectFiles);
                    }
                    if ui.button("📁 Add Folder").clicked() {
                        actions.push(UiAction::AddFolder);
                    }
                });
                ui.add_space(8.0);
            });
        });
    }

    fn render_file_list(&mut self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        let summary = BatchSummary::from_items(self.orchestrator.items());
        let max_files = self.orchestrator.validator().max_files();

        ui.horizontal(|ui| {
            ui.label(RichText::new(format!("Files ({}/{})", summary.total, max_files)).strong());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("🗑 Clear All").clicked() {
                    actions.push(UiAction::ClearAll);
                }
                if summary.failed > 0
                    && ui
                        .button(format!("🔄 Retry Failed ({})", summary.failed))
                        .clicked()
                {
                    actions.push(UiAction::RetryFailed);
                }
            });
        });

        if summary.finished() > 0 {
            ui.horizontal(|ui| {
                if summary.successful > 0 {
                    ui.colored_label(
                        status_color(StatusKind::Success),
                        format!("{} Uploaded", summary.successful),
                    );
                }
                if summary.failed > 0 {
                    ui.colored_label(
                        status_color(StatusKind::Error),
                        format!("{} Failed", summary.failed),
                    );
                }
                if summary.pending > 0 {
                    ui.colored_label(
                        status_color(StatusKind::Pending),
                        format!("{} Pending", summary.pending),
                    );
                }
            });

            let progress_bar = egui::ProgressBar::new(summary.progress_fraction())
                .show_percentage()
                .animate(self.orchestrator.is_uploading())
                .fill(accent());
            ui.add(progress_bar);
            ui.label(RichText::new(summary.status_text()).small());
        }

        ui.add_space(8.0);
        if ui
            .button(if self.state.show_details {
                "Hide Details"
            } else {
                "Show Details"
            })
            .clicked()
        {
            self.state.show_details = !self.state.show_details;
        }

        if self.state.show_details {
            egui::Frame::none()
                .fill(ui.style().visuals.extreme_bg_color)
                .inner_margin(8.0)
                .show(ui, |ui| {
                    for item in self.orchestrator.items() {
                        Self::render_item(ui, item, actions);
                        ui.add_space(4.0);
                    }
                });
        }

        if summary.pending > 0 {
            ui.add_space(12.0);
            ui.vertical_centered(|ui| {
                let plural = if summary.pending > 1 { "s" } else { "" };
                let label = if self.orchestrator.is_uploading() {
                    format!("⏳ Uploading {} file{}...", summary.uploading, plural)
                } else {
                    format!("📤 Upload {} file{}", summary.pending, plural)
                };
                let button = egui::Button::new(label).min_size(egui::vec2(220.0, 36.0));
                if ui
                    .add_enabled(!self.orchestrator.is_uploading(), button)
                    .clicked()
                {
                    actions.push(UiAction::Upload);
                }
            });
        }
    }

    fn render_item(ui: &mut egui::Ui, item: &UploadItem, actions: &mut Vec<UiAction>) {
        let kind = item.kind();
        ui.horizontal(|ui| {
            ui.label(file_icon(item.name()));
            ui.vertical(|ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(item.name()).strong());
                    ui.colored_label(status_color(kind), kind.label());
                    if ui.small_button("✖").on_hover_text("Remove").clicked() {
                        actions.push(UiAction::Remove(item.id()));
                    }
                });

                let mut detail = FileSizeUtils::format_size(item.size());
                if kind == StatusKind::Uploading {
                    detail.push_str(&format!(" • {}%", item.progress()));
                }
                ui.label(RichText::new(detail).small());

                if kind == StatusKind::Uploading {
                    ui.add(
                        egui::ProgressBar::new(item.progress() as f32 / 100.0)
                            .desired_width(240.0)
                            .fill(accent()),
                    );
                }

                if let Some(error) = item.error() {
                    ui.colored_label(status_color(StatusKind::Error), error);
                }

                if let Some(location) = item.result_location() {
                    let link = ui.add(
                        egui::Label::new(
                            RichText::new("Upload completed successfully")
                                .color(status_color(StatusKind::Success)),
                        )
                        .sense(egui::Sense::click()),
                    );
                    if link.on_hover_text(location.as_str()).clicked() {
                        actions.push(UiAction::OpenLocation(location.as_str().to_string()));
                    }
                }
            });
        });
    }

    fn render_notices(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            for notice in &self.state.notices {
                let color = if notice.is_error() {
                    status_color(StatusKind::Error)
                } else {
                    status_color(StatusKind::Success)
                };
                ui.colored_label(color, notice.text());
            }
            if ui.small_button("Dismiss").clicked() {
                self.state.clear_notices();
            }
        });
    }

    fn render_compliance(&self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        ui.horizontal(|ui| {
            ui.heading("Compliance");
            if ui.small_button("⟳").on_hover_text("Refresh").clicked() {
                actions.push(UiAction::RefreshDashboard);
            }
        });

        let Some(dashboard) = &self.state.dashboard else {
            ui.spinner();
            return;
        };

        ui.label(format!(
            "{:.1}% compliant ({}/{} checks)",
            dashboard.compliance_rate(),
            dashboard.compliant,
            dashboard.total_checks
        ));
        ui.colored_label(
            Color32::from_rgb(220, 50, 50),
            format!("{} critical issues", dashboard.critical_count),
        );

        ui.add_space(8.0);
        egui::Grid::new("framework_scores").striped(true).show(ui, |ui| {
            for (framework, score) in &dashboard.framework_scores {
                ui.label(framework.as_str());
                ui.add(egui::ProgressBar::new((*score / 100.0) as f32).text(format!("{:.1}", score)));
                ui.end_row();
            }
        });

        ui.add_space(8.0);
        ui.label(RichText::new("Recent violations").strong());
        for violation in &dashboard.recent_violations {
            ui.horizontal(|ui| {
                ui.colored_label(
                    severity_color(violation.severity),
                    format!("{:?}", violation.severity),
                );
                ui.label(format!("{} / {}", violation.framework, violation.provider));
            })
            .response
            .on_hover_text(violation.ai_summary.as_str());
            ui.label(RichText::new(violation.description.as_str()).small());
        }

        if let Some(insights) = &self.state.insights {
            ui.add_space(8.0);
            ui.label(RichText::new("Recommendations").strong());
            for recommendation in &insights.recommendations {
                ui.colored_label(
                    severity_color(recommendation.priority),
                    recommendation.description.as_str(),
                )
                .on_hover_text(recommendation.action.as_str());
            }
        }
    }

    fn render_budget(&mut self, ui: &mut egui::Ui) {
        ui.heading("Budget");
        ui.add(
            egui::Slider::new(&mut self.state.budget, 50_000.0..=1_000_000.0)
                .step_by(10_000.0)
                .prefix("$"),
        );

        let plan = self.budget_plan();
        egui::Grid::new("budget_allocations").striped(true).show(ui, |ui| {
            for allocation in &plan.allocations {
                ui.label(allocation.control.label())
                    .on_hover_text(allocation.justification);
                ui.label(format!("${:.0}", allocation.amount));
                ui.end_row();
            }
        });
        ui.label(format!("ROI: {:.0}%", plan.roi * 100.0));
        ui.label(format!("Risk reduction: {:.0}%", plan.risk_reduction * 100.0));
    }
}

fn file_icon(name: &str) -> &'static str {
    let extension = name.rsplit('.').next().unwrap_or_default().to_lowercase();
    match extension.as_str() {
        "pdf" => "📕",
        "csv" | "xlsx" | "xls" => "📊",
        "jpg" | "jpeg" | "png" | "gif" => "🖼",
        _ => "📄",
    }
}
