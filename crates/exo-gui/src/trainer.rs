//! Interactive trainer panel: dataset pickers, the run button and the result
//! view for the analysis lifecycle.

use crate::plots::PlotCache;
use eframe::egui::{self, Color32, RichText};
use exo_lib::render::{save_plot_to, PlotKind, ResultView};
use exo_lib::sample::{write_sample_file, SAMPLE_FILE_NAME};
use exo_lib::{AnalysisController, AnalysisPhase, MissionSlot, SubmitOutcome};
use rfd::FileDialog;
use std::path::Path;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct Trainer {
    controller: AnalysisController,
    plots: PlotCache,
    /// Inline feedback for selection and download actions.
    notice: Option<Notice>,
}

enum Notice {
    Info(String),
    Error(String),
}

impl Trainer {
    pub fn new(controller: AnalysisController) -> Self {
        Self {
            controller,
            plots: PlotCache::default(),
            notice: None,
        }
    }

    /// Apply finished network work. Keeps the UI ticking while a request is in
    /// flight so the completion is picked up without user input.
    pub fn poll(&mut self, ctx: &egui::Context) {
        if self.controller.poll() && self.controller.phase() != AnalysisPhase::Succeeded {
            self.plots.clear();
        }
        if self.controller.is_busy() {
            ctx.request_repaint_after(POLL_INTERVAL);
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        egui::Frame::group(ui.style())
            .inner_margin(egui::Margin::same(16.0))
            .show(ui, |ui| {
                let input_width = ui.available_width() / 3.0;
                ui.horizontal_top(|ui| {
                    ui.allocate_ui(egui::vec2(input_width, 0.0), |ui| {
                        ui.vertical(|ui| self.input_panel(ui));
                    });
                    ui.separator();
                    ui.allocate_ui(egui::vec2(ui.available_width(), 0.0), |ui| {
                        ui.vertical(|ui| self.status_panel(ui));
                    });
                });
                if self.controller.phase() == AnalysisPhase::Succeeded {
                    self.insights(ui);
                }
            });
    }

    fn input_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("INPUT DATA");
        ui.separator();
        let busy = self.controller.is_busy();
        for slot in MissionSlot::all() {
            self.file_row(ui, slot, busy);
        }
        ui.add_space(12.0);

        let label = if busy { "Analyzing..." } else { "Run Prediction" };
        let button = egui::Button::new(RichText::new(label).strong()).min_size(egui::vec2(
            ui.available_width(),
            32.0,
        ));
        if ui.add_enabled(self.controller.can_submit(), button).clicked() {
            self.run_prediction();
        }

        ui.add_space(8.0);
        if ui.small_button("Download sample CSV").clicked() {
            self.download_sample();
        }
        match &self.notice {
            Some(Notice::Info(text)) => {
                ui.small(text.as_str());
            }
            Some(Notice::Error(text)) => {
                ui.colored_label(Color32::LIGHT_RED, text.as_str());
            }
            None => {}
        }
    }

    fn file_row(&mut self, ui: &mut egui::Ui, slot: MissionSlot, busy: bool) {
        ui.horizontal(|ui| {
            ui.label(slot.label());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let selected = self.controller.selection().get(slot).map(|f| f.name.clone());
                let label = if selected.is_some() { "Change" } else { "Upload" };
                if ui.add_enabled(!busy, egui::Button::new(label)).clicked() {
                    if let Some(path) = FileDialog::new().add_filter("CSV", &["csv"]).pick_file() {
                        self.pick_file(slot, &path);
                    }
                }
                if let Some(name) = selected {
                    ui.colored_label(Color32::LIGHT_GREEN, "Uploaded")
                        .on_hover_text(name);
                }
            });
        });
    }

    fn pick_file(&mut self, slot: MissionSlot, path: &Path) {
        match self.controller.select_path(slot, path) {
            Ok(()) => {
                self.notice = None;
            }
            Err(err) => {
                log::info!("selection for {} rejected: {err}", slot.field_name());
                self.notice = Some(Notice::Error(err.to_string()));
            }
        }
    }

    fn run_prediction(&mut self) {
        self.notice = None;
        match self.controller.submit() {
            SubmitOutcome::Dispatched => self.plots.clear(),
            SubmitOutcome::Rejected(err) => log::info!("run rejected: {err}"),
            SubmitOutcome::Ignored => {}
        }
    }

    fn status_panel(&mut self, ui: &mut egui::Ui) {
        let phase = self.controller.phase();
        if let Some(message) = self.controller.error_message() {
            placeholder(ui, Color32::from_rgb(0x7f, 0x1d, 0x1d), |ui| {
                ui.label(RichText::new("Analysis Failed").size(20.0).strong());
                ui.colored_label(Color32::from_rgb(0xfc, 0xa5, 0xa5), message);
            });
        }
        match phase {
            AnalysisPhase::Submitting | AnalysisPhase::Validating => {
                placeholder(ui, Color32::from_gray(30), |ui| {
                    ui.spinner();
                    ui.label(
                        RichText::new("Analyzing the Cosmos...")
                            .size(20.0)
                            .strong()
                            .color(Color32::LIGHT_BLUE),
                    );
                    ui.label("Training models and generating insights.");
                });
            }
            AnalysisPhase::Succeeded => {
                if let Some(result) = self.controller.result() {
                    metrics(ui, &ResultView::from_result(result));
                }
            }
            AnalysisPhase::Idle | AnalysisPhase::Failed => {
                if self.controller.error().is_none() {
                    placeholder(ui, Color32::from_gray(30), |ui| {
                        ui.label(
                            RichText::new("Awaiting Analysis")
                                .size(20.0)
                                .strong()
                                .color(Color32::GRAY),
                        );
                        ui.label("Upload datasets and run prediction to see results.");
                    });
                }
            }
        }
    }

    fn insights(&mut self, ui: &mut egui::Ui) {
        let run_id = self.controller.run_id();
        let Some(result) = self.controller.result() else {
            return;
        };
        ui.separator();
        ui.vertical_centered(|ui| ui.heading("Model Insights"));
        let plots = self.plots.ensure(ui.ctx(), run_id, result);
        let mut download = None;
        ui.columns(plots.len().max(1), |columns| {
            for (column, plot) in columns.iter_mut().zip(plots.iter()) {
                column.vertical_centered(|ui| {
                    ui.label(RichText::new(plot.kind.title()).strong());
                    match &plot.texture {
                        Ok(texture) => {
                            ui.add(egui::Image::from_texture(texture).max_width(ui.available_width()));
                        }
                        Err(err) => {
                            ui.colored_label(Color32::LIGHT_RED, err.as_str());
                        }
                    }
                    if ui
                        .add_enabled(plot.texture.is_ok(), egui::Button::new("Download Plot"))
                        .clicked()
                    {
                        download = Some(plot.kind);
                    }
                });
            }
        });
        if let Some(kind) = download {
            self.download_plot(kind);
        }
    }

    fn download_plot(&mut self, kind: PlotKind) {
        let Some(result) = self.controller.result() else {
            return;
        };
        let Some(path) = FileDialog::new()
            .add_filter("PNG", &["png"])
            .set_file_name(kind.file_name())
            .save_file()
        else {
            return;
        };
        self.notice = Some(match save_plot_to(result, kind, &path) {
            Ok(()) => Notice::Info(format!("Saved {}", path.display())),
            Err(err) => Notice::Error(err.to_string()),
        });
    }

    fn download_sample(&mut self) {
        let Some(path) = FileDialog::new()
            .add_filter("CSV", &["csv"])
            .set_file_name(SAMPLE_FILE_NAME)
            .save_file()
        else {
            return;
        };
        self.notice = Some(match write_sample_file(&path) {
            Ok(()) => Notice::Info(format!("Saved {}", path.display())),
            Err(err) => Notice::Error(format!("Could not write sample CSV: {err}")),
        });
    }
}

fn placeholder(ui: &mut egui::Ui, fill: Color32, add_contents: impl FnOnce(&mut egui::Ui)) {
    egui::Frame::group(ui.style())
        .fill(fill)
        .inner_margin(egui::Margin::same(20.0))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.vertical_centered(add_contents);
        });
    ui.add_space(8.0);
}

fn metrics(ui: &mut egui::Ui, view: &ResultView) {
    ui.columns(2, |columns| {
        egui::Frame::group(columns[0].style())
            .fill(Color32::from_rgb(0x14, 0x53, 0x2d))
            .show(&mut columns[0], |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(
                        RichText::new("SYSTEM STATUS")
                            .strong()
                            .color(Color32::LIGHT_GREEN),
                    );
                    ui.label(RichText::new(&view.headline).size(22.0).strong());
                });
            });
        egui::Frame::group(columns[1].style()).show(&mut columns[1], |ui| {
            ui.label(RichText::new("MODEL PERFORMANCE").strong());
            ui.horizontal(|ui| {
                for row in &view.metrics {
                    ui.vertical(|ui| {
                        ui.label(RichText::new(row.label).color(Color32::GRAY));
                        ui.label(RichText::new(&row.value).size(18.0).strong());
                    });
                    ui.add_space(16.0);
                }
            });
        });
    });
}
