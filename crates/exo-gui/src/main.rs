use eframe::{egui, egui::ViewportBuilder};
use env_logger::Env;
use exo_lib::{AnalysisController, ClientConfig, UploadClient};
use std::sync::Arc;

mod plots;
mod shell;
mod trainer;

use trainer::Trainer;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let (config, config_error) = match ClientConfig::load_from_env() {
        Ok(config) => (config, None),
        Err(err) => {
            log::error!("falling back to default backend configuration: {err}");
            (ClientConfig::default(), Some(err.to_string()))
        }
    };
    let client = UploadClient::new(&config);
    log::info!("analysis endpoint: {}", client.endpoint());

    let native_options = eframe::NativeOptions {
        viewport: ViewportBuilder::default().with_inner_size([1180.0, 820.0]),
        ..Default::default()
    };
    eframe::run_native(
        "ExoStacker: Exoplanet Detection System",
        native_options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(ExoApp::new(
                AnalysisController::new(Arc::new(client)),
                config_error,
            )))
        }),
    )
}

struct ExoApp {
    trainer: Trainer,
    config_error: Option<String>,
}

impl ExoApp {
    fn new(controller: AnalysisController, config_error: Option<String>) -> Self {
        Self {
            trainer: Trainer::new(controller),
            config_error,
        }
    }
}

impl eframe::App for ExoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.trainer.poll(ctx);

        shell::navbar(ctx);
        shell::footer(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                shell::hero(ui);
                if let Some(err) = &self.config_error {
                    ui.colored_label(egui::Color32::LIGHT_RED, format!("Config error: {err}"));
                }
                shell::intro(ui);
                self.trainer.show(ui);
            });
        });
    }
}
