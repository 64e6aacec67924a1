//! Static chrome around the trainer: navigation bar, hero banner, intro and
//! footer.

use eframe::egui::{self, Color32, RichText};

const NOTICE_BLUE: Color32 = Color32::from_rgb(0x0b, 0x33, 0x5a);
const ACCENT_RED: Color32 = Color32::from_rgb(0xfc, 0x3d, 0x21);

const NAV_LINKS: [&str; 2] = ["News & Events", "Multimedia"];

const FOOTER_COLUMNS: [(&str, [&str; 4]); 3] = [
    ("Programs", ["Artemis", "Commercial Space", "ISS", "Deep Space"]),
    ("Resources", ["Data Policy", "Privacy", "Sitemap", "About"]),
    (
        "Exo-Stacker",
        ["The Challenge", "Model Insights", "Source Code", "Contact Team"],
    ),
];

pub fn navbar(ctx: &egui::Context) {
    egui::TopBottomPanel::top("navbar").show(ctx, |ui| {
        egui::Frame::none().fill(NOTICE_BLUE).show(ui, |ui| {
            ui.vertical_centered(|ui| {
                ui.small(
                    RichText::new("Exoplanet candidate classification powered by a remote model backend.")
                        .color(Color32::WHITE),
                );
            });
        });
        ui.horizontal(|ui| {
            ui.label(RichText::new("Explore").strong().size(18.0));
            ui.separator();
            ui.label(RichText::new("EXO-STACKER").strong().color(ACCENT_RED));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(RichText::new("LIVE").strong().color(ACCENT_RED));
                for link in NAV_LINKS.iter().rev() {
                    ui.label(RichText::new(*link).strong());
                }
            });
        });
    });
}

pub fn hero(ui: &mut egui::Ui) {
    egui::Frame::none()
        .fill(Color32::from_gray(40))
        .inner_margin(egui::Margin::symmetric(16.0, 40.0))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.vertical_centered(|ui| {
                ui.label(
                    RichText::new("ARTEMIS PROGRAM")
                        .size(18.0)
                        .color(Color32::LIGHT_GRAY),
                );
                ui.label(
                    RichText::new("Advanced AI model exoplanet detector")
                        .size(40.0)
                        .strong()
                        .color(Color32::WHITE),
                );
                ui.label(
                    RichText::new("Exploring the cosmos for humanity's next great leap.")
                        .size(18.0),
                );
            });
        });
    let (rect, _) = ui.allocate_exact_size(
        egui::vec2(ui.available_width(), 3.0),
        egui::Sense::hover(),
    );
    ui.painter().rect_filled(rect, 0.0, ACCENT_RED);
}

pub fn intro(ui: &mut egui::Ui) {
    ui.add_space(24.0);
    ui.vertical_centered(|ui| {
        ui.label(
            RichText::new("THE LUNAR GATEWAY CHALLENGE")
                .small()
                .strong()
                .color(Color32::GRAY),
        );
        ui.label(RichText::new("Exoplanet Detection System").size(32.0).strong());
        ui.label(
            "An interactive AI-powered tool developed to assist in the classification of \
             exoplanet candidates.",
        );
    });
    ui.add_space(24.0);
}

pub fn footer(ctx: &egui::Context) {
    egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
        ui.add_space(6.0);
        ui.columns(FOOTER_COLUMNS.len(), |columns| {
            for (column, (title, links)) in columns.iter_mut().zip(FOOTER_COLUMNS.iter()) {
                column.label(RichText::new(*title).strong());
                for link in links {
                    column.small(*link);
                }
            }
        });
        ui.add_space(6.0);
    });
}
