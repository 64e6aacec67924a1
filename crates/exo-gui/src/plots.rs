use eframe::egui;
use exo_lib::render::{plot_bytes, PlotKind};
use exo_lib::AnalysisResult;

/// Decode PNG bytes into an egui image.
pub fn color_image_from_png(bytes: &[u8]) -> Result<egui::ColorImage, String> {
    let decoded = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    let rgba = decoded.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

pub struct PlotTexture {
    pub kind: PlotKind,
    pub texture: Result<egui::TextureHandle, String>,
}

/// Textures for the currently displayed result, rebuilt when the run changes.
#[derive(Default)]
pub struct PlotCache {
    run_id: Option<u64>,
    plots: Vec<PlotTexture>,
}

impl PlotCache {
    pub fn clear(&mut self) {
        self.run_id = None;
        self.plots.clear();
    }

    pub fn ensure(&mut self, ctx: &egui::Context, run_id: u64, result: &AnalysisResult) -> &[PlotTexture] {
        if self.run_id != Some(run_id) {
            self.plots = PlotKind::all()
                .into_iter()
                .map(|kind| PlotTexture {
                    kind,
                    texture: load_texture(ctx, run_id, kind, result),
                })
                .collect();
            self.run_id = Some(run_id);
        }
        &self.plots
    }
}

fn load_texture(
    ctx: &egui::Context,
    run_id: u64,
    kind: PlotKind,
    result: &AnalysisResult,
) -> Result<egui::TextureHandle, String> {
    let bytes = plot_bytes(result, kind).map_err(|err| err.to_string())?;
    let image = color_image_from_png(&bytes).map_err(|err| {
        log::warn!("{} could not be decoded: {err}", kind.title());
        format!("{} could not be decoded: {err}", kind.title())
    })?;
    Ok(ctx.load_texture(
        format!("run-{run_id}-{}", kind.file_name()),
        image,
        egui::TextureOptions::LINEAR,
    ))
}
