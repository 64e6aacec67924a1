//! View model for a finished analysis plus plot export.

use crate::error::RemoteError;
use crate::result::AnalysisResult;
use base64::{engine::general_purpose, Engine as _};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const NOT_AVAILABLE: &str = "N/A";
const DATA_URL_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlotKind {
    ConfusionMatrix,
    ShapSummary,
}

impl PlotKind {
    pub fn all() -> [PlotKind; 2] {
        [PlotKind::ConfusionMatrix, PlotKind::ShapSummary]
    }

    pub fn title(&self) -> &'static str {
        match self {
            PlotKind::ConfusionMatrix => "Confusion Matrix",
            PlotKind::ShapSummary => "SHAP Feature Impact",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            PlotKind::ConfusionMatrix => "ExoStacker_ConfusionMatrix.png",
            PlotKind::ShapSummary => "ExoStacker_SHAP_Plot.png",
        }
    }

    pub fn payload<'a>(&self, result: &'a AnalysisResult) -> Option<&'a str> {
        match self {
            PlotKind::ConfusionMatrix => result.cm_image.as_deref(),
            PlotKind::ShapSummary => result.shap_image.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricRow {
    pub label: &'static str,
    pub value: String,
}

/// Display-ready strings derived from an [`AnalysisResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultView {
    pub headline: String,
    pub metrics: Vec<MetricRow>,
}

impl ResultView {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let status = result
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("Success");
        let eval = result.meta_model_evaluation.as_ref();
        let metrics = vec![
            MetricRow {
                label: "AUC",
                value: format_metric(eval.and_then(|e| e.auc)),
            },
            MetricRow {
                label: "Precision",
                value: format_metric(eval.and_then(|e| e.precision)),
            },
            MetricRow {
                label: "Recall",
                value: format_metric(eval.and_then(|e| e.recall)),
            },
        ];
        Self {
            headline: format!("{status}: Model Trained"),
            metrics,
        }
    }

    pub fn metric(&self, label: &str) -> Option<&str> {
        self.metrics
            .iter()
            .find(|row| row.label == label)
            .map(|row| row.value.as_str())
    }
}

pub fn format_metric(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Decode a base64 PNG payload, accepting an optional data-URL prefix and
/// embedded whitespace.
pub fn decode_image(payload: &str) -> Result<Vec<u8>, RemoteError> {
    let trimmed = payload.trim();
    let raw = trimmed.strip_prefix(DATA_URL_PREFIX).unwrap_or(trimmed);
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(RemoteError::MalformedResponse("empty image payload".into()));
    }
    general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|err| RemoteError::MalformedResponse(format!("invalid base64 image: {err}")))
}

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("{0} is not part of this result")]
    Missing(&'static str),
    #[error(transparent)]
    Decode(#[from] RemoteError),
    #[error("writing {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
}

pub fn plot_bytes(result: &AnalysisResult, kind: PlotKind) -> Result<Vec<u8>, SaveError> {
    let payload = kind.payload(result).ok_or(SaveError::Missing(kind.title()))?;
    Ok(decode_image(payload)?)
}

/// Write `kind`'s decoded PNG to `path` exactly as the backend encoded it.
pub fn save_plot_to(result: &AnalysisResult, kind: PlotKind, path: &Path) -> Result<(), SaveError> {
    let bytes = plot_bytes(result, kind)?;
    fs::write(path, &bytes).map_err(|source| SaveError::Write {
        path: path.display().to_string(),
        source,
    })?;
    log::info!("saved {} ({} bytes) to {}", kind.title(), bytes.len(), path.display());
    Ok(())
}

/// Save under the fixed download name inside `dir`.
pub fn save_plot(result: &AnalysisResult, kind: PlotKind, dir: &Path) -> Result<PathBuf, SaveError> {
    let path = dir.join(kind.file_name());
    save_plot_to(result, kind, &path)?;
    Ok(path)
}
