//! Client-side pieces of the ExoStacker exoplanet classifier: mission file
//! selection, the multipart upload client, the analysis lifecycle controller
//! and the view model used to render backend results.

pub mod client;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod multipart;
pub mod render;
pub mod result;
pub mod sample;
pub mod selection;

pub use client::{AnalysisBackend, UploadClient};
pub use config::ClientConfig;
pub use error::{AnalysisError, RemoteError, ValidationError};
pub use lifecycle::{AnalysisController, AnalysisPhase, SubmitOutcome};
pub use result::{AnalysisResult, MetaModelEvaluation};
pub use selection::{MissionSlot, SelectedFile, SelectedFileSet};
