use thiserror::Error;

/// Problems with the user's input, caught before any request is issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please provide at least one mission dataset.")]
    NoFilesSelected,
    #[error("{file_name} is not a CSV file; only .csv mission datasets are accepted.")]
    NotCsv { file_name: String },
    #[error("Cannot change the selection while an analysis is running.")]
    SelectionLocked,
    #[error("Could not read {file_name}: {reason}")]
    Unreadable { file_name: String, reason: String },
}

/// Failures reported by, or on the way to, the analysis backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Non-success HTTP status. `message` is the backend's `error` field or a
    /// status-derived fallback.
    #[error("{message}")]
    Status { code: u16, message: String },
    #[error("{0}")]
    Transport(String),
    #[error("Malformed response from analysis backend: {0}")]
    MalformedResponse(String),
}

impl RemoteError {
    pub fn status_fallback(code: u16) -> Self {
        RemoteError::Status {
            code,
            message: format!("Request failed with status code {code}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl AnalysisError {
    pub fn is_validation(&self) -> bool {
        matches!(self, AnalysisError::Validation(_))
    }
}
