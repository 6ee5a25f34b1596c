use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The payload is not a well-formed analysis result.
    #[error("{}", schema_message(.source, .analyzer_message))]
    Schema {
        source: serde_json::Error,
        /// Message reported by the analyzer when it answered with an error document.
        analyzer_message: Option<String>,
    },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid archive {path}: {reason}")]
    InvalidArchive { path: PathBuf, reason: String },
    #[error("Failed to build archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("Analyzer responded with status {status}: {body}")]
    Http {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Failed to reach analyzer: {0}")]
    Transport(#[from] reqwest::Error),
}

fn schema_message(source: &serde_json::Error, analyzer_message: &Option<String>) -> String {
    match analyzer_message {
        Some(message) => format!("Malformed analysis result ({source}); analyzer said: {message}"),
        None => format!("Malformed analysis result: {source}"),
    }
}

impl AnalysisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AnalysisError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_schema_error(&self) -> bool {
        matches!(self, AnalysisError::Schema { .. })
    }
}
