//! Embedding index error types.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    /// A vector's length differs from the index or embedder dimension.
    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Model download or ONNX runtime initialization failed.
    #[error("Model initialization failed: {0}")]
    InitFailed(String),

    #[error("Embedding generation failed: {0}")]
    EmbedFailed(String),

    /// An index was built with a different model than the one querying it.
    #[error("Index was built with model {index:?}, not {embedder:?}")]
    ModelMismatch { index: String, embedder: String },

    /// An index file lists the same node twice.
    #[error("Index holds more than one entry for node {0:?}")]
    DuplicateEntry(String),

    /// The embedder returned a different number of vectors than texts.
    #[error("Embedder returned {actual} vectors for {expected} texts")]
    BatchSizeMismatch { expected: usize, actual: usize },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid index file: {0}")]
    Json(#[from] serde_json::Error),
}
