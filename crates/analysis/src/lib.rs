//! Typed model of the code-analysis result produced by the analyzer service,
//! plus the client used to obtain one.
//!
//! The analyzer accepts a zip archive of a codebase and answers with a JSON
//! document describing discovered entities (nodes) and relations (edges)
//! together with an audit trail of the run (the artifact).

pub mod archive;
pub mod client;
pub mod error;
pub mod model;
mod timestamp;

pub use archive::archive_directory;
pub use client::AnalyzerClient;
pub use error::AnalysisError;
pub use model::{AnalysisArtifact, AnalysisResult, ArtifactMetadata, Edge, LogEntry, Node};
