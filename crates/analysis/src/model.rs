use crate::error::AnalysisError;
use crate::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// A code entity discovered by the analyzer (file, folder, class, method...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Identifier, unique within one analysis result.
    pub id: String,
    /// Category of the entity, e.g. `File` or `Class`.
    pub label: String,
    pub name: String,
    pub full_name: String,
}

/// A directed, typed relation between two nodes of the same result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactMetadata {
    pub run_id: String,
    pub source_path: String,
    #[serde(with = "timestamp")]
    pub start_time: DateTime<Utc>,
    #[serde(
        default,
        with = "timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<DateTime<Utc>>,
}

/// Audit trail of an analyzer run. Never written to the graph store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisArtifact {
    pub metadata: ArtifactMetadata,
    pub log_entries: Vec<LogEntry>,
}

/// The analyzer's answer for one uploaded codebase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub message: String,
    pub source_path: String,
    #[serde(default)]
    pub discovered_solution: Option<String>,
    pub discovered_projects: Vec<String>,
    pub analyzed_project_count: u64,
    pub collected_triples_count: u64,
    pub deduplicated_triples_count: u64,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub artifact: AnalysisArtifact,
}

impl AnalysisResult {
    pub fn from_slice(payload: &[u8]) -> Result<Self, AnalysisError> {
        serde_json::from_slice(payload).map_err(|source| AnalysisError::Schema {
            analyzer_message: analyzer_message(payload),
            source,
        })
    }

    pub fn from_json_str(payload: &str) -> Result<Self, AnalysisError> {
        Self::from_slice(payload.as_bytes())
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let path = path.as_ref();
        let payload = std::fs::read(path).map_err(|e| AnalysisError::io(path, e))?;
        Self::from_slice(&payload)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Distinct node labels, sorted.
    pub fn labels(&self) -> BTreeSet<&str> {
        self.nodes.iter().map(|node| node.label.as_str()).collect()
    }

    pub fn run_id(&self) -> &str {
        &self.artifact.metadata.run_id
    }
}

/// The analyzer reports some failures as `{ "message": ..., "error": ... }`
/// with a success status. Recover that message for the error report.
fn analyzer_message(payload: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(payload).ok()?;
    let object = value.as_object()?;
    if object.contains_key("nodes") {
        return None;
    }
    object.get("message")?.as_str().map(str::to_string)
}
