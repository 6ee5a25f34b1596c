use crate::error::EmbeddingError;
use analysis::Node;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Node fields returned with every search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    pub id: String,
    pub label: String,
    pub name: String,
    pub full_name: String,
}

impl From<&Node> for NodeMetadata {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            label: node.label.clone(),
            name: node.name.clone(),
            full_name: node.full_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredNode {
    pub score: f32,
    pub metadata: NodeMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct IndexEntry {
    id: String,
    vector: Vec<f32>,
    metadata: NodeMetadata,
}

/// Brute-force cosine-similarity index keyed by node id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorIndex {
    /// Embedding model the vectors came from.
    model: String,
    dimension: usize,
    entries: Vec<IndexEntry>,
    /// Position of each id in `entries`.
    #[serde(skip)]
    positions: HashMap<String, usize>,
}

impl VectorIndex {
    pub fn new(model: impl Into<String>, dimension: usize) -> Self {
        Self {
            model: model.into(),
            dimension,
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<(), EmbeddingError> {
        if vector.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// Insert or replace the entry for `id`.
    pub fn upsert(
        &mut self,
        id: impl Into<String>,
        vector: Vec<f32>,
        metadata: NodeMetadata,
    ) -> Result<(), EmbeddingError> {
        self.check_dimension(&vector)?;
        let id = id.into();
        match self.positions.get(&id) {
            Some(&position) => {
                let entry = &mut self.entries[position];
                entry.vector = vector;
                entry.metadata = metadata;
            }
            None => {
                self.positions.insert(id.clone(), self.entries.len());
                self.entries.push(IndexEntry {
                    id,
                    vector,
                    metadata,
                });
            }
        }
        Ok(())
    }

    /// The `top_k` entries most similar to `vector`, best first.
    ///
    /// Equal scores are ordered by ascending node id.
    pub fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredNode>, EmbeddingError> {
        self.check_dimension(vector)?;

        let mut scored: Vec<(f32, &IndexEntry)> = self
            .entries
            .iter()
            .map(|entry| (cosine_similarity(vector, &entry.vector), entry))
            .collect();
        scored.sort_by(|(a_score, a), (b_score, b)| {
            b_score.total_cmp(a_score).then_with(|| a.id.cmp(&b.id))
        });

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(score, entry)| ScoredNode {
                score,
                metadata: entry.metadata.clone(),
            })
            .collect())
    }

    pub fn save(&self, path: &Path) -> Result<(), EmbeddingError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| EmbeddingError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json).map_err(|source| EmbeddingError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Saved {} vectors to {}", self.len(), path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, EmbeddingError> {
        let json = std::fs::read_to_string(path).map_err(|source| EmbeddingError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut index: Self = serde_json::from_str(&json)?;
        for (position, entry) in index.entries.iter().enumerate() {
            if entry.vector.len() != index.dimension {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: index.dimension,
                    actual: entry.vector.len(),
                });
            }
            if index.positions.insert(entry.id.clone(), position).is_some() {
                return Err(EmbeddingError::DuplicateEntry(entry.id.clone()));
            }
        }
        Ok(index)
    }
}

/// Cosine similarity; zero when either vector has no magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn meta(id: &str) -> NodeMetadata {
        NodeMetadata {
            id: id.to_string(),
            label: "Class".to_string(),
            name: id.to_uppercase(),
            full_name: format!("Demo.{}", id.to_uppercase()),
        }
    }

    fn index() -> VectorIndex {
        let mut index = VectorIndex::new("test", 2);
        index.upsert("b", vec![1.0, 0.0], meta("b")).unwrap();
        index.upsert("a", vec![1.0, 0.0], meta("a")).unwrap();
        index.upsert("c", vec![0.0, 1.0], meta("c")).unwrap();
        index.upsert("d", vec![0.6, 0.8], meta("d")).unwrap();
        index
    }

    #[test]
    fn test_query_orders_by_score_then_id() {
        let hits = index().query(&[1.0, 0.0], 10).unwrap();

        let ids: Vec<&str> = hits.iter().map(|h| h.metadata.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "d", "c"]);
        assert!((hits[0].score - 1.0).abs() < 1e-6);
        assert!((hits[2].score - 0.6).abs() < 1e-6);
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_query_limits_results() {
        assert_eq!(index().query(&[0.0, 1.0], 2).unwrap().len(), 2);
        assert!(index().query(&[0.0, 1.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_upsert_replaces_existing_id() {
        let mut index = index();
        index.upsert("c", vec![1.0, 0.0], meta("c")).unwrap();

        assert_eq!(index.len(), 4);
        let hits = index.query(&[1.0, 0.0], 3).unwrap();
        assert_eq!(
            hits.iter().map(|h| h.metadata.id.as_str()).collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        let mut index = VectorIndex::new("test", 3);
        assert!(matches!(
            index.upsert("x", vec![1.0], meta("x")),
            Err(EmbeddingError::DimensionMismatch {
                expected: 3,
                actual: 1
            })
        ));
        assert!(index.query(&[1.0, 2.0], 1).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index/vectors.json");
        let original = index();

        original.save(&path).unwrap();
        let loaded = VectorIndex::load(&path).unwrap();

        assert_eq!(loaded, original);
        assert_eq!(loaded.model(), "test");
        assert_eq!(loaded.query(&[0.0, 1.0], 1).unwrap()[0].metadata.full_name, "Demo.C");
    }

    #[test]
    fn test_upsert_after_load_replaces_in_place() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vectors.json");
        index().save(&path).unwrap();

        let mut loaded = VectorIndex::load(&path).unwrap();
        loaded.upsert("a", vec![0.0, 1.0], meta("a")).unwrap();

        assert_eq!(loaded.len(), 4);
        let hits = loaded.query(&[0.0, 1.0], 2).unwrap();
        assert_eq!(
            hits.iter().map(|h| h.metadata.id.as_str()).collect::<Vec<_>>(),
            vec!["a", "c"]
        );
    }

    #[test]
    fn test_many_upserts_keep_one_entry_per_id() {
        let mut index = VectorIndex::new("test", 2);
        for round in 0..3 {
            for i in 0..1000 {
                let id = format!("n{i}");
                index.upsert(&id, vec![round as f32, 1.0], meta(&id)).unwrap();
            }
        }

        assert_eq!(index.len(), 1000);
    }

    #[test]
    fn test_load_rejects_duplicate_ids() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vectors.json");
        let entry = serde_json::json!({
            "id": "a",
            "vector": [1.0, 0.0],
            "metadata": { "id": "a", "label": "Class", "name": "A", "fullName": "Demo.A" }
        });
        let file = serde_json::json!({ "model": "test", "dimension": 2, "entries": [entry, entry] });
        std::fs::write(&path, file.to_string()).unwrap();

        assert!(matches!(
            VectorIndex::load(&path),
            Err(EmbeddingError::DuplicateEntry(id)) if id == "a"
        ));
    }

    #[test]
    fn test_load_rejects_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vectors.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(VectorIndex::load(&path), Err(EmbeddingError::Json(_))));
    }

    #[test]
    fn test_zero_vector_scores_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}
