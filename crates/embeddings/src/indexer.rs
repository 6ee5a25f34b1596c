use crate::embedder::Embedder;
use crate::error::EmbeddingError;
use crate::index::{NodeMetadata, ScoredNode, VectorIndex};
use crate::text::{node_text, select_nodes};
use analysis::AnalysisResult;
use tracing::{debug, info};

const BATCH_SIZE: usize = 64;

/// Builds and queries a [`VectorIndex`] over the nodes of an analysis result.
pub struct EmbeddingIndexer<E: Embedder> {
    embedder: E,
    index: VectorIndex,
}

impl<E: Embedder> EmbeddingIndexer<E> {
    pub fn new(embedder: E) -> Self {
        let index = VectorIndex::new(embedder.model(), embedder.dimension());
        Self { embedder, index }
    }

    /// Wrap an existing index, e.g. one loaded from disk. The embedder must
    /// be the model the index was built with.
    pub fn with_index(embedder: E, index: VectorIndex) -> Result<Self, EmbeddingError> {
        if index.model() != embedder.model() {
            return Err(EmbeddingError::ModelMismatch {
                index: index.model().to_string(),
                embedder: embedder.model().to_string(),
            });
        }
        if index.dimension() != embedder.dimension() {
            return Err(EmbeddingError::DimensionMismatch {
                expected: embedder.dimension(),
                actual: index.dimension(),
            });
        }
        Ok(Self { embedder, index })
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn into_index(self) -> VectorIndex {
        self.index
    }

    /// Embed the nodes whose label is in `labels` (all nodes when empty)
    /// and upsert them. Returns the number of nodes indexed.
    pub fn build<S: AsRef<str>>(
        &mut self,
        result: &AnalysisResult,
        labels: &[S],
    ) -> Result<usize, EmbeddingError> {
        let nodes = select_nodes(&result.nodes, labels);
        info!(
            "Embedding {} of {} nodes from run {}",
            nodes.len(),
            result.node_count(),
            result.run_id()
        );

        for batch in nodes.chunks(BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(|node| node_text(node)).collect();
            let vectors = self.embedder.embed_batch(&texts)?;
            if vectors.len() != batch.len() {
                return Err(EmbeddingError::BatchSizeMismatch {
                    expected: batch.len(),
                    actual: vectors.len(),
                });
            }
            for (node, vector) in batch.iter().zip(vectors) {
                self.index
                    .upsert(&node.id, vector, NodeMetadata::from(*node))?;
            }
            debug!("Indexed batch of {}", batch.len());
        }

        Ok(nodes.len())
    }

    pub fn search(&mut self, text: &str, top_k: usize) -> Result<Vec<ScoredNode>, EmbeddingError> {
        let vector = self.embedder.embed(text)?;
        self.index.query(&vector, top_k)
    }
}
