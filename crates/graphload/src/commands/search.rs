use crate::commands::index::embedder_for_model;
use crate::config::Resolved;
use anyhow::{Context, Result};
use embeddings::{EmbeddingIndexer, VectorIndex};
use std::path::Path;

pub fn run(index_path: &Path, query: &str, top_k: usize, json: bool, config: &Resolved) -> Result<()> {
    let index = VectorIndex::load(index_path)
        .with_context(|| format!("Failed to load index {}", index_path.display()))?;
    let embedder = embedder_for_model(index.model(), index.dimension(), config)?;
    let mut indexer = EmbeddingIndexer::with_index(embedder, index)?;

    let hits = indexer.search(query, top_k)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }
    for hit in hits {
        println!(
            "{:.4}\t{}\t{}\t{}",
            hit.score, hit.metadata.id, hit.metadata.label, hit.metadata.full_name
        );
    }
    Ok(())
}
