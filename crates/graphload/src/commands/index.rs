use crate::cli::EmbedderArg;
use crate::config::Resolved;
use analysis::AnalysisResult;
use anyhow::{Context, Result, bail};
use embeddings::{
    DEFAULT_DIMENSION, Embedder, EmbeddingIndexer, FastEmbedder, HASHING_MODEL, HashingEmbedder,
    MINILM_MODEL,
};
use std::path::Path;
use tracing::info;

pub fn open_embedder(
    kind: EmbedderArg,
    dimension: Option<usize>,
    config: &Resolved,
) -> Result<Box<dyn Embedder>> {
    match kind {
        EmbedderArg::Hashing => Ok(Box::new(HashingEmbedder::new(
            dimension.unwrap_or(DEFAULT_DIMENSION),
        ))),
        EmbedderArg::Fastembed => {
            if dimension.is_some() {
                bail!("--dimension only applies to the hashing embedder");
            }
            let embedder = FastEmbedder::new(&config.model_cache)
                .context("Failed to load the embedding model; use --embedder hashing to index offline")?;
            Ok(Box::new(embedder))
        }
    }
}

/// The embedder an index was built with.
pub fn embedder_for_model(model: &str, dimension: usize, config: &Resolved) -> Result<Box<dyn Embedder>> {
    match model {
        HASHING_MODEL => open_embedder(EmbedderArg::Hashing, Some(dimension), config),
        MINILM_MODEL => open_embedder(EmbedderArg::Fastembed, None, config),
        other => bail!("Index was built with unknown embedding model {other:?}"),
    }
}

pub fn run(
    input: &Path,
    out: &Path,
    labels: &[String],
    embedder: Box<dyn Embedder>,
) -> Result<()> {
    let result = AnalysisResult::from_path(input)
        .with_context(|| format!("Failed to read analysis result {}", input.display()))?;

    let model = embedder.model().to_string();
    let mut indexer = EmbeddingIndexer::new(embedder);
    let indexed = indexer.build(&result, labels)?;
    indexer.index().save(out)?;

    if labels.is_empty() {
        info!("Indexed {indexed} nodes with {model} into {}", out.display());
    } else {
        info!(
            "Indexed {indexed} nodes labelled {} with {model} into {}",
            labels.join(", "),
            out.display()
        );
    }
    Ok(())
}
