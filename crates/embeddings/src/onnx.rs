//! Sentence embeddings computed locally with fastembed (ONNX runtime).

use crate::embedder::Embedder;
use crate::error::EmbeddingError;
use fastembed::{EmbeddingModel, TextEmbedding, TextInitOptions};
use std::path::PathBuf;
use tracing::info;

/// Model name recorded in indexes built by [`FastEmbedder`].
pub const MINILM_MODEL: &str = "all-MiniLM-L6-v2";
pub const MINILM_DIMENSION: usize = 384;

/// [`Embedder`] backed by the `AllMiniLML6V2` sentence-transformer.
///
/// The model is downloaded into `cache_dir` on first use.
pub struct FastEmbedder {
    model: TextEmbedding,
}

impl FastEmbedder {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Result<Self, EmbeddingError> {
        let cache_dir = cache_dir.into();
        info!(
            "Loading embedding model {MINILM_MODEL} from {}",
            cache_dir.display()
        );

        let model = TextEmbedding::try_new(
            TextInitOptions::new(EmbeddingModel::AllMiniLML6V2)
                .with_cache_dir(cache_dir)
                .with_show_download_progress(true),
        )
        .map_err(|e| EmbeddingError::InitFailed(e.to_string()))?;

        Ok(Self { model })
    }
}

impl Embedder for FastEmbedder {
    fn model(&self) -> &str {
        MINILM_MODEL
    }

    fn dimension(&self) -> usize {
        MINILM_DIMENSION
    }

    fn embed_batch(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.model
            .embed(texts.to_vec(), None)
            .map_err(|e| EmbeddingError::EmbedFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::cosine_similarity;

    fn embedder() -> FastEmbedder {
        let cache = home::home_dir()
            .map(|home| home.join(".graphload").join("cache").join("fastembed"))
            .unwrap_or_else(|| PathBuf::from(".fastembed_cache"));
        FastEmbedder::new(cache).expect("model should load")
    }

    #[test]
    #[ignore = "downloads the embedding model"]
    fn test_vectors_have_model_dimension() {
        let mut embedder = embedder();

        let vectors = embedder
            .embed_batch(&["Class\nUserService\nApp.UserService".to_string(), String::new()])
            .unwrap();

        assert_eq!(vectors.len(), 2);
        assert!(vectors.iter().all(|v| v.len() == MINILM_DIMENSION));
    }

    #[test]
    #[ignore = "downloads the embedding model"]
    fn test_related_text_scores_higher() {
        let mut embedder = embedder();
        let query = embedder.embed("repository that stores orders").unwrap();
        let related = embedder.embed("Class\nOrderRepository\nApp.Data.OrderRepository").unwrap();
        let unrelated = embedder.embed("File\nlogo.png\nApp/wwwroot/logo.png").unwrap();

        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
    }
}
