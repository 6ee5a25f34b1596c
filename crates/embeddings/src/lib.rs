//! Similarity search over analysis result nodes.
//!
//! Each selected node is rendered as `label\nname\nfullName`, embedded, and
//! stored in a [`VectorIndex`] with its metadata. The index is a flat list
//! searched by cosine similarity and persisted as JSON.
//!
//! With the `fastembed` feature (on by default) texts are embedded by a local
//! sentence-transformer; [`HashingEmbedder`] needs no model and is meant for
//! offline use and tests.

pub mod embedder;
pub mod error;
pub mod index;
pub mod indexer;
#[cfg(feature = "fastembed")]
pub mod onnx;
pub mod text;

pub use embedder::{DEFAULT_DIMENSION, Embedder, HASHING_MODEL, HashingEmbedder};
pub use error::EmbeddingError;
pub use index::{NodeMetadata, ScoredNode, VectorIndex, cosine_similarity};
pub use indexer::EmbeddingIndexer;
#[cfg(feature = "fastembed")]
pub use onnx::{FastEmbedder, MINILM_DIMENSION, MINILM_MODEL};
pub use text::{node_text, select_nodes};
