pub mod graph;
pub mod kuzu;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use graph::{GraphCounts, GraphNode, GraphRelationship, GraphStore};
pub use kuzu::types::DatabaseError;
