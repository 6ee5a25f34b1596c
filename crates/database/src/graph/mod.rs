mod types;

pub use types::{GraphCounts, GraphNode, GraphRelationship};

use crate::kuzu::types::DatabaseError;

/// A persistent property-graph store that can be fully replaced.
///
/// Implementations address nodes by [`GraphNode::id`]. Relationships are
/// only ever written after their endpoint nodes exist.
pub trait GraphStore {
    /// Delete every node and relationship in the target graph.
    ///
    /// Deleting a node also removes its incident relationships.
    fn clear(&mut self) -> Result<(), DatabaseError>;

    /// Persist nodes, returning how many were written.
    fn write_nodes(&mut self, nodes: &[GraphNode]) -> Result<usize, DatabaseError>;

    /// Persist relationships between already written nodes, returning how many were written.
    fn write_relationships(
        &mut self,
        relationships: &[GraphRelationship],
    ) -> Result<usize, DatabaseError>;

    fn read_nodes(&self) -> Result<Vec<GraphNode>, DatabaseError>;

    fn read_relationships(&self) -> Result<Vec<GraphRelationship>, DatabaseError>;

    fn counts(&self) -> Result<GraphCounts, DatabaseError> {
        let nodes = self.read_nodes()?;
        let relationships = self.read_relationships()?;
        Ok(GraphCounts::from_entities(&nodes, &relationships))
    }
}
