use crate::graph::{GraphNode, GraphRelationship, GraphStore};
use crate::kuzu::types::DatabaseError;
use std::collections::HashSet;

/// Store operation a [`MemoryGraphStore`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    Clear,
    WriteNodes,
    WriteRelationships,
}

/// Operations recorded by [`MemoryGraphStore`], in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOperation {
    Clear,
    WriteNodes(usize),
    WriteRelationships(usize),
}

/// In-memory [`GraphStore`] with the same constraints as the Kuzu store:
/// node ids are unique per label and relationships need both endpoints.
#[derive(Debug, Default)]
pub struct MemoryGraphStore {
    pub nodes: Vec<GraphNode>,
    pub relationships: Vec<GraphRelationship>,
    pub operations: Vec<StoreOperation>,
    fail_on: Option<FailurePoint>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_graph(nodes: Vec<GraphNode>, relationships: Vec<GraphRelationship>) -> Self {
        Self {
            nodes,
            relationships,
            ..Default::default()
        }
    }

    pub fn with_failure(mut self, point: FailurePoint) -> Self {
        self.fail_on = Some(point);
        self
    }

    fn check_failure(&self, point: FailurePoint) -> Result<(), DatabaseError> {
        if self.fail_on == Some(point) {
            return Err(DatabaseError::Unavailable(format!(
                "injected failure at {point:?}"
            )));
        }
        Ok(())
    }

    fn contains(&self, label: &str, id: &str) -> bool {
        self.nodes
            .iter()
            .any(|node| node.label == label && node.id == id)
    }
}

impl GraphStore for MemoryGraphStore {
    fn clear(&mut self) -> Result<(), DatabaseError> {
        self.check_failure(FailurePoint::Clear)?;
        self.operations.push(StoreOperation::Clear);
        self.nodes.clear();
        self.relationships.clear();
        Ok(())
    }

    fn write_nodes(&mut self, nodes: &[GraphNode]) -> Result<usize, DatabaseError> {
        self.check_failure(FailurePoint::WriteNodes)?;

        let mut keys: HashSet<(&str, &str)> = self
            .nodes
            .iter()
            .map(|node| (node.label.as_str(), node.id.as_str()))
            .collect();
        for node in nodes {
            if !keys.insert((node.label.as_str(), node.id.as_str())) {
                return Err(DatabaseError::ConstraintViolation(format!(
                    "duplicate primary key {:?} in {}",
                    node.id, node.label
                )));
            }
        }

        self.operations.push(StoreOperation::WriteNodes(nodes.len()));
        self.nodes.extend_from_slice(nodes);
        Ok(nodes.len())
    }

    fn write_relationships(
        &mut self,
        relationships: &[GraphRelationship],
    ) -> Result<usize, DatabaseError> {
        self.check_failure(FailurePoint::WriteRelationships)?;

        for relationship in relationships {
            for (label, id) in [
                (&relationship.source_label, &relationship.source_id),
                (&relationship.target_label, &relationship.target_id),
            ] {
                if !self.contains(label, id) {
                    return Err(DatabaseError::MissingEndpoint {
                        rel_type: relationship.rel_type.clone(),
                        label: label.clone(),
                        id: id.clone(),
                    });
                }
            }
        }

        self.operations
            .push(StoreOperation::WriteRelationships(relationships.len()));
        self.relationships.extend_from_slice(relationships);
        Ok(relationships.len())
    }

    fn read_nodes(&self) -> Result<Vec<GraphNode>, DatabaseError> {
        Ok(self.nodes.clone())
    }

    fn read_relationships(&self) -> Result<Vec<GraphRelationship>, DatabaseError> {
        Ok(self.relationships.clone())
    }
}
