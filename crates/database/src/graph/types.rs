use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A labeled node as it is stored in the graph.
///
/// `id` is the application-chosen identifier. It is distinct from any
/// identifier the store assigns internally and is the only handle the
/// loader uses to address a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub properties: BTreeMap<String, String>,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// A typed, directed relationship between two stored nodes.
///
/// Both endpoint labels are carried alongside the ids so stores that
/// partition nodes by label can locate the endpoints without a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphRelationship {
    pub source_id: String,
    pub source_label: String,
    pub target_id: String,
    pub target_label: String,
    pub rel_type: String,
    pub properties: BTreeMap<String, String>,
}

impl GraphRelationship {
    pub fn new(source: &GraphNode, target: &GraphNode, rel_type: impl Into<String>) -> Self {
        Self {
            source_id: source.id.clone(),
            source_label: source.label.clone(),
            target_id: target.id.clone(),
            target_label: target.label.clone(),
            rel_type: rel_type.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Entity counts of a stored graph, broken down by label and relationship type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphCounts {
    pub nodes: usize,
    pub relationships: usize,
    pub nodes_by_label: BTreeMap<String, usize>,
    pub relationships_by_type: BTreeMap<String, usize>,
}

impl GraphCounts {
    pub fn from_entities(nodes: &[GraphNode], relationships: &[GraphRelationship]) -> Self {
        let mut counts = Self {
            nodes: nodes.len(),
            relationships: relationships.len(),
            ..Default::default()
        };
        for node in nodes {
            *counts.nodes_by_label.entry(node.label.clone()).or_default() += 1;
        }
        for relationship in relationships {
            *counts
                .relationships_by_type
                .entry(relationship.rel_type.clone())
                .or_default() += 1;
        }
        counts
    }

    pub fn is_empty(&self) -> bool {
        self.nodes == 0 && self.relationships == 0
    }
}

impl std::fmt::Display for GraphCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Graph: {} nodes ({} labels), {} relationships ({} types)",
            self.nodes,
            self.nodes_by_label.len(),
            self.relationships,
            self.relationships_by_type.len()
        )
    }
}
