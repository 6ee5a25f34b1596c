use analysis::{AnalysisResult, Edge, Node};
use database::{GraphNode, GraphRelationship};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::warn;

pub const NAME_PROPERTY: &str = "name";
pub const FULL_NAME_PROPERTY: &str = "fullName";
pub const RUN_ID_PROPERTY: &str = "runId";

/// What to do with an edge whose source or target is not a node of the result.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum DanglingEdgePolicy {
    /// Fail the run before the store is touched.
    #[default]
    Reject,
    /// Skip the edge and keep going.
    Drop,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformOptions {
    /// Stamped on every stored node and relationship as `runId` when set.
    pub run_id: Option<String>,
    pub dangling_edges: DanglingEdgePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingEdge {
    pub edge: Edge,
    /// Endpoint ids that name no node.
    pub missing: Vec<String>,
}

impl fmt::Display for DanglingEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -[{}]-> {} (missing {})",
            self.edge.source,
            self.edge.edge_type,
            self.edge.target,
            self.missing.join(", ")
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{} edge(s) reference unknown nodes: {}", .edges.len(), format_edges(.edges))]
pub struct DanglingEdges {
    pub edges: Vec<DanglingEdge>,
}

fn format_edges(edges: &[DanglingEdge]) -> String {
    edges
        .iter()
        .map(DanglingEdge::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Store-ready entities derived from one analysis result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformedGraph {
    pub nodes: Vec<GraphNode>,
    pub relationships: Vec<GraphRelationship>,
    /// Edges skipped under [`DanglingEdgePolicy::Drop`].
    pub dropped_edges: Vec<DanglingEdge>,
}

pub fn transform_node(node: &Node, run_id: Option<&str>) -> GraphNode {
    let mut graph_node = GraphNode::new(&node.id, &node.label)
        .with_property(NAME_PROPERTY, &node.name)
        .with_property(FULL_NAME_PROPERTY, &node.full_name);
    if let Some(run_id) = run_id {
        graph_node = graph_node.with_property(RUN_ID_PROPERTY, run_id);
    }
    graph_node
}

/// Map a result's nodes and edges to graph entities. Pure.
///
/// Node ids are assumed unique; run the uniqueness check first.
pub fn transform(
    result: &AnalysisResult,
    options: &TransformOptions,
) -> Result<TransformedGraph, DanglingEdges> {
    let run_id = options.run_id.as_deref();
    let nodes: Vec<GraphNode> = result
        .nodes
        .iter()
        .map(|node| transform_node(node, run_id))
        .collect();

    let by_id: HashMap<&str, &GraphNode> =
        nodes.iter().map(|node| (node.id.as_str(), node)).collect();

    let mut relationships = Vec::with_capacity(result.edges.len());
    let mut dangling = Vec::new();

    for edge in &result.edges {
        match (by_id.get(edge.source.as_str()), by_id.get(edge.target.as_str())) {
            (Some(source), Some(target)) => {
                let mut relationship = GraphRelationship::new(source, target, &edge.edge_type);
                if let Some(run_id) = run_id {
                    relationship = relationship.with_property(RUN_ID_PROPERTY, run_id);
                }
                relationships.push(relationship);
            }
            (source, target) => {
                let mut missing = Vec::new();
                if source.is_none() {
                    missing.push(edge.source.clone());
                }
                if target.is_none() && !missing.contains(&edge.target) {
                    missing.push(edge.target.clone());
                }
                dangling.push(DanglingEdge {
                    edge: edge.clone(),
                    missing,
                });
            }
        }
    }

    if !dangling.is_empty() {
        match options.dangling_edges {
            DanglingEdgePolicy::Reject => return Err(DanglingEdges { edges: dangling }),
            DanglingEdgePolicy::Drop => {
                for skipped in &dangling {
                    warn!("Skipping edge with unknown endpoint: {skipped}");
                }
            }
        }
    }

    Ok(TransformedGraph {
        nodes,
        relationships,
        dropped_edges: dangling,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;
    use tracing_test::traced_test;

    fn result(nodes: serde_json::Value, edges: serde_json::Value) -> AnalysisResult {
        AnalysisResult::from_json_str(
            &json!({
                "message": "ok",
                "sourcePath": "/src",
                "discoveredProjects": [],
                "analyzedProjectCount": 0,
                "collectedTriplesCount": 0,
                "deduplicatedTriplesCount": 0,
                "nodes": nodes,
                "edges": edges,
                "artifact": {
                    "metadata": { "runId": "run-7", "sourcePath": "/src", "startTime": "2025-05-01T00:00:00Z" },
                    "logEntries": []
                }
            })
            .to_string(),
        )
        .unwrap()
    }

    fn sample() -> AnalysisResult {
        result(
            json!([
                { "id": "f", "label": "File", "name": "A.cs", "fullName": "App/A.cs" },
                { "id": "c", "label": "Class", "name": "A", "fullName": "App.A" },
                { "id": "m", "label": "Method", "name": "Run", "fullName": "App.A.Run" }
            ]),
            json!([
                { "source": "c", "target": "f", "type": "DECLARED_AT" },
                { "source": "c", "target": "m", "type": "HAVE" },
                { "source": "m", "target": "m", "type": "INVOKE" },
                { "source": "c", "target": "m", "type": "HAVE" }
            ]),
        )
    }

    #[test]
    fn test_nodes_keep_id_label_and_names() {
        let graph = transform(&sample(), &TransformOptions::default()).unwrap();

        assert_eq!(graph.nodes.len(), 3);
        let class = &graph.nodes[1];
        assert_eq!(class.id, "c");
        assert_eq!(class.label, "Class");
        assert_eq!(class.property(NAME_PROPERTY), Some("A"));
        assert_eq!(class.property(FULL_NAME_PROPERTY), Some("App.A"));
        assert_eq!(class.property(RUN_ID_PROPERTY), None);
    }

    #[test]
    fn test_edges_resolve_endpoint_labels_and_keep_parallels() {
        let graph = transform(&sample(), &TransformOptions::default()).unwrap();

        assert_eq!(graph.relationships.len(), 4);
        let declared = &graph.relationships[0];
        assert_eq!(
            (declared.source_id.as_str(), declared.source_label.as_str()),
            ("c", "Class")
        );
        assert_eq!(
            (declared.target_id.as_str(), declared.target_label.as_str()),
            ("f", "File")
        );
        assert_eq!(declared.rel_type, "DECLARED_AT");
        assert!(declared.properties.is_empty());
        assert_eq!(graph.relationships[1], graph.relationships[3]);
        assert_eq!(graph.relationships[2].source_id, graph.relationships[2].target_id);
    }

    #[test]
    fn test_run_id_is_attached_when_requested() {
        let options = TransformOptions {
            run_id: Some("run-7".to_string()),
            ..Default::default()
        };

        let graph = transform(&sample(), &options).unwrap();

        assert!(graph.nodes.iter().all(|n| n.property(RUN_ID_PROPERTY) == Some("run-7")));
        assert!(
            graph
                .relationships
                .iter()
                .all(|r| r.properties.get(RUN_ID_PROPERTY).map(String::as_str) == Some("run-7"))
        );
    }

    #[test]
    fn test_dangling_edge_rejected_by_default() {
        let input = result(
            json!([{ "id": "a", "label": "Class", "name": "A", "fullName": "A" }]),
            json!([
                { "source": "a", "target": "zzz", "type": "HAVE" },
                { "source": "ghost", "target": "ghost", "type": "INVOKE" }
            ]),
        );

        let error = transform(&input, &TransformOptions::default()).unwrap_err();

        assert_eq!(error.edges.len(), 2);
        assert_eq!(error.edges[0].missing, vec!["zzz"]);
        assert_eq!(error.edges[1].missing, vec!["ghost"]);
        assert!(error.to_string().starts_with("2 edge(s) reference unknown nodes"));
    }

    #[traced_test]
    #[test]
    fn test_dangling_edge_dropped_with_warning() {
        let input = result(
            json!([{ "id": "a", "label": "Class", "name": "A", "fullName": "A" }]),
            json!([{ "source": "a", "target": "zzz", "type": "HAVE" }]),
        );
        let options = TransformOptions {
            dangling_edges: DanglingEdgePolicy::Drop,
            ..Default::default()
        };

        let graph = transform(&input, &options).unwrap();

        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.relationships.is_empty());
        assert_eq!(graph.dropped_edges.len(), 1);
        assert!(logs_contain("Skipping edge with unknown endpoint"));
    }

    #[test]
    fn test_policy_parses_from_cli_value() {
        assert_eq!(DanglingEdgePolicy::from_str("drop").unwrap(), DanglingEdgePolicy::Drop);
        assert_eq!(DanglingEdgePolicy::Reject.to_string(), "reject");
    }
}
