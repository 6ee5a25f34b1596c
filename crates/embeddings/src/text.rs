use analysis::Node;

/// Nodes whose label is in `labels`; an empty filter keeps every node.
pub fn select_nodes<'a, S: AsRef<str>>(nodes: &'a [Node], labels: &[S]) -> Vec<&'a Node> {
    nodes
        .iter()
        .filter(|node| labels.is_empty() || labels.iter().any(|l| l.as_ref() == node.label))
        .collect()
}

/// Text embedded for a node: label, name and full name, one per line.
pub fn node_text(node: &Node) -> String {
    format!("{}\n{}\n{}", node.label, node.name, node.full_name)
}
