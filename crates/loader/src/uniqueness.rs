use analysis::Node;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// A node id that occurs more than once in a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateId {
    pub id: String,
    pub occurrences: usize,
}

/// Every id that occurs more than once, listed once in first-seen order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Duplicate node ids: {}", format_duplicates(.duplicates))]
pub struct DuplicateNodeIds {
    pub duplicates: Vec<DuplicateId>,
}

impl DuplicateNodeIds {
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.duplicates.iter().map(|d| d.id.as_str())
    }
}

fn format_duplicates(duplicates: &[DuplicateId]) -> String {
    duplicates
        .iter()
        .map(DuplicateId::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for DuplicateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} (x{})", self.id, self.occurrences)
    }
}

/// Check that no two nodes share an id. Pure; touches no store.
pub fn check_unique_ids(nodes: &[Node]) -> Result<(), DuplicateNodeIds> {
    let mut seen: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
    let mut first_seen: Vec<&str> = Vec::new();

    for node in nodes {
        let count = seen.entry(node.id.as_str()).or_insert(0);
        if *count == 0 {
            first_seen.push(node.id.as_str());
        }
        *count += 1;
    }

    let duplicates: Vec<DuplicateId> = first_seen
        .into_iter()
        .filter(|id| seen[id] > 1)
        .map(|id| DuplicateId {
            id: id.to_string(),
            occurrences: seen[id],
        })
        .collect();

    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(DuplicateNodeIds { duplicates })
    }
}
