use crate::transform::TransformedGraph;
use database::kuzu::{TableNameProblem, table_name_problems};
use std::collections::BTreeSet;
use thiserror::Error;

/// Labels or relationship types that the store cannot give a table each.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unusable labels or relationship types: {}", format_problems(.problems))]
pub struct InvalidTableNames {
    pub problems: Vec<TableNameProblem>,
}

fn format_problems(problems: &[TableNameProblem]) -> String {
    problems
        .iter()
        .map(TableNameProblem::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Check that every label and relationship type of `graph` maps to a table
/// of its own. Pure; touches no store.
pub fn check_table_names(graph: &TransformedGraph) -> Result<(), InvalidTableNames> {
    let labels: BTreeSet<&str> = graph.nodes.iter().map(|n| n.label.as_str()).collect();
    let rel_types: BTreeSet<&str> = graph
        .relationships
        .iter()
        .map(|r| r.rel_type.as_str())
        .collect();

    let problems = table_name_problems(labels, rel_types);
    if problems.is_empty() {
        Ok(())
    } else {
        Err(InvalidTableNames { problems })
    }
}
