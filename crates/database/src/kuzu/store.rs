use crate::graph::{GraphCounts, GraphNode, GraphRelationship, GraphStore};
use crate::kuzu::config::DatabaseConfig;
use crate::kuzu::connection::{KuzuConnection, scalar_from};
use crate::kuzu::database::open_database;
use crate::kuzu::schema::{
    ID_COLUMN, node_tables_for, quote_identifier, relationship_tables_for,
};
use crate::kuzu::types::{DatabaseError, TableKind};
use kuzu::{Database, LogicalType, Value};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// [`GraphStore`] backed by an embedded Kuzu database.
///
/// Each node label maps to its own node table keyed by the application id,
/// and each relationship type to a relationship table declared over every
/// label pair it connects. The schema is derived from the data on write and
/// dropped on clear, so a clear/write cycle fully replaces the graph.
///
/// The underlying database is closed when the store is dropped.
pub struct KuzuGraphStore {
    database: Database,
}

impl KuzuGraphStore {
    pub fn open(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let database = open_database(config)?;
        let store = Self { database };
        // Surface connection problems at open time rather than on first use.
        store.connection()?;
        Ok(store)
    }

    fn connection(&self) -> Result<KuzuConnection<'_>, DatabaseError> {
        KuzuConnection::new(&self.database)
    }

    fn tables_of_kind(
        connection: &KuzuConnection,
        wanted: impl Fn(&TableKind) -> bool,
    ) -> Result<Vec<String>, DatabaseError> {
        let mut names: Vec<String> = connection
            .get_tables()?
            .into_iter()
            .filter(|(_, kind)| wanted(kind))
            .map(|(name, _)| name)
            .collect();
        names.sort();
        Ok(names)
    }
}

fn is_relationship_table(kind: &TableKind) -> bool {
    matches!(kind, TableKind::Rel | TableKind::RelGroup)
}

fn string_param(value: Option<&String>) -> Value {
    match value {
        Some(value) => Value::String(value.clone()),
        None => Value::Null(LogicalType::String),
    }
}

/// Split kuzu properties into the application id and the remaining string properties.
fn split_properties(properties: &[(String, Value)]) -> (Option<String>, BTreeMap<String, String>) {
    let mut id = None;
    let mut rest = BTreeMap::new();
    for (name, value) in properties {
        if name.starts_with('_') {
            continue;
        }
        if let Value::String(value) = value {
            if name == ID_COLUMN {
                id = Some(value.clone());
            } else {
                rest.insert(name.clone(), value.clone());
            }
        }
    }
    (id, rest)
}

fn node_from_value(value: &Value) -> Option<GraphNode> {
    let Value::Node(node) = value else {
        return None;
    };
    let (id, properties) = split_properties(node.get_properties());
    Some(GraphNode {
        id: id?,
        label: node.get_label_name().clone(),
        properties,
    })
}

impl GraphStore for KuzuGraphStore {
    fn clear(&mut self) -> Result<(), DatabaseError> {
        let connection = self.connection()?;

        // Relationship tables reference node tables and must go first. The
        // listing is refreshed after each drop since dropping a group can
        // take dependent tables with it.
        let mut dropped = 0;
        while let Some(table) = Self::tables_of_kind(&connection, is_relationship_table)?
            .into_iter()
            .next()
        {
            connection.drop_table(&table)?;
            dropped += 1;
        }

        for table in Self::tables_of_kind(&connection, |kind| *kind == TableKind::Node)? {
            connection.drop_table(&table)?;
            dropped += 1;
        }

        info!("Cleared graph store, dropped {dropped} tables");
        Ok(())
    }

    fn write_nodes(&mut self, nodes: &[GraphNode]) -> Result<usize, DatabaseError> {
        if nodes.is_empty() {
            return Ok(0);
        }

        let connection = self.connection()?;
        let tables = node_tables_for(nodes);
        for table in &tables {
            connection.execute_ddl(&table.create_statement()?)?;
        }

        let mut by_label: HashMap<&str, Vec<&GraphNode>> = HashMap::new();
        for node in nodes {
            by_label.entry(node.label.as_str()).or_default().push(node);
        }

        let written = connection.transaction(|conn| {
            let mut written = 0;
            for table in &tables {
                let query = table.insert_statement()?;
                let mut prepared = conn.prepare(&query)?;
                let columns: Vec<&str> = table
                    .property_columns()
                    .map(|column| column.name.as_str())
                    .collect();
                let param_names: Vec<String> =
                    (0..columns.len()).map(|index| format!("p{index}")).collect();

                for node in by_label.get(table.name.as_str()).into_iter().flatten() {
                    let mut params = vec![("id", Value::String(node.id.clone()))];
                    for (column, param) in columns.iter().zip(&param_names) {
                        params.push((param.as_str(), string_param(node.properties.get(*column))));
                    }
                    conn.execute(&mut prepared, params)?;
                    written += 1;
                }
                debug!("Wrote nodes into table {}", table.name);
            }
            Ok(written)
        })?;

        info!("Wrote {written} nodes into {} node tables", tables.len());
        Ok(written)
    }

    fn write_relationships(
        &mut self,
        relationships: &[GraphRelationship],
    ) -> Result<usize, DatabaseError> {
        if relationships.is_empty() {
            return Ok(0);
        }

        let connection = self.connection()?;
        let tables = relationship_tables_for(relationships);
        for table in &tables {
            connection.execute_ddl(&table.create_statement()?)?;
        }

        let mut by_pair: HashMap<(&str, &str, &str), Vec<&GraphRelationship>> = HashMap::new();
        for relationship in relationships {
            by_pair
                .entry((
                    relationship.rel_type.as_str(),
                    relationship.source_label.as_str(),
                    relationship.target_label.as_str(),
                ))
                .or_default()
                .push(relationship);
        }

        let written = connection.transaction(|conn| {
            let mut written = 0;
            for table in &tables {
                let columns: Vec<&str> =
                    table.columns.iter().map(|column| column.name.as_str()).collect();
                let param_names: Vec<String> =
                    (0..columns.len()).map(|index| format!("p{index}")).collect();

                for (from, to) in &table.from_to_pairs {
                    let query = table.insert_statement(from, to)?;
                    let mut prepared = conn.prepare(&query)?;
                    let key = (table.name.as_str(), from.as_str(), to.as_str());

                    for relationship in by_pair.get(&key).into_iter().flatten() {
                        let mut params = vec![
                            ("src", Value::String(relationship.source_id.clone())),
                            ("dst", Value::String(relationship.target_id.clone())),
                        ];
                        for (column, param) in columns.iter().zip(&param_names) {
                            params.push((
                                param.as_str(),
                                string_param(relationship.properties.get(*column)),
                            ));
                        }

                        let mut result = conn.execute(&mut prepared, params)?;
                        if scalar_from(&mut result) != Some(1) {
                            return Err(DatabaseError::MissingEndpoint {
                                rel_type: relationship.rel_type.clone(),
                                label: format!("{from}/{to}"),
                                id: format!("{} -> {}", relationship.source_id, relationship.target_id),
                            });
                        }
                        written += 1;
                    }
                }
                debug!("Wrote relationships into table {}", table.name);
            }
            Ok(written)
        })?;

        info!(
            "Wrote {written} relationships into {} relationship tables",
            tables.len()
        );
        Ok(written)
    }

    fn read_nodes(&self) -> Result<Vec<GraphNode>, DatabaseError> {
        let connection = self.connection()?;
        let mut nodes = Vec::new();

        for table in Self::tables_of_kind(&connection, |kind| *kind == TableKind::Node)? {
            let query = format!("MATCH (n:{}) RETURN n;", quote_identifier(&table)?);
            for row in connection.query(&query)? {
                if let Some(node) = row.first().and_then(node_from_value) {
                    nodes.push(node);
                }
            }
        }

        Ok(nodes)
    }

    fn read_relationships(&self) -> Result<Vec<GraphRelationship>, DatabaseError> {
        let connection = self.connection()?;
        let mut relationships = Vec::new();

        for table in Self::tables_of_kind(&connection, is_relationship_table)? {
            let query = format!(
                "MATCH (a)-[r:{}]->(b) RETURN a, r, b;",
                quote_identifier(&table)?
            );
            for row in connection.query(&query)? {
                let (Some(source), Some(Value::Rel(rel)), Some(target)) = (
                    row.first().and_then(node_from_value),
                    row.get(1),
                    row.get(2).and_then(node_from_value),
                ) else {
                    continue;
                };
                let (_, properties) = split_properties(rel.get_properties());
                relationships.push(GraphRelationship {
                    source_id: source.id,
                    source_label: source.label,
                    target_id: target.id,
                    target_label: target.label,
                    rel_type: rel.get_label_name().clone(),
                    properties,
                });
            }
        }

        Ok(relationships)
    }

    fn counts(&self) -> Result<GraphCounts, DatabaseError> {
        let connection = self.connection()?;
        let mut counts = GraphCounts::default();

        for (table, kind) in connection.get_tables()? {
            let quoted = quote_identifier(&table)?;
            if kind == TableKind::Node {
                let count =
                    connection.scalar(&format!("MATCH (n:{quoted}) RETURN count(n);"))? as usize;
                counts.nodes += count;
                counts.nodes_by_label.insert(table, count);
            } else if is_relationship_table(&kind) {
                let count = connection
                    .scalar(&format!("MATCH ()-[r:{quoted}]->() RETURN count(r);"))?
                    as usize;
                counts.relationships += count;
                counts.relationships_by_type.insert(table, count);
            }
        }

        Ok(counts)
    }
}
