use crate::graph::{GraphNode, GraphRelationship};
use crate::kuzu::types::DatabaseError;
use std::collections::{BTreeMap, BTreeSet};

/// Primary key column every node table carries.
pub const ID_COLUMN: &str = "id";

/// Represents a Kuzu node table definition
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTable {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
}

/// Represents a Kuzu relationship table definition
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipTable {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    pub from_to_pairs: Vec<(String, String)>,
}

/// Represents a column definition in a table
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: KuzuDataType,
    pub is_primary_key: bool,
}

impl ColumnDefinition {
    pub fn string(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: KuzuDataType::String,
            is_primary_key: false,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }
}

/// Kuzu data types
#[derive(Debug, Clone, PartialEq)]
pub enum KuzuDataType {
    String,
}

impl std::fmt::Display for KuzuDataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KuzuDataType::String => write!(f, "STRING"),
        }
    }
}

/// Quote a table or property name for use in a Cypher statement.
///
/// Labels and relationship types come straight from analysis output, so
/// they are always backtick-quoted. Names that cannot be quoted are rejected.
pub fn quote_identifier(name: &str) -> Result<String, DatabaseError> {
    if name.is_empty() || name.contains('`') || name.chars().any(char::is_control) {
        return Err(DatabaseError::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("`{name}`"))
}

/// Whether a table name is a node label or a relationship type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum::Display)]
pub enum TableRole {
    #[strum(serialize = "label")]
    Label,
    #[strum(serialize = "relationship type")]
    RelationshipType,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TableName {
    pub role: TableRole,
    pub name: String,
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:?}", self.role, self.name)
    }
}

/// A label or relationship type that cannot get a table of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableNameProblem {
    /// Empty, or holding a backtick or a control character.
    Unquotable(TableName),
    /// Names that differ only in case. Table names are case-insensitive,
    /// so these would all resolve to one table.
    Collision(Vec<TableName>),
}

impl std::fmt::Display for TableNameProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableNameProblem::Unquotable(name) => {
                write!(f, "{name} is not a valid table name")
            }
            TableNameProblem::Collision(names) => {
                let names: Vec<String> = names.iter().map(TableName::to_string).collect();
                write!(f, "{} share one table", names.join(", "))
            }
        }
    }
}

/// Every reason the given labels and relationship types cannot be laid out
/// as one table each. Empty when they can.
pub fn table_name_problems<'a>(
    labels: impl IntoIterator<Item = &'a str>,
    rel_types: impl IntoIterator<Item = &'a str>,
) -> Vec<TableNameProblem> {
    let names: BTreeSet<TableName> = labels
        .into_iter()
        .map(|name| (TableRole::Label, name))
        .chain(rel_types.into_iter().map(|name| (TableRole::RelationshipType, name)))
        .map(|(role, name)| TableName {
            role,
            name: name.to_string(),
        })
        .collect();

    let mut problems = Vec::new();
    let mut by_key: BTreeMap<String, Vec<TableName>> = BTreeMap::new();
    for name in names {
        if quote_identifier(&name.name).is_err() {
            problems.push(TableNameProblem::Unquotable(name));
            continue;
        }
        by_key.entry(name.name.to_lowercase()).or_default().push(name);
    }
    problems.extend(
        by_key
            .into_values()
            .filter(|group| group.len() > 1)
            .map(TableNameProblem::Collision),
    );
    problems
}

impl NodeTable {
    /// Property columns, i.e. every column but the primary key.
    pub fn property_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.iter().filter(|column| !column.is_primary_key)
    }

    pub fn create_statement(&self) -> Result<String, DatabaseError> {
        let columns = self
            .columns
            .iter()
            .map(|col| {
                let mut col_def = format!("{} {}", quote_identifier(&col.name)?, col.data_type);
                if col.is_primary_key {
                    col_def.push_str(" PRIMARY KEY");
                }
                Ok(col_def)
            })
            .collect::<Result<Vec<_>, DatabaseError>>()?
            .join(", ");

        Ok(format!(
            "CREATE NODE TABLE IF NOT EXISTS {} ({})",
            quote_identifier(&self.name)?,
            columns
        ))
    }

    /// `CREATE` statement binding `$id` and one `$pN` parameter per property column.
    pub fn insert_statement(&self) -> Result<String, DatabaseError> {
        let mut assignments = vec![format!("{}: $id", quote_identifier(ID_COLUMN)?)];
        for (index, column) in self.property_columns().enumerate() {
            assignments.push(format!("{}: $p{index}", quote_identifier(&column.name)?));
        }

        Ok(format!(
            "CREATE (n:{} {{{}}})",
            quote_identifier(&self.name)?,
            assignments.join(", ")
        ))
    }
}

impl RelationshipTable {
    pub fn create_statement(&self) -> Result<String, DatabaseError> {
        if self.from_to_pairs.is_empty() {
            return Err(DatabaseError::InvalidIdentifier(format!(
                "relationship table {} has no FROM/TO pairs",
                self.name
            )));
        }

        let mut clauses = self
            .from_to_pairs
            .iter()
            .map(|(from, to)| {
                Ok(format!(
                    "FROM {} TO {}",
                    quote_identifier(from)?,
                    quote_identifier(to)?
                ))
            })
            .collect::<Result<Vec<_>, DatabaseError>>()?;

        for column in &self.columns {
            clauses.push(format!(
                "{} {}",
                quote_identifier(&column.name)?,
                column.data_type
            ));
        }

        Ok(format!(
            "CREATE REL TABLE IF NOT EXISTS {} ({})",
            quote_identifier(&self.name)?,
            clauses.join(", ")
        ))
    }

    /// `MATCH ... CREATE` statement for one (source label, target label) pair.
    ///
    /// Binds `$src`, `$dst` and one `$pN` per property column and returns
    /// the number of relationships created.
    pub fn insert_statement(
        &self,
        source_label: &str,
        target_label: &str,
    ) -> Result<String, DatabaseError> {
        let id = quote_identifier(ID_COLUMN)?;
        let properties = self
            .columns
            .iter()
            .enumerate()
            .map(|(index, column)| Ok(format!("{}: $p{index}", quote_identifier(&column.name)?)))
            .collect::<Result<Vec<_>, DatabaseError>>()?;
        let properties = if properties.is_empty() {
            String::new()
        } else {
            format!(" {{{}}}", properties.join(", "))
        };

        Ok(format!(
            "MATCH (a:{} {{{id}: $src}}), (b:{} {{{id}: $dst}}) CREATE (a)-[r:{}{}]->(b) RETURN count(r)",
            quote_identifier(source_label)?,
            quote_identifier(target_label)?,
            quote_identifier(&self.name)?,
            properties
        ))
    }
}

/// Derive one node table per label, with a column for every property key seen on that label.
pub fn node_tables_for(nodes: &[GraphNode]) -> Vec<NodeTable> {
    let mut keys_by_label: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for node in nodes {
        let keys = keys_by_label.entry(node.label.as_str()).or_default();
        keys.extend(
            node.properties
                .keys()
                .map(String::as_str)
                .filter(|key| *key != ID_COLUMN),
        );
    }

    keys_by_label
        .into_iter()
        .map(|(label, keys)| {
            let mut columns = vec![ColumnDefinition::string(ID_COLUMN).primary_key()];
            columns.extend(keys.into_iter().map(ColumnDefinition::string));
            NodeTable {
                name: label.to_string(),
                columns,
            }
        })
        .collect()
}

/// Derive one relationship table per type, declaring every label pair it connects.
pub fn relationship_tables_for(relationships: &[GraphRelationship]) -> Vec<RelationshipTable> {
    let mut by_type: BTreeMap<&str, (BTreeSet<(&str, &str)>, BTreeSet<&str>)> = BTreeMap::new();
    for relationship in relationships {
        let (pairs, keys) = by_type.entry(relationship.rel_type.as_str()).or_default();
        pairs.insert((
            relationship.source_label.as_str(),
            relationship.target_label.as_str(),
        ));
        keys.extend(relationship.properties.keys().map(String::as_str));
    }

    by_type
        .into_iter()
        .map(|(rel_type, (pairs, keys))| RelationshipTable {
            name: rel_type.to_string(),
            columns: keys.into_iter().map(ColumnDefinition::string).collect(),
            from_to_pairs: pairs
                .into_iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        })
        .collect()
}
