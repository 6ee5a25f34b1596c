use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Kuzu error: {0}")]
    Kuzu(#[from] kuzu::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to execute query: {query}. Error: {error}")]
    QueryExecutionError { query: String, error: kuzu::Error },
    #[error("Failed to open database at {path}: {reason}")]
    OpenFailed { path: String, reason: String },
    #[error("Failed to create connection to database: {0}")]
    ConnectionFailed(String),
    #[error("Invalid identifier for table or property: {0:?}")]
    InvalidIdentifier(String),
    #[error("No {label} node with id {id:?} to attach relationship {rel_type} to")]
    MissingEndpoint {
        rel_type: String,
        label: String,
        id: String,
    },
    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Kind of a table as reported by `SHOW_TABLES`.
#[derive(Debug, Clone, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(ascii_case_insensitive)]
pub enum TableKind {
    #[strum(serialize = "NODE")]
    Node,
    #[strum(serialize = "REL")]
    Rel,
    #[strum(serialize = "REL_GROUP")]
    RelGroup,
    #[strum(default)]
    Other(String),
}
