use crate::kuzu::schema::quote_identifier;
use crate::kuzu::types::{DatabaseError, TableKind};

use kuzu::{Connection, Database};
use std::str::FromStr;
use tracing::{debug, warn};

pub struct KuzuConnection<'a> {
    connection: Connection<'a>,
}

impl<'a> KuzuConnection<'a> {
    pub fn new(database: &'a Database) -> Result<Self, DatabaseError> {
        let connection =
            Connection::new(database).map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;
        Ok(Self { connection })
    }

    pub fn query(&self, query: &str) -> Result<kuzu::QueryResult<'_>, DatabaseError> {
        debug!("Executing query: {}", query);
        self.connection
            .query(query)
            .map_err(|e| DatabaseError::QueryExecutionError {
                query: query.to_string(),
                error: e,
            })
    }

    pub fn prepare(&self, query: &str) -> Result<kuzu::PreparedStatement, DatabaseError> {
        self.connection
            .prepare(query)
            .map_err(|e| DatabaseError::QueryExecutionError {
                query: query.to_string(),
                error: e,
            })
    }

    /// Execute a prepared statement with parameters
    pub fn execute(
        &self,
        statement: &mut kuzu::PreparedStatement,
        params: Vec<(&str, kuzu::Value)>,
    ) -> Result<kuzu::QueryResult<'_>, DatabaseError> {
        self.connection
            .execute(statement, params)
            .map_err(DatabaseError::Kuzu)
    }

    pub fn execute_ddl(&self, query: &str) -> Result<(), DatabaseError> {
        debug!("Executing DDL: {}", query);

        let mut result = self.query(query)?;

        // Consume the result to ensure the query executed
        while result.next().is_some() {}

        Ok(())
    }

    /// Run `f` inside an explicit transaction, rolling back if it fails.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&KuzuConnection<'a>) -> Result<T, DatabaseError>,
    ) -> Result<T, DatabaseError> {
        self.execute_ddl("BEGIN TRANSACTION;")?;
        match f(self) {
            Ok(value) => {
                self.execute_ddl("COMMIT;")?;
                Ok(value)
            }
            Err(error) => {
                if let Err(rollback_error) = self.execute_ddl("ROLLBACK;") {
                    warn!("Failed to roll back transaction: {rollback_error}");
                }
                Err(error)
            }
        }
    }

    /// Run a query that yields a single integer in its first column.
    pub fn scalar(&self, query: &str) -> Result<u64, DatabaseError> {
        let mut result = self.query(query)?;
        scalar_from(&mut result).ok_or_else(|| DatabaseError::QueryExecutionError {
            query: query.to_string(),
            error: kuzu::Error::FailedQuery("expected a single integer result".to_string()),
        })
    }

    pub fn get_tables(&self) -> Result<Vec<(String, TableKind)>, DatabaseError> {
        let result = self.query("CALL SHOW_TABLES() RETURN name, type;")?;
        let mut tables = Vec::new();

        for row in result {
            if let (Some(kuzu::Value::String(name)), Some(kuzu::Value::String(kind))) =
                (row.first(), row.get(1))
            {
                let kind = TableKind::from_str(kind).unwrap_or(TableKind::Other(kind.clone()));
                tables.push((name.clone(), kind));
            }
        }

        Ok(tables)
    }

    pub fn drop_table(&self, table_name: &str) -> Result<(), DatabaseError> {
        self.execute_ddl(&format!("DROP TABLE {};", quote_identifier(table_name)?))
    }
}

pub(crate) fn scalar_from(result: &mut kuzu::QueryResult) -> Option<u64> {
    result.next()?.first().and_then(|value| match value {
        kuzu::Value::Int64(v) => Some(*v as u64),
        kuzu::Value::UInt64(v) => Some(*v),
        kuzu::Value::UInt32(v) => Some(*v as u64),
        _ => None,
    })
}
