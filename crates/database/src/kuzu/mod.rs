pub mod config;
pub mod connection;
pub mod database;
pub mod schema;
pub mod store;
pub mod types;

pub use config::DatabaseConfig;
pub use store::KuzuGraphStore;
pub use schema::{TableName, TableNameProblem, TableRole, table_name_problems};
