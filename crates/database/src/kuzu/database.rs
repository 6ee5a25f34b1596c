use crate::kuzu::config::DatabaseConfig;
use crate::kuzu::types::DatabaseError;
use kuzu::Database;
use tracing::info;

/// Open (or create) the Kuzu database described by `config`.
pub fn open_database(config: &DatabaseConfig) -> Result<Database, DatabaseError> {
    let database_path = &config.database_path;

    if !config.is_read_only()
        && let Some(parent) = database_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let database = Database::new(database_path, config.fmt_kuzu_database_config()).map_err(
        |e| DatabaseError::OpenFailed {
            path: database_path.display().to_string(),
            reason: e.to_string(),
        },
    )?;

    info!("Opened database at: {}", database_path.display());
    Ok(database)
}
