use kuzu::SystemConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings used when opening a Kuzu database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Kuzu database file. Created on first open.
    pub database_path: PathBuf,
    /// Buffer pool size in bytes.
    pub buffer_pool_size: Option<usize>,
    pub enable_compression: Option<bool>,
    /// Open without write access. A missing database is then an error.
    pub read_only: Option<bool>,
    /// Upper bound on the database size in bytes, unbounded when unset.
    pub max_db_size: Option<usize>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("graph.kuzu"),
            buffer_pool_size: Some(1024 * 1024 * 1024),
            enable_compression: Some(true),
            read_only: Some(false),
            max_db_size: None,
        }
    }
}

impl DatabaseConfig {
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            ..Default::default()
        }
    }

    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_pool_size = Some(size);
        self
    }

    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.enable_compression = Some(enabled);
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = Some(true);
        self
    }

    pub fn with_max_size(mut self, size: usize) -> Self {
        self.max_db_size = Some(size);
        self
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only.unwrap_or(false)
    }

    pub fn fmt_kuzu_database_config(&self) -> SystemConfig {
        let mut system_config = SystemConfig::default();

        if let Some(buffer_size) = self.buffer_pool_size {
            system_config = system_config.buffer_pool_size(buffer_size as u64);
        }

        if let Some(compression) = self.enable_compression {
            system_config = system_config.enable_compression(compression);
        }

        if let Some(read_only) = self.read_only {
            system_config = system_config.read_only(read_only);
        }

        if let Some(max_size) = self.max_db_size {
            system_config = system_config.max_db_size(max_size as u64);
        }
        system_config
    }
}
