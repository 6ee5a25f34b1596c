//! Settings file handling.
//!
//! Values are resolved in order: command-line flag (or its environment
//! variable), then the TOML settings file, then built-in defaults.

use crate::cli::{DanglingArg, EmbedderArg, GlobalArgs, LogFormatArg};
use crate::utils::get_graphload_dir;
use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use database::kuzu::DatabaseConfig;
use loader::DanglingEdgePolicy;
use logging::{LogConfig, LogFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DEFAULT_DATABASE_DIR: &str = "graph.kuzu";
pub const DEFAULT_TOP_K: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub analyzer: AnalyzerSettings,
    pub logging: LoggingSettings,
    pub load: LoadSettings,
    pub index: IndexSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseSettings {
    pub path: Option<PathBuf>,
    pub buffer_pool_size: Option<usize>,
    pub max_db_size: Option<usize>,
    pub enable_compression: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerSettings {
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// `text` or `json`
    pub format: Option<String>,
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadSettings {
    /// `reject` or `drop`
    pub dangling: Option<String>,
    pub attach_run_id: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexSettings {
    pub labels: Vec<String>,
    pub top_k: Option<usize>,
    /// `fastembed` or `hashing`
    pub embedder: Option<String>,
}

impl Settings {
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Read `explicit` if given, else the default file when it exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        let default_path = get_graphload_dir()?.join(CONFIG_FILE_NAME);
        if default_path.exists() {
            Self::load_from(&default_path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Settings after applying command-line overrides.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub database: DatabaseConfig,
    pub endpoint: Option<String>,
    pub log: LogConfig,
    pub dangling: DanglingEdgePolicy,
    pub attach_run_id: bool,
    pub index_labels: Vec<String>,
    pub embedder: EmbedderArg,
    pub top_k: usize,
    /// Where embedding models are downloaded to.
    pub model_cache: PathBuf,
}

impl Resolved {
    pub fn new(settings: Settings, global: &GlobalArgs, default_dir: &Path) -> Result<Self> {
        let database_path = global
            .database
            .clone()
            .or(settings.database.path)
            .unwrap_or_else(|| default_dir.join(DEFAULT_DATABASE_DIR));
        let mut database = DatabaseConfig::new(database_path);
        if let Some(size) = settings.database.buffer_pool_size {
            database = database.with_buffer_size(size);
        }
        if let Some(size) = settings.database.max_db_size {
            database = database.with_max_size(size);
        }
        if let Some(enabled) = settings.database.enable_compression {
            database = database.with_compression(enabled);
        }

        let format = match (global.log_format, settings.logging.format.as_deref()) {
            (Some(LogFormatArg::Json), _) => LogFormat::Json,
            (Some(LogFormatArg::Text), _) => LogFormat::Text,
            (None, Some("json")) => LogFormat::Json,
            (None, Some("text")) | (None, None) => LogFormat::Text,
            (None, Some(other)) => bail!("Unknown log format {other:?} (expected text or json)"),
        };

        let dangling = match settings.load.dangling.as_deref() {
            Some(value) => DanglingEdgePolicy::from_str(value)
                .map_err(|_| anyhow::anyhow!("Unknown dangling edge policy {value:?} (expected reject or drop)"))?,
            None => DanglingEdgePolicy::default(),
        };

        let embedder = match settings.index.embedder.as_deref() {
            Some(value) => <EmbedderArg as ValueEnum>::from_str(value, true)
                .map_err(|_| anyhow::anyhow!("Unknown embedder {value:?} (expected fastembed or hashing)"))?,
            None => EmbedderArg::Fastembed,
        };

        Ok(Self {
            database,
            endpoint: global.endpoint.clone().or(settings.analyzer.endpoint),
            log: LogConfig {
                format,
                verbose: global.verbose,
                file: global.log_file.clone().or(settings.logging.file),
            },
            dangling,
            attach_run_id: settings.load.attach_run_id,
            index_labels: settings.index.labels,
            embedder,
            top_k: settings.index.top_k.unwrap_or(DEFAULT_TOP_K),
            model_cache: default_dir.join("cache").join("fastembed"),
        })
    }

    pub fn dangling_policy(&self, flag: Option<DanglingArg>) -> DanglingEdgePolicy {
        match flag {
            Some(DanglingArg::Reject) => DanglingEdgePolicy::Reject,
            Some(DanglingArg::Drop) => DanglingEdgePolicy::Drop,
            None => self.dangling,
        }
    }

    pub fn require_endpoint(&self) -> Result<&str> {
        self.endpoint.as_deref().context(
            "No analyzer endpoint configured; pass --endpoint, set GRAPHLOAD_ENDPOINT or add [analyzer] endpoint to the config file",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[database]
path = "/data/graph.kuzu"
buffer_pool_size = 268435456

[analyzer]
endpoint = "http://analyzer.internal:5000/api/analysis/upload"

[logging]
format = "json"
file = "/var/log/graphload.log"

[load]
dangling = "drop"
attach_run_id = true

[index]
labels = ["Class", "Method"]
top_k = 5
embedder = "hashing"
"#;

    fn resolve(settings: Settings, global: GlobalArgs) -> Resolved {
        Resolved::new(settings, &global, Path::new("/home/me/.graphload")).unwrap()
    }

    #[test]
    fn test_defaults_without_file_or_flags() {
        let resolved = resolve(Settings::default(), GlobalArgs::default());

        assert_eq!(
            resolved.database.database_path,
            PathBuf::from("/home/me/.graphload/graph.kuzu")
        );
        assert!(resolved.endpoint.is_none());
        assert_eq!(resolved.log.format, LogFormat::Text);
        assert_eq!(resolved.dangling, DanglingEdgePolicy::Reject);
        assert!(!resolved.attach_run_id);
        assert_eq!(resolved.top_k, DEFAULT_TOP_K);
        assert_eq!(resolved.embedder, EmbedderArg::Fastembed);
        assert_eq!(
            resolved.model_cache,
            PathBuf::from("/home/me/.graphload/cache/fastembed")
        );
        assert!(resolved.require_endpoint().is_err());
    }

    #[test]
    fn test_file_values_apply() {
        let resolved = resolve(Settings::from_toml(FULL).unwrap(), GlobalArgs::default());

        assert_eq!(resolved.database.database_path, PathBuf::from("/data/graph.kuzu"));
        assert_eq!(resolved.database.buffer_pool_size, Some(268435456));
        assert_eq!(
            resolved.require_endpoint().unwrap(),
            "http://analyzer.internal:5000/api/analysis/upload"
        );
        assert_eq!(resolved.log.format, LogFormat::Json);
        assert_eq!(resolved.log.file, Some(PathBuf::from("/var/log/graphload.log")));
        assert_eq!(resolved.dangling, DanglingEdgePolicy::Drop);
        assert!(resolved.attach_run_id);
        assert_eq!(resolved.index_labels, vec!["Class", "Method"]);
        assert_eq!(resolved.top_k, 5);
        assert_eq!(resolved.embedder, EmbedderArg::Hashing);
    }

    #[test]
    fn test_flags_override_file() {
        let global = GlobalArgs {
            database: Some(PathBuf::from("/tmp/other.kuzu")),
            endpoint: Some("http://localhost:5000/api/analysis/upload".to_string()),
            log_format: Some(LogFormatArg::Text),
            verbose: true,
            ..Default::default()
        };

        let resolved = resolve(Settings::from_toml(FULL).unwrap(), global);

        assert_eq!(resolved.database.database_path, PathBuf::from("/tmp/other.kuzu"));
        assert_eq!(
            resolved.endpoint.as_deref(),
            Some("http://localhost:5000/api/analysis/upload")
        );
        assert_eq!(resolved.log.format, LogFormat::Text);
        assert!(resolved.log.verbose);
        assert_eq!(resolved.dangling_policy(Some(DanglingArg::Reject)), DanglingEdgePolicy::Reject);
        assert_eq!(resolved.dangling_policy(None), DanglingEdgePolicy::Drop);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(Settings::from_toml("[database]\nnope = 1\n").is_err());

        let settings = Settings::from_toml("[logging]\nformat = \"xml\"\n").unwrap();
        assert!(Resolved::new(settings, &GlobalArgs::default(), Path::new("/")).is_err());

        let settings = Settings::from_toml("[load]\ndangling = \"ignore\"\n").unwrap();
        assert!(Resolved::new(settings, &GlobalArgs::default(), Path::new("/")).is_err());

        let settings = Settings::from_toml("[index]\nembedder = \"openai\"\n").unwrap();
        assert!(Resolved::new(settings, &GlobalArgs::default(), Path::new("/")).is_err());
    }

    #[test]
    fn test_load_reports_missing_explicit_file() {
        let error = Settings::load(Some(Path::new("/no/such/config.toml"))).unwrap_err();
        assert!(error.to_string().contains("/no/such/config.toml"));
    }
}
