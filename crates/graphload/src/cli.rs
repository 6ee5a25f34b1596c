use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "graphload",
    version,
    about = "Load code-analysis results into a property graph",
    long_about = "Uploads a codebase to the analyzer service, validates the returned graph \
                  and replaces the content of a Kuzu graph database with it."
)]
pub struct GraphloadCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

impl GraphloadCli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Configuration file (default: ~/.graphload/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Kuzu database directory
    #[arg(long, global = true, env = "GRAPHLOAD_DATABASE", value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Analyzer upload endpoint
    #[arg(long, global = true, env = "GRAPHLOAD_ENDPOINT", value_name = "URL")]
    pub endpoint: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormatArg>,

    /// Also write logs to this rolling file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormatArg {
    Text,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DanglingArg {
    /// Fail before touching the database
    Reject,
    /// Skip the edge with a warning
    Drop,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedderArg {
    /// all-MiniLM-L6-v2 sentence embeddings, downloaded on first use
    Fastembed,
    /// Model-free feature hashing, for offline use
    Hashing,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a codebase to the analyzer and save the result
    Analyze {
        /// Zip archive or source directory
        path: PathBuf,

        /// Where to write the analysis result JSON
        #[arg(short, long, value_name = "FILE")]
        out: PathBuf,
    },
    /// Replace the graph in the database with an analysis result
    Load(LoadArgs),
    /// Show node and relationship counts of the stored graph
    Stats {
        /// Print counts as JSON
        #[arg(long)]
        json: bool,
    },
    /// Build an embedding index over the nodes of an analysis result
    Index {
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Where to write the index
        #[arg(short, long, value_name = "FILE")]
        out: PathBuf,

        /// Only index nodes with this label (repeatable)
        #[arg(long = "label", value_name = "LABEL")]
        labels: Vec<String>,

        /// Embedding model (default: fastembed)
        #[arg(long, value_enum)]
        embedder: Option<EmbedderArg>,

        /// Vector size of the hashing embedder
        #[arg(long)]
        dimension: Option<usize>,
    },
    /// Query an embedding index with the model it was built with
    Search {
        #[arg(long, value_name = "FILE")]
        index: PathBuf,

        query: String,

        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Print hits as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct LoadArgs {
    /// Analysis result JSON file
    #[arg(short, long, value_name = "FILE", conflicts_with = "source", required_unless_present = "source")]
    pub input: Option<PathBuf>,

    /// Zip archive or directory to analyze first
    #[arg(short, long, value_name = "PATH")]
    pub source: Option<PathBuf>,

    /// What to do with edges whose endpoints are not in the result
    #[arg(long, value_enum)]
    pub dangling: Option<DanglingArg>,

    /// Store the run id on every node and relationship
    #[arg(long)]
    pub attach_run_id: bool,

    /// Validate only; do not touch the database
    #[arg(long)]
    pub dry_run: bool,

    /// Write the analyzer run artifact (metadata and log) to this file
    #[arg(long, value_name = "FILE")]
    pub artifact_out: Option<PathBuf>,
}
