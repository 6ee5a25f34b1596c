mod cli;
mod commands;
mod config;
mod utils;

use crate::cli::{Commands, GraphloadCli};
use crate::config::{Resolved, Settings};
use crate::utils::get_graphload_dir;
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = GraphloadCli::parse_args();

    let settings = Settings::load(cli.global.config.as_deref())?;
    let config = Resolved::new(settings, &cli.global, &get_graphload_dir()?)?;
    let _guards = logging::init(&config.log)?;

    match cli.command {
        Commands::Analyze { path, out } => {
            commands::analyze::run(&path, &out, config.require_endpoint()?).await
        }
        Commands::Load(args) => commands::load::run(args, &config).await,
        Commands::Stats { json } => commands::stats::run(&config, json),
        Commands::Index {
            input,
            out,
            labels,
            embedder,
            dimension,
        } => {
            let labels = if labels.is_empty() {
                config.index_labels.clone()
            } else {
                labels
            };
            let embedder = commands::index::open_embedder(
                embedder.unwrap_or(config.embedder),
                dimension,
                &config,
            )?;
            commands::index::run(&input, &out, &labels, embedder)
        }
        Commands::Search {
            index,
            query,
            top_k,
            json,
        } => commands::search::run(&index, &query, top_k.unwrap_or(config.top_k), json, &config),
    }
}
