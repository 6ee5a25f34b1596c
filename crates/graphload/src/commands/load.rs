use crate::cli::LoadArgs;
use crate::commands::analyze;
use crate::config::Resolved;
use crate::utils::lock_database;
use analysis::AnalysisResult;
use anyhow::{Context, Result};
use loader::{PipelineOptions, run_against_kuzu, validate};
use tracing::{info, warn};

pub async fn run(args: LoadArgs, config: &Resolved) -> Result<()> {
    let result = match (&args.input, &args.source) {
        (Some(input), _) => AnalysisResult::from_path(input)
            .with_context(|| format!("Failed to read analysis result {}", input.display()))?,
        (None, Some(source)) => analyze::fetch(source, config.require_endpoint()?).await?,
        (None, None) => anyhow::bail!("Either --input or --source is required"),
    };

    if let Some(path) = &args.artifact_out {
        let json = serde_json::to_string_pretty(&result.artifact)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write artifact {}", path.display()))?;
        info!(
            "Saved run artifact ({} log entries) to {}",
            result.artifact.log_entries.len(),
            path.display()
        );
    }

    let options = PipelineOptions {
        dangling_edges: config.dangling_policy(args.dangling),
        attach_run_id: args.attach_run_id || config.attach_run_id,
    };

    if args.dry_run {
        let graph = validate(&result, &options)
            .context("Analysis result failed validation")?;
        info!(
            "Dry run: {} nodes and {} relationships would be written ({} edges dropped)",
            graph.nodes.len(),
            graph.relationships.len(),
            graph.dropped_edges.len()
        );
        return Ok(());
    }

    let database_path = &config.database.database_path;
    let _lock = lock_database(database_path)?;

    let report = run_against_kuzu(&result, &config.database, &options).map_err(|e| {
        let phase = e.phase();
        let outcome = if e.store_mutated() {
            "the stored graph is incomplete, run the load again to replace it"
        } else {
            "the stored graph was not modified"
        };
        anyhow::Error::new(e).context(format!("Load failed in {phase} phase; {outcome}"))
    })?;

    info!("Load Summary:");
    info!("  - Database: {}", database_path.display());
    info!("  - Run: {}", result.run_id());
    info!("  - Nodes written: {}", report.load.nodes_written);
    info!(
        "  - Relationships written: {}",
        report.load.relationships_written
    );
    if report.dropped_edges > 0 {
        warn!("  - Edges dropped: {}", report.dropped_edges);
    }
    Ok(())
}
