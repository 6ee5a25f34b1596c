use analysis::{AnalysisResult, AnalyzerClient, archive_directory};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Upload `path` to the analyzer, zipping it first when it is a directory.
pub async fn fetch(path: &Path, endpoint: &str) -> Result<AnalysisResult> {
    let client = AnalyzerClient::new(endpoint)?;

    if path.is_dir() {
        let staging = tempfile::Builder::new()
            .prefix("graphload-")
            .suffix(".zip")
            .tempfile()
            .context("Failed to create temporary archive")?;
        let files = archive_directory(path, staging.path())?;
        info!("Archived {files} files from {}", path.display());
        let result = client.upload(staging.path()).await?;
        return Ok(result);
    }

    Ok(client.upload(path).await?)
}

pub async fn run(path: &Path, out: &Path, endpoint: &str) -> Result<()> {
    let result = fetch(path, endpoint).await?;

    std::fs::write(out, result.to_json_pretty()?)
        .with_context(|| format!("Failed to write {}", out.display()))?;

    info!("Analysis Summary:");
    info!("  - Message: {}", result.message);
    info!("  - Run: {}", result.run_id());
    info!("  - Projects analyzed: {}", result.analyzed_project_count);
    info!(
        "  - Triples: {} collected, {} after deduplication",
        result.collected_triples_count, result.deduplicated_triples_count
    );
    info!(
        "  - Graph: {} nodes, {} edges",
        result.node_count(),
        result.edge_count()
    );
    info!("Result saved to: {}", out.display());
    Ok(())
}
