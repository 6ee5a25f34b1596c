use crate::error::PipelineError;
use crate::loader::{GraphLoader, LoadReport};
use crate::table_names::check_table_names;
use crate::transform::{DanglingEdgePolicy, TransformOptions, TransformedGraph, transform};
use crate::uniqueness::check_unique_ids;
use analysis::AnalysisResult;
use database::GraphStore;
use database::kuzu::{DatabaseConfig, KuzuGraphStore};
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    pub dangling_edges: DanglingEdgePolicy,
    /// Stamp the result's run id on every stored entity.
    pub attach_run_id: bool,
}

impl PipelineOptions {
    fn transform_options(&self, result: &AnalysisResult) -> TransformOptions {
        TransformOptions {
            run_id: self.attach_run_id.then(|| result.run_id().to_string()),
            dangling_edges: self.dangling_edges,
        }
    }
}

/// Outcome of a successful pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub load: LoadReport,
    pub dropped_edges: usize,
}

/// Check and transform without touching any store.
pub fn validate(
    result: &AnalysisResult,
    options: &PipelineOptions,
) -> Result<TransformedGraph, PipelineError> {
    check_unique_ids(&result.nodes)?;
    let graph = transform(result, &options.transform_options(result))?;
    check_table_names(&graph)?;
    if !graph.dropped_edges.is_empty() {
        warn!(
            "Dropped {} of {} edges with unknown endpoints",
            graph.dropped_edges.len(),
            result.edge_count()
        );
    }
    Ok(graph)
}

/// Replace the content of `store` with `result`.
///
/// Validation runs first, so a rejected result leaves the store untouched.
pub fn run_pipeline<S: GraphStore + ?Sized>(
    result: &AnalysisResult,
    store: &mut S,
    options: &PipelineOptions,
) -> Result<PipelineReport, PipelineError> {
    info!(
        "Loading analysis run {} ({} nodes, {} edges)",
        result.run_id(),
        result.node_count(),
        result.edge_count()
    );
    let graph = validate(result, options)?;
    let load = GraphLoader::new(store).load(&graph)?;
    Ok(PipelineReport {
        load,
        dropped_edges: graph.dropped_edges.len(),
    })
}

/// [`run_pipeline`] against the Kuzu database described by `config`.
///
/// The database is only opened once the result has validated, and is
/// closed on return.
pub fn run_against_kuzu(
    result: &AnalysisResult,
    config: &DatabaseConfig,
    options: &PipelineOptions,
) -> Result<PipelineReport, PipelineError> {
    let graph = validate(result, options)?;
    let mut store = KuzuGraphStore::open(config).map_err(PipelineError::StoreConnection)?;
    info!(
        "Loading analysis run {} into {}",
        result.run_id(),
        config.database_path.display()
    );
    let load = GraphLoader::new(&mut store).load(&graph)?;
    Ok(PipelineReport {
        load,
        dropped_edges: graph.dropped_edges.len(),
    })
}
