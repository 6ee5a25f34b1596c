use crate::error::{Phase, PipelineError};
use crate::transform::TransformedGraph;
use database::GraphStore;
use std::fmt;
use tracing::{debug, info};

/// Progress of one load. `Loaded` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum LoadState {
    Idle,
    Clearing,
    Cleared,
    Writing,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub nodes_written: usize,
    pub relationships_written: usize,
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes, {} relationships written",
            self.nodes_written, self.relationships_written
        )
    }
}

/// Replaces the whole content of a graph store with one transformed graph.
///
/// A loader is single use: once it reaches `Loaded` or `Failed` a new one
/// is needed, and a failed write has to be retried from the clear.
pub struct GraphLoader<'s, S: GraphStore + ?Sized> {
    store: &'s mut S,
    state: LoadState,
}

impl<'s, S: GraphStore + ?Sized> GraphLoader<'s, S> {
    pub fn new(store: &'s mut S) -> Self {
        Self {
            store,
            state: LoadState::Idle,
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    fn transition(&mut self, next: LoadState) {
        debug!("Graph loader: {} -> {}", self.state, next);
        self.state = next;
    }

    /// Delete everything currently in the store.
    pub fn clear(&mut self) -> Result<(), PipelineError> {
        self.expect_state(Phase::Clear, LoadState::Idle)?;
        self.transition(LoadState::Clearing);

        match self.store.clear() {
            Ok(()) => {
                self.transition(LoadState::Cleared);
                Ok(())
            }
            Err(e) => {
                self.transition(LoadState::Failed);
                Err(PipelineError::ClearFailed(e))
            }
        }
    }

    /// Write nodes, then relationships. Requires a successful [`clear`](Self::clear).
    pub fn write(&mut self, graph: &TransformedGraph) -> Result<LoadReport, PipelineError> {
        self.expect_state(Phase::Write, LoadState::Cleared)?;
        self.transition(LoadState::Writing);

        let mut report = LoadReport::default();
        let result = match self.store.write_nodes(&graph.nodes) {
            Ok(written) => {
                report.nodes_written = written;
                self.store.write_relationships(&graph.relationships)
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(written) => {
                report.relationships_written = written;
                self.transition(LoadState::Loaded);
                info!("Loaded graph: {report}");
                Ok(report)
            }
            Err(source) => {
                self.transition(LoadState::Failed);
                Err(PipelineError::WriteFailed {
                    nodes_written: report.nodes_written,
                    relationships_written: report.relationships_written,
                    source,
                })
            }
        }
    }

    /// Clear then write.
    pub fn load(&mut self, graph: &TransformedGraph) -> Result<LoadReport, PipelineError> {
        self.clear()?;
        self.write(graph)
    }

    fn expect_state(&self, step: Phase, expected: LoadState) -> Result<(), PipelineError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(PipelineError::OutOfOrder {
                step,
                state: self.state,
            })
        }
    }
}
