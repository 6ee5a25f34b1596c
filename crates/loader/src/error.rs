use crate::loader::LoadState;
use crate::table_names::InvalidTableNames;
use crate::transform::DanglingEdges;
use crate::uniqueness::DuplicateNodeIds;
use database::DatabaseError;
use thiserror::Error;

/// Pipeline step an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    Validate,
    Connect,
    Clear,
    Write,
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    DuplicateNodeIds(#[from] DuplicateNodeIds),
    #[error(transparent)]
    DanglingEdges(#[from] DanglingEdges),
    #[error(transparent)]
    InvalidTableNames(#[from] InvalidTableNames),
    #[error("Failed to connect to graph store: {0}")]
    StoreConnection(#[source] DatabaseError),
    #[error("Failed to clear graph store: {0}")]
    ClearFailed(#[source] DatabaseError),
    #[error(
        "Write failed after clear succeeded: {nodes_written} nodes, {relationships_written} relationships written: {source}"
    )]
    WriteFailed {
        nodes_written: usize,
        relationships_written: usize,
        #[source]
        source: DatabaseError,
    },
    /// A loader step was called from a state it cannot start from.
    #[error("Cannot {step} while the graph loader is {state}")]
    OutOfOrder { step: Phase, state: LoadState },
}

impl PipelineError {
    pub fn phase(&self) -> Phase {
        match self {
            PipelineError::DuplicateNodeIds(_)
            | PipelineError::DanglingEdges(_)
            | PipelineError::InvalidTableNames(_) => Phase::Validate,
            PipelineError::StoreConnection(_) => Phase::Connect,
            PipelineError::ClearFailed(_) => Phase::Clear,
            PipelineError::WriteFailed { .. } => Phase::Write,
            PipelineError::OutOfOrder { step, .. } => *step,
        }
    }

    /// Whether the target graph may have been modified before the failure.
    pub fn store_mutated(&self) -> bool {
        matches!(
            self,
            PipelineError::ClearFailed(_) | PipelineError::WriteFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_names() {
        assert_eq!(Phase::Validate.to_string(), "validate");
        assert_eq!(Phase::Write.as_ref(), "write");
    }

    #[test]
    fn test_write_failed_reports_counts() {
        let error = PipelineError::WriteFailed {
            nodes_written: 0,
            relationships_written: 0,
            source: DatabaseError::Unavailable("disk full".to_string()),
        };

        assert_eq!(error.phase(), Phase::Write);
        assert!(error.store_mutated());
        assert_eq!(
            error.to_string(),
            "Write failed after clear succeeded: 0 nodes, 0 relationships written: Store unavailable: disk full"
        );
    }

    #[test]
    fn test_connection_failure_does_not_mutate() {
        let error = PipelineError::StoreConnection(DatabaseError::ConnectionFailed("locked".into()));

        assert_eq!(error.phase(), Phase::Connect);
        assert!(!error.store_mutated());
    }

    #[test]
    fn test_out_of_order_step_does_not_mutate() {
        let error = PipelineError::OutOfOrder {
            step: Phase::Write,
            state: LoadState::Idle,
        };

        assert_eq!(error.phase(), Phase::Write);
        assert!(!error.store_mutated());
        assert_eq!(error.to_string(), "Cannot write while the graph loader is Idle");
    }
}
