//! Turns an analysis result into a stored property graph.
//!
//! A run checks node id uniqueness, maps nodes and edges to graph entities
//! and checks that every label and type can get a table of its own,
//! then replaces the whole content of the target store: everything is
//! cleared first, nodes are written, then relationships. Nothing touches
//! the store until the result has been validated.

pub mod error;
pub mod loader;
pub mod pipeline;
pub mod table_names;
pub mod transform;
pub mod uniqueness;

pub use error::{Phase, PipelineError};
pub use loader::{GraphLoader, LoadReport, LoadState};
pub use table_names::{InvalidTableNames, check_table_names};
pub use pipeline::{PipelineOptions, PipelineReport, run_against_kuzu, run_pipeline, validate};
pub use transform::{DanglingEdgePolicy, TransformOptions, TransformedGraph, transform};
pub use uniqueness::{DuplicateNodeIds, check_unique_ids};
