//! Static file-level dependency graphs for Python projects.
//!
//! [`analyze`] runs in two strict phases. Discovery walks the project root and
//! fixes the node list and the set of valid ids. Only then are files parsed
//! (in parallel) and their imports resolved against that set, so resolution
//! never depends on walk order.

pub mod config;
pub mod error;
pub mod graph;
pub mod output;
pub mod parser;
pub mod registry;
pub mod resolver;
pub mod walker;
#[cfg(feature = "web")]
pub mod web;

use std::path::Path;
use std::time::Instant;

use rayon::prelude::*;
use tracing::debug;

pub use error::{AnalyzeError, RegistryError};
pub use graph::edge::DependencyEdge;
pub use graph::node::FileNode;
pub use graph::{Analysis, AnalysisStats, DependencyGraph, SkippedFile};

/// Build the dependency graph of the Python project rooted at `root`.
///
/// # Errors
/// Returns [`AnalyzeError::FileSystem`] if `root` is missing, not a directory,
/// or unreadable. Files that fail to parse never fail the run.
pub fn analyze(root: &Path) -> Result<DependencyGraph, AnalyzeError> {
    analyze_detailed(root).map(|analysis| analysis.graph)
}

/// Like [`analyze`], also reporting skipped files and run statistics.
pub fn analyze_detailed(root: &Path) -> Result<Analysis, AnalyzeError> {
    let start = Instant::now();

    // Phase 1: discovery must be complete before any import is resolved.
    let discovery = walker::discover(root)?;

    // Phase 2: files are independent of each other; the indexed collect keeps node order.
    debug!("parsing {} file(s)", discovery.nodes.len());
    let outcomes: Vec<parser::FileOutcome> = discovery
        .nodes
        .par_iter()
        .map(|node| parser::parse_file(&node.path_under(root)))
        .collect();

    Ok(graph::assemble(discovery, outcomes, start.elapsed()))
}
