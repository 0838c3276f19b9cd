pub mod edge;
pub mod node;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use edge::DependencyEdge;
use node::FileNode;

use crate::parser::FileOutcome;
use crate::resolver::resolve_module;
use crate::walker::Discovery;

/// The file-level dependency graph of one project: the sole wire artifact.
///
/// Serializes as `{"nodes": [...], "edges": [...]}`. Nodes keep discovery
/// order; edges keep node order outer and declaration order inner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyGraph {
    pub nodes: Vec<FileNode>,
    pub edges: Vec<DependencyEdge>,
}

/// A file that was discovered but left out of import extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub id: String,
    pub reason: String,
}

/// Aggregate counts for one analysis run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisStats {
    pub file_count: usize,
    /// Dotted names seen across all parsed files, duplicates included.
    pub imports: usize,
    /// Imports that produced an edge.
    pub resolved_imports: usize,
    /// Imports matching no discovered file.
    pub unresolved_imports: usize,
    /// Files skipped due to read, decode or syntax errors.
    pub skipped: usize,
    /// Wall-clock time for the run in seconds.
    pub elapsed_secs: f64,
}

/// Everything one run produced: the graph plus what was skipped and counted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Analysis {
    pub graph: DependencyGraph,
    pub skipped: Vec<SkippedFile>,
    pub stats: AnalysisStats,
}

/// Turn discovery output and per-file outcomes into the final graph.
///
/// `outcomes[i]` belongs to `discovery.nodes[i]`. Every node is kept, including
/// skipped ones. Each resolved dotted name becomes one edge; repeated imports
/// and cycles are kept as they are.
pub fn assemble(discovery: Discovery, outcomes: Vec<FileOutcome>, elapsed: Duration) -> Analysis {
    let Discovery { nodes, valid_files } = discovery;
    debug_assert_eq!(nodes.len(), outcomes.len());

    let mut edges = Vec::new();
    let mut skipped = Vec::new();
    let mut stats = AnalysisStats {
        file_count: nodes.len(),
        ..AnalysisStats::default()
    };

    for (node, outcome) in nodes.iter().zip(outcomes) {
        match outcome {
            FileOutcome::Parsed { names } => {
                stats.imports += names.len();
                for name in &names {
                    match resolve_module(name, &valid_files).target() {
                        Some(target) => {
                            edges.push(DependencyEdge {
                                source: node.id.clone(),
                                target: target.to_owned(),
                            });
                            stats.resolved_imports += 1;
                        }
                        None => stats.unresolved_imports += 1,
                    }
                }
            }
            FileOutcome::Skipped { reason } => {
                warn!("error analyzing file {}: {reason}", node.id);
                skipped.push(SkippedFile {
                    id: node.id.clone(),
                    reason: reason.to_string(),
                });
            }
        }
    }

    stats.skipped = skipped.len();
    stats.elapsed_secs = elapsed.as_secs_f64();

    info!(
        "analyzed {} file(s): {} edge(s), {} unresolved import(s), {} skipped in {:.2}s",
        stats.file_count,
        edges.len(),
        stats.unresolved_imports,
        stats.skipped,
        stats.elapsed_secs
    );

    Analysis {
        graph: DependencyGraph { nodes, edges },
        skipped,
        stats,
    }
}
