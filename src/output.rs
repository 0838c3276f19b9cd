use std::io::Write;

use crate::graph::{AnalysisStats, DependencyGraph, SkippedFile};

/// Write the graph as JSON to `out`, followed by a newline.
pub fn write_graph<W: Write>(out: &mut W, graph: &DependencyGraph, pretty: bool) -> anyhow::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, graph)?;
    } else {
        serde_json::to_writer(&mut *out, graph)?;
    }
    writeln!(out)?;
    Ok(())
}

/// Print a human-readable summary of the run to **stderr**, so stdout stays
/// clean for the JSON graph.
pub fn print_summary(stats: &AnalysisStats, skipped: &[SkippedFile]) {
    eprintln!(
        "Analyzed {} files in {:.2}s",
        stats.file_count, stats.elapsed_secs
    );
    eprintln!(
        "  {} imports: {} resolved, {} unresolved",
        stats.imports, stats.resolved_imports, stats.unresolved_imports
    );

    if !skipped.is_empty() {
        eprintln!("  {} files skipped (parse errors)", skipped.len());
        for file in skipped {
            eprintln!("    {}: {}", file.id, file.reason);
        }
    }
}
