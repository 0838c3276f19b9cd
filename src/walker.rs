use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::AnalyzeError;
use crate::graph::node::FileNode;

/// Suffix a file name must carry to be discovered.
pub const SOURCE_SUFFIX: &str = ".py";

/// Every node id found during discovery.
///
/// Built once, before any import is resolved, and only read afterwards. A
/// package index discovered late in the walk must still be visible to files
/// discovered before it.
#[derive(Debug, Clone, Default)]
pub struct ValidFileSet(HashSet<String>);

impl ValidFileSet {
    /// Return the stored id equal to `candidate`, if any.
    pub fn get(&self, candidate: &str) -> Option<&str> {
        self.0.get(candidate).map(String::as_str)
    }
}

impl FromIterator<String> for ValidFileSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Output of the discovery phase: nodes in traversal order plus the membership index.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub nodes: Vec<FileNode>,
    pub valid_files: ValidFileSet,
}

/// Walk `root` and collect every Python source file.
///
/// Every entry is visited: no `.gitignore`, hidden-file or vendored-directory
/// filtering. Siblings are visited in file-name order so repeated runs over an
/// unchanged tree produce the same node order.
///
/// # Errors
/// Returns [`AnalyzeError::FileSystem`] if `root` does not exist, is not a
/// directory, or cannot be listed. Unreadable entries below the root are
/// logged and skipped.
pub fn discover(root: &Path) -> Result<Discovery, AnalyzeError> {
    check_root(root)?;

    let walker = ignore::WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    Ok(collect_sources(root, walker))
}

/// Keep the source files among walk `entries`, skipping entries that failed.
fn collect_sources<I>(root: &Path, entries: I) -> Discovery
where
    I: IntoIterator<Item = Result<ignore::DirEntry, ignore::Error>>,
{
    let mut nodes = Vec::new();
    let mut ids = HashSet::new();

    for result in entries {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                warn!("skipping unreadable entry: {err}");
                continue;
            }
        };

        if entry.depth() == 0 || !is_source_file(&entry) {
            continue;
        }

        let Some(id) = relative_id(root, entry.path()) else {
            continue;
        };

        // Ids come from distinct paths, but guard the uniqueness invariant anyway.
        if ids.insert(id.clone()) {
            debug!("discovered {id}");
            nodes.push(FileNode::new(id));
        }
    }

    debug!("discovery found {} source file(s) under {}", nodes.len(), root.display());

    Discovery {
        nodes,
        valid_files: ValidFileSet(ids),
    }
}

/// The root must exist, be a directory and be listable.
fn check_root(root: &Path) -> Result<(), AnalyzeError> {
    let meta = fs::metadata(root).map_err(|e| AnalyzeError::file_system(root, e))?;
    if !meta.is_dir() {
        return Err(AnalyzeError::file_system(
            root,
            io::Error::other("not a directory"),
        ));
    }
    fs::read_dir(root).map_err(|e| AnalyzeError::file_system(root, e))?;
    Ok(())
}

/// Regular files (or links to them) whose name ends in `.py`.
fn is_source_file(entry: &ignore::DirEntry) -> bool {
    let is_file = match entry.file_type() {
        Some(ft) if ft.is_file() => true,
        Some(ft) if ft.is_symlink() => entry.path().is_file(),
        _ => false,
    };
    is_file
        && entry
            .file_name()
            .to_str()
            .map(|name| name.ends_with(SOURCE_SUFFIX))
            .unwrap_or(false)
}

/// Path of `path` relative to `root`, joined with `/` regardless of platform.
fn relative_id(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}
