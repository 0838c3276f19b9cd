use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors of an analysis run.
///
/// Only discovery can fail the whole run. Per-file problems are reported
/// through [`crate::parser::FileOutcome::Skipped`] and never surface here.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    /// The project root is missing, is not a directory, or cannot be listed.
    #[error("cannot read project root {}: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl AnalyzeError {
    pub(crate) fn file_system(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileSystem {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised by the project registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Project with this path already exists: {0}")]
    DuplicatePath(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(u64),

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("registry I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("registry file {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
