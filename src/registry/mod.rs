//! Persistent store of registered projects and per-file notes.
//!
//! The analysis core never reads this store; it only supplies root paths and
//! records when a project was last analyzed.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::RegistryError;

/// File name of the registry inside the data directory.
pub const REGISTRY_FILE: &str = "registry.json";

/// Current on-disk format version.
pub const REGISTRY_VERSION: u32 = 1;

/// A registered project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    /// Root directory handed to `analyze`. Unique across projects.
    pub local_path: String,
    pub github_url: Option<String>,
    /// RFC 3339 timestamp of the last successful analysis.
    pub last_analysis: Option<String>,
}

/// Fields supplied when registering a project.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub local_path: String,
    #[serde(default)]
    pub github_url: Option<String>,
}

/// Free-text note attached to a file path. One note per path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: u64,
    pub file_path: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RegistryData {
    version: u32,
    next_project_id: u64,
    next_note_id: u64,
    projects: Vec<Project>,
    notes: Vec<Note>,
}

impl Default for RegistryData {
    fn default() -> Self {
        Self {
            version: REGISTRY_VERSION,
            next_project_id: 1,
            next_note_id: 1,
            projects: Vec::new(),
            notes: Vec::new(),
        }
    }
}

/// Registry backed by one JSON file, rewritten atomically on every change.
///
/// Mutations are staged on a copy of the data and only become visible once
/// the file has been written, so a failed save leaves the registry unchanged.
#[derive(Debug)]
pub struct ProjectRegistry {
    path: PathBuf,
    data: RegistryData,
}

impl ProjectRegistry {
    /// Open the registry at `path`, starting empty if the file does not exist.
    ///
    /// # Errors
    /// [`RegistryError::Io`] if the file exists but cannot be read,
    /// [`RegistryError::Corrupt`] if it does not hold a valid registry.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RegistryError> {
        let path = path.into();
        if !path.exists() {
            debug!("no registry at {}, starting empty", path.display());
            return Ok(Self {
                path,
                data: RegistryData::default(),
            });
        }

        let contents = std::fs::read_to_string(&path).map_err(|source| RegistryError::Io {
            path: path.clone(),
            source,
        })?;
        let data = serde_json::from_str(&contents).map_err(|source| RegistryError::Corrupt {
            path: path.clone(),
            source,
        })?;
        Ok(Self { path, data })
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    /// Register a new project.
    ///
    /// # Errors
    /// [`RegistryError::DuplicatePath`] if another project already uses `local_path`.
    pub fn add_project(&mut self, new: NewProject) -> Result<Project, RegistryError> {
        if self.data.projects.iter().any(|p| p.local_path == new.local_path) {
            return Err(RegistryError::DuplicatePath(new.local_path));
        }

        let mut data = self.data.clone();
        let project = Project {
            id: data.next_project_id,
            name: new.name,
            local_path: new.local_path,
            github_url: new.github_url,
            last_analysis: None,
        };
        data.next_project_id += 1;
        data.projects.push(project.clone());
        self.commit(data)?;
        Ok(project)
    }

    pub fn list_projects(&self) -> &[Project] {
        &self.data.projects
    }

    pub fn get_project(&self, id: u64) -> Result<&Project, RegistryError> {
        self.data
            .projects
            .iter()
            .find(|p| p.id == id)
            .ok_or(RegistryError::ProjectNotFound(id))
    }

    /// Remove a project record, then its directory on disk.
    ///
    /// Failing to delete the directory is logged and does not undo the removal.
    pub fn delete_project(&mut self, id: u64) -> Result<Project, RegistryError> {
        let mut data = self.data.clone();
        let pos = data
            .projects
            .iter()
            .position(|p| p.id == id)
            .ok_or(RegistryError::ProjectNotFound(id))?;
        let project = data.projects.remove(pos);
        self.commit(data)?;

        let dir = Path::new(&project.local_path);
        if dir.exists() {
            if let Err(err) = std::fs::remove_dir_all(dir) {
                warn!("error deleting directory {}: {err}", dir.display());
            }
        }
        Ok(project)
    }

    /// Store the time of the last successful analysis of project `id`.
    pub fn record_analysis(&mut self, id: u64, timestamp: &str) -> Result<(), RegistryError> {
        let mut data = self.data.clone();
        let project = data
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RegistryError::ProjectNotFound(id))?;
        project.last_analysis = Some(timestamp.to_owned());
        self.commit(data)
    }

    // -----------------------------------------------------------------------
    // Notes
    // -----------------------------------------------------------------------

    /// Create the note for `file_path`, or replace the content of the existing one.
    pub fn upsert_note(&mut self, file_path: &str, content: &str) -> Result<Note, RegistryError> {
        let mut data = self.data.clone();
        let note = match data.notes.iter_mut().find(|n| n.file_path == file_path) {
            Some(existing) => {
                existing.content = content.to_owned();
                existing.clone()
            }
            None => {
                let note = Note {
                    id: data.next_note_id,
                    file_path: file_path.to_owned(),
                    content: content.to_owned(),
                };
                data.next_note_id += 1;
                data.notes.push(note.clone());
                note
            }
        };
        self.commit(data)?;
        Ok(note)
    }

    pub fn get_note(&self, file_path: &str) -> Result<&Note, RegistryError> {
        self.data
            .notes
            .iter()
            .find(|n| n.file_path == file_path)
            .ok_or_else(|| RegistryError::NoteNotFound(file_path.to_owned()))
    }

    pub fn list_notes(&self) -> &[Note] {
        &self.data.notes
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Write `data` to disk, then make it the current state.
    fn commit(&mut self, data: RegistryData) -> Result<(), RegistryError> {
        self.save(&data)?;
        self.data = data;
        Ok(())
    }

    /// Atomic write: temp file in the same directory, then rename.
    fn save(&self, data: &RegistryData) -> Result<(), RegistryError> {
        let io_err = |source| RegistryError::Io {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(d) if !d.as_os_str().is_empty() => d.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(io_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(io_err)?;
        serde_json::to_writer_pretty(&mut tmp, data).map_err(|e| io_err(e.into()))?;
        tmp.as_file().flush().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn registry() -> (TempDir, ProjectRegistry) {
        let dir = tempfile::tempdir().unwrap();
        let reg = ProjectRegistry::open(dir.path().join(REGISTRY_FILE)).unwrap();
        (dir, reg)
    }

    fn new_project(name: &str, path: &str) -> NewProject {
        NewProject {
            name: name.into(),
            local_path: path.into(),
            github_url: None,
        }
    }

    #[test]
    fn test_add_assigns_increasing_ids() {
        let (_dir, mut reg) = registry();
        let a = reg.add_project(new_project("a", "/srv/a")).unwrap();
        let b = reg.add_project(new_project("b", "/srv/b")).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(reg.list_projects().len(), 2);
        assert!(a.last_analysis.is_none());
    }

    #[test]
    fn test_duplicate_path_is_rejected() {
        let (_dir, mut reg) = registry();
        reg.add_project(new_project("a", "/srv/a")).unwrap();
        let err = reg.add_project(new_project("again", "/srv/a")).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicatePath(_)));
    }

    #[test]
    fn test_get_missing_project() {
        let (_dir, reg) = registry();
        assert!(matches!(
            reg.get_project(7),
            Err(RegistryError::ProjectNotFound(7))
        ));
    }

    #[test]
    fn test_record_analysis_persists_across_reopen() {
        let (dir, mut reg) = registry();
        let p = reg.add_project(new_project("a", "/srv/a")).unwrap();
        reg.record_analysis(p.id, "2026-01-01T00:00:00+00:00").unwrap();

        let reopened = ProjectRegistry::open(dir.path().join(REGISTRY_FILE)).unwrap();
        let stored = reopened.get_project(p.id).unwrap();
        assert_eq!(
            stored.last_analysis.as_deref(),
            Some("2026-01-01T00:00:00+00:00")
        );
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let (_dir, mut reg) = registry();
        let a = reg.add_project(new_project("a", "/nonexistent/pydeps-a")).unwrap();
        reg.delete_project(a.id).unwrap();
        let b = reg.add_project(new_project("b", "/nonexistent/pydeps-b")).unwrap();
        assert_eq!(b.id, 2);
    }

    #[test]
    fn test_delete_removes_project_directory() {
        let (dir, mut reg) = registry();
        let project_dir = dir.path().join("checkout");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::write(project_dir.join("main.py"), "").unwrap();

        let p = reg
            .add_project(new_project("c", project_dir.to_str().unwrap()))
            .unwrap();
        reg.delete_project(p.id).unwrap();

        assert!(!project_dir.exists());
        assert!(reg.list_projects().is_empty());
    }

    #[test]
    fn test_upsert_note_updates_in_place() {
        let (_dir, mut reg) = registry();
        let first = reg.upsert_note("main.py", "entry point").unwrap();
        let second = reg.upsert_note("main.py", "entry point, refactor me").unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(reg.list_notes().len(), 1);
        assert_eq!(
            reg.get_note("main.py").unwrap().content,
            "entry point, refactor me"
        );
    }

    #[test]
    fn test_missing_note() {
        let (_dir, reg) = registry();
        assert!(matches!(
            reg.get_note("nope.py"),
            Err(RegistryError::NoteNotFound(_))
        ));
    }

    /// A registry whose data directory is a regular file, so every save fails.
    fn blocked_registry() -> (TempDir, ProjectRegistry) {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("data");
        std::fs::write(&blocker, "").unwrap();
        let reg = ProjectRegistry::open(blocker.join(REGISTRY_FILE)).unwrap();
        (dir, reg)
    }

    #[test]
    fn test_failed_add_leaves_registry_unchanged() {
        let (_dir, mut reg) = blocked_registry();
        let err = reg.add_project(new_project("a", "/srv/a")).unwrap_err();
        assert!(matches!(err, RegistryError::Io { .. }));
        assert!(reg.list_projects().is_empty());

        // Retrying fails on the save again, not on a phantom duplicate.
        let err = reg.add_project(new_project("a", "/srv/a")).unwrap_err();
        assert!(matches!(err, RegistryError::Io { .. }));
    }

    #[test]
    fn test_failed_note_upsert_leaves_registry_unchanged() {
        let (_dir, mut reg) = blocked_registry();
        assert!(reg.upsert_note("main.py", "text").is_err());
        assert!(reg.list_notes().is_empty());
        assert!(matches!(
            reg.get_note("main.py"),
            Err(RegistryError::NoteNotFound(_))
        ));
    }

    #[test]
    fn test_failed_delete_and_record_keep_project() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let project_dir = dir.path().join("checkout");
        std::fs::create_dir_all(&project_dir).unwrap();

        let mut reg = ProjectRegistry::open(data_dir.join(REGISTRY_FILE)).unwrap();
        let p = reg
            .add_project(new_project("c", project_dir.to_str().unwrap()))
            .unwrap();

        // Replace the data directory with a file so later saves fail.
        std::fs::remove_dir_all(&data_dir).unwrap();
        std::fs::write(&data_dir, "").unwrap();

        assert!(reg.record_analysis(p.id, "2026-01-01T00:00:00+00:00").is_err());
        assert!(reg.get_project(p.id).unwrap().last_analysis.is_none());

        assert!(reg.delete_project(p.id).is_err());
        assert_eq!(reg.get_project(p.id).unwrap(), &p);
        assert!(project_dir.exists());
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(REGISTRY_FILE);
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            ProjectRegistry::open(&path),
            Err(RegistryError::Corrupt { .. })
        ));
    }
}
