use std::path::PathBuf;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::error;

use super::AppState;
use crate::error::{AnalyzeError, RegistryError};
use crate::graph::DependencyGraph;
use crate::registry::{NewProject, Note, Project, ProjectRegistry};

// =============================================================================
// Errors
// =============================================================================

/// An error response: `{"detail": "..."}` with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::ProjectNotFound(_) => Self::new(StatusCode::NOT_FOUND, "Project not found"),
            RegistryError::NoteNotFound(_) => Self::new(StatusCode::NOT_FOUND, "Note not found"),
            RegistryError::DuplicatePath(_) => Self::new(
                StatusCode::BAD_REQUEST,
                "Project with this path already exists",
            ),
            other => {
                error!("registry failure: {other}");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        }
    }
}

impl From<AnalyzeError> for ApiError {
    fn from(err: AnalyzeError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

// =============================================================================
// Registry access
// =============================================================================

/// Run a mutating registry operation on the blocking pool.
///
/// Every mutation rewrites the registry file, and `delete_project` also
/// removes a directory tree.
async fn write_registry<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&mut ProjectRegistry) -> Result<T, RegistryError> + Send + 'static,
{
    let mut registry = state.registry.clone().lock_owned().await;
    tokio::task::spawn_blocking(move || op(&mut *registry))
        .await
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(ApiError::from)
}

// =============================================================================
// Request types
// =============================================================================

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    project_id: u64,
}

#[derive(Deserialize)]
pub struct NoteRequest {
    file_path: String,
    content: String,
}

// =============================================================================
// Health
// =============================================================================

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "backend"
    }))
}

// =============================================================================
// Projects
// =============================================================================

pub async fn add_project(
    State(state): State<AppState>,
    Json(new): Json<NewProject>,
) -> Result<Json<Project>, ApiError> {
    let project = write_registry(&state, move |registry| registry.add_project(new)).await?;
    Ok(Json(project))
}

pub async fn list_projects(State(state): State<AppState>) -> Json<Vec<Project>> {
    Json(state.registry.lock().await.list_projects().to_vec())
}

pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Project>, ApiError> {
    let registry = state.registry.lock().await;
    Ok(Json(registry.get_project(id)?.clone()))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, ApiError> {
    write_registry(&state, move |registry| registry.delete_project(id)).await?;
    Ok(Json(json!({ "status": "deleted", "id": id })))
}

// =============================================================================
// Analysis
// =============================================================================

/// Analyze a registered project and return its graph verbatim.
///
/// The timestamp is only recorded after a successful run.
pub async fn analyze_project(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<DependencyGraph>, ApiError> {
    let root = {
        let registry = state.registry.lock().await;
        PathBuf::from(&registry.get_project(request.project_id)?.local_path)
    };

    if !root.exists() {
        return Err(ApiError::new(
            StatusCode::NOT_FOUND,
            "Project path not found on server",
        ));
    }

    let graph = tokio::task::spawn_blocking(move || crate::analyze(&root))
        .await
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))??;

    let timestamp = chrono::Utc::now().to_rfc3339();
    write_registry(&state, move |registry| {
        registry.record_analysis(request.project_id, &timestamp)
    })
    .await?;

    Ok(Json(graph))
}

// =============================================================================
// Notes
// =============================================================================

pub async fn upsert_note(
    State(state): State<AppState>,
    Json(note): Json<NoteRequest>,
) -> Result<Json<Note>, ApiError> {
    let saved = write_registry(&state, move |registry| {
        registry.upsert_note(&note.file_path, &note.content)
    })
    .await?;
    Ok(Json(saved))
}

pub async fn list_notes(State(state): State<AppState>) -> Json<Vec<Note>> {
    Json(state.registry.lock().await.list_notes().to_vec())
}

pub async fn get_note(
    State(state): State<AppState>,
    Path(file_path): Path<String>,
) -> Result<Json<Note>, ApiError> {
    let registry = state.registry.lock().await;
    Ok(Json(registry.get_note(&file_path)?.clone()))
}

// =============================================================================
// Tests
// =============================================================================
