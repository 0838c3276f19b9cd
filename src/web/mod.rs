//! HTTP API: exposes `analyze` and the project registry.

mod routes;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::routing::{get, post};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::registry::ProjectRegistry;

pub use routes::ApiError;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Mutex<ProjectRegistry>>,
}

impl AppState {
    pub fn new(registry: ProjectRegistry) -> Self {
        Self {
            registry: Arc::new(Mutex::new(registry)),
        }
    }
}

/// Create the router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(routes::health))
        // Projects
        .route("/api/projects/add", post(routes::add_project))
        .route("/api/projects/", get(routes::list_projects))
        .route(
            "/api/projects/{id}",
            get(routes::get_project).delete(routes::delete_project),
        )
        // Analysis
        .route("/api/analyze", post(routes::analyze_project))
        // Notes
        .route(
            "/api/notes/",
            get(routes::list_notes).post(routes::upsert_note),
        )
        .route("/api/notes/{*file_path}", get(routes::get_note))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Open the registry and serve the API until the process is stopped.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let registry_path = config.registry_path();
    let registry = ProjectRegistry::open(&registry_path)
        .with_context(|| format!("failed to open registry {}", registry_path.display()))?;
    info!("registry: {}", registry_path.display());

    let router = create_router(AppState::new(registry));
    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!("pydeps listening on http://{}", config.bind);

    axum::serve(listener, router).await?;
    Ok(())
}
