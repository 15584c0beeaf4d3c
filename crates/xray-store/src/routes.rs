//! Trace store REST API
//!
//! POST  /api/traces        - Create a trace
//! PATCH /api/traces/:id    - Update a trace's status
//! POST  /api/steps         - Append a step
//! GET   /api/traces        - List traces, most recent first
//! GET   /api/traces/:id    - Get a trace with its steps

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use xray_core::{NewStep, NewTrace, StatusUpdate, Step, Trace, TraceId, TraceWithSteps};

use crate::error::Result;
use crate::repository::TraceRepository;

/// Build the store router with all routes mounted under `/api`
pub fn router(repo: TraceRepository) -> Router {
    let api = Router::new()
        .route("/traces", post(create_trace).get(list_traces))
        .route("/traces/:id", get(get_trace).patch(update_trace))
        .route("/steps", post(create_step))
        .route("/health", get(health));

    Router::new()
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(repo)
}

/// Serve the store on an already-bound listener until the task is dropped
pub async fn serve(listener: TcpListener, repo: TraceRepository) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Trace store listening on {addr}");
    }
    axum::serve(listener, router(repo)).await
}

async fn create_trace(
    State(repo): State<TraceRepository>,
    Json(request): Json<NewTrace>,
) -> Result<Json<Trace>> {
    Ok(Json(repo.create_trace(&request).await?))
}

async fn update_trace(
    State(repo): State<TraceRepository>,
    Path(id): Path<TraceId>,
    Json(request): Json<StatusUpdate>,
) -> Result<Json<Trace>> {
    Ok(Json(repo.update_trace_status(&id, &request.status).await?))
}

async fn create_step(
    State(repo): State<TraceRepository>,
    Json(request): Json<NewStep>,
) -> Result<Json<Step>> {
    Ok(Json(repo.create_step(&request).await?))
}

async fn list_traces(State(repo): State<TraceRepository>) -> Result<Json<Vec<Trace>>> {
    Ok(Json(repo.list_traces().await?))
}

async fn get_trace(
    State(repo): State<TraceRepository>,
    Path(id): Path<TraceId>,
) -> Result<Json<TraceWithSteps>> {
    Ok(Json(repo.get_trace_detail(&id).await?))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
