//! HTTP routes for the dashboard frontend.
//!
//! Every handler reads from the shared [`Geodash`] instance. The map and
//! stats routes never fail; only `/api/data` reports an error, when the CSV
//! could not be loaded.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use geodash_core::Geodash;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub app: Arc<Geodash>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Build the router with CORS open to any origin and request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/data", get(data))
        .route("/api/map", get(map))
        .route("/api/stats", get(stats))
        .route("/api/chat", post(chat))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(state: AppState, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "message": "Geodash backend is running.",
    }))
}

async fn data(State(state): State<AppState>) -> Response {
    match state.app.dataset().get() {
        Some(dataset) => Json(&dataset.records).into_response(),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": "Failed to load CSV data" })),
        )
            .into_response(),
    }
}

async fn map(State(state): State<AppState>) -> Response {
    let png = state.app.raster().preview().await;
    let mut resp = Response::new(png.into());
    resp.headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("image/png"));
    resp
}

async fn stats(State(state): State<AppState>) -> Response {
    Json(state.app.raster().stats().await).into_response()
}

async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    let response = state.app.chat(&request.message).await;
    Json(ChatResponse { response }).into_response()
}
