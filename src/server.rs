//! HTTP transport: `POST /invoke` (named-operation call), `GET /tools`
//! (discovery), `GET /health`.
//!
//! Every invocation outcome is an envelope with HTTP 200; the envelope's
//! status field carries success or failure. Timeouts are a caller concern.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::tools::Dispatcher;

/// Invocation request: tool name plus argument object.
#[derive(Debug, Deserialize)]
pub struct InvokeRequest {
    pub tool: String,
    #[serde(default)]
    pub arguments: Value,
}

/// Shared server state: the dispatcher, which owns the registry.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("server bind: {0}")]
    Bind(String),
    #[error("server: {0}")]
    Serve(String),
}

/// Build the router; separate from [`serve`] so tests can drive it directly.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/tools", get(handle_tools))
        .route("/invoke", post(handle_invoke))
        .with_state(state)
}

async fn handle_health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

async fn handle_tools(State(state): State<AppState>) -> Json<Value> {
    let tools = state.dispatcher.registry().list();
    Json(json!({ "tools": tools }))
}

async fn handle_invoke(
    State(state): State<AppState>,
    Json(req): Json<InvokeRequest>,
) -> Json<Value> {
    let envelope = state.dispatcher.invoke(&req.tool, &req.arguments).await;
    Json(envelope.to_value())
}

/// Bind and serve until shutdown.
pub async fn serve(host: &str, port: u16, state: AppState) -> Result<(), ServerError> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| ServerError::Bind(format!("{host}:{port}: {e}")))?;
    tracing::info!(%addr, "listening");
    axum::Server::bind(&addr)
        .serve(router(state).into_make_service())
        .await
        .map_err(|e| ServerError::Serve(e.to_string()))
}
