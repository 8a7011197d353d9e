use axum::extract::{ConnectInfo, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::client_key::ClientKey;
use crate::error::Result;
use crate::pipeline::Pipeline;
use crate::response::ExtractionResponse;

/// Shared application context, built once at startup and handed to every
/// request task.
pub struct AppState {
    pub pipeline: Pipeline,
}

#[derive(Debug, Deserialize)]
pub struct ExtractParams {
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub store: String,
}

/// `GET /keywords?url=...` — the whole request pipeline. Failures convert to
/// their status/body pairs through the error's `IntoResponse`.
pub async fn extract_keywords(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExtractParams>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> Result<Json<ExtractionResponse>> {
    let client = ClientKey::from_parts(&headers, connect_info.map(|ConnectInfo(addr)| addr));
    let response = state.pipeline.run(params.url.as_deref(), &client).await?;

    Ok(Json(response))
}

/// `GET /health` — liveness plus a live store ping.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let store = if state.pipeline.store_available().await {
        "connected"
    } else {
        "unreachable"
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        store: store.to_string(),
    })
}
