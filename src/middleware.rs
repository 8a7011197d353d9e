use axum::extract::{ConnectInfo, Request};
use axum::middleware::Next;
use axum::response::Response;
use std::net::SocketAddr;
use tracing::info;

use crate::client_key::client_ip;

/// Request/response logging for every route.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0);
    let client = client_ip(request.headers(), peer);

    info!(
        target: "kew::http",
        method = %method,
        uri = %uri,
        client = %client,
        "incoming request"
    );

    let response = next.run(request).await;

    info!(
        target: "kew::http",
        method = %method,
        uri = %uri,
        status = %response.status(),
        "request completed"
    );

    response
}
