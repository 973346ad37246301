//! `GET /api/proxy-image`.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::http::request::request_id;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::relay::session::apply_cors_policy;
use crate::relay::RelayError;

#[derive(Debug, Deserialize)]
pub struct ProxyImageQuery {
    pub url: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/proxy-image", get(proxy_image))
}

async fn proxy_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<ProxyImageQuery>, QueryRejection>,
) -> Response {
    let request_id = request_id(&headers);

    let raw = match &query {
        Ok(Query(q)) => q.url.as_deref(),
        Err(_) => return failure(request_id, RelayError::InvalidUrl),
    };

    match state.relay.open(raw).await {
        Ok(origin) => {
            tracing::debug!(
                request_id = %request_id,
                transport = origin.transport.as_str(),
                content_type = ?origin.content_type,
                "Streaming origin body"
            );
            metrics::record_relay_session(origin.transport.as_str(), "streaming");
            origin.into_response()
        }
        Err(err) => failure(request_id, err),
    }
}

fn failure(request_id: &str, err: RelayError) -> Response {
    match &err {
        RelayError::Upstream(_) | RelayError::Timeout(_) | RelayError::Internal(_) => {
            tracing::error!(request_id = %request_id, error = %err, "Image relay failed");
        }
        _ => {
            tracing::debug!(request_id = %request_id, error = %err, "Image relay request rejected")
        }
    }
    metrics::record_relay_session("none", err.outcome());

    let mut response = ApiError::from(err).into_response();
    apply_cors_policy(response.headers_mut());
    response
}
