//! Relay sessions.
//!
//! A session walks `ValidatingInput → Connecting → StreamingBody`; any
//! step may end it with a [`RelayError`]. Each step is a separate value so a
//! session cannot stream before it has been validated and admitted.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use futures_util::TryStreamExt;
use url::Url;

use crate::config::RelayConfig;
use crate::observability::metrics;
use crate::relay::transport::{OriginResponse, TransportKind, Transports};
use crate::relay::RelayError;

/// `Cache-Control` sent with every relayed image (one year, shared caches).
pub const CACHE_POLICY: &str = "public, max-age=31536000";

/// Cross-origin headers that let browsers read relay responses.
pub fn apply_cors_policy(headers: &mut HeaderMap) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("GET"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
}

/// A validated target URL and the transport that will reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayTarget {
    pub url: Url,
    pub transport: TransportKind,
}

impl RelayTarget {
    /// Validate the caller-supplied URL. No network I/O happens here.
    pub fn parse(raw: Option<&str>) -> Result<Self, RelayError> {
        let raw = raw.filter(|s| !s.is_empty()).ok_or(RelayError::MissingUrl)?;
        let url = Url::parse(raw).map_err(|_| RelayError::InvalidUrl)?;
        if url.host_str().map_or(true, str::is_empty) {
            return Err(RelayError::InvalidUrl);
        }

        Ok(Self {
            transport: TransportKind::for_url(&url),
            url,
        })
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }
}

/// Relays images from origins to HTTP callers.
#[derive(Clone)]
pub struct ImageRelay {
    transports: Transports,
    allowed_hosts: Arc<[String]>,
    deadline: Duration,
}

impl ImageRelay {
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        let allowed_hosts = config
            .allowed_hosts
            .iter()
            .map(|h| h.trim().trim_start_matches('.').to_ascii_lowercase())
            .collect::<Vec<_>>();

        if allowed_hosts.is_empty() {
            tracing::warn!("Image relay accepts any origin host (relay.allowed_hosts is empty)");
        }

        Ok(Self {
            transports: Transports::new(config)?,
            allowed_hosts: allowed_hosts.into(),
            deadline: Duration::from_secs(config.upstream_timeout_secs),
        })
    }

    /// Check the target host against the allow-list.
    pub fn admit(&self, target: &RelayTarget) -> Result<(), RelayError> {
        if self.allowed_hosts.is_empty() {
            return Ok(());
        }
        let host = target.host();
        let allowed = self.allowed_hosts.iter().any(|entry| {
            host == entry
                || host
                    .strip_suffix(entry.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        });
        if allowed {
            Ok(())
        } else {
            Err(RelayError::HostNotAllowed(host.to_string()))
        }
    }

    /// Validate `raw`, connect to the origin and wait for its response head.
    pub async fn open(&self, raw: Option<&str>) -> Result<OriginResponse, RelayError> {
        let target = RelayTarget::parse(raw)?;
        self.admit(&target)?;

        tracing::debug!(
            url = %target.url,
            transport = target.transport.as_str(),
            "Connecting to origin"
        );

        let fetch = self.transports.fetch(target.transport, &target.url);
        match tokio::time::timeout(self.deadline, fetch).await {
            Ok(result) => result,
            Err(_) => Err(RelayError::Timeout(self.deadline)),
        }
    }
}

impl OriginResponse {
    /// Build the client response: fixed policy headers, the copied origin
    /// head fields, and the origin body streamed as it is polled.
    pub fn into_response(self) -> Response {
        let transport = self.transport.as_str();
        let stream = self
            .body
            .into_data_stream()
            .inspect_ok(move |chunk| metrics::record_relay_bytes(transport, chunk.len()))
            .inspect_err(move |e| {
                metrics::record_relay_session(transport, "aborted");
                tracing::warn!(transport, error = %e, "Origin body stream failed");
            });

        let mut response = Response::new(Body::from_stream(stream));
        *response.status_mut() = StatusCode::OK;

        let headers = response.headers_mut();
        apply_cors_policy(headers);
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_POLICY));
        if let Some(content_type) = self.content_type {
            headers.insert(header::CONTENT_TYPE, content_type);
        }
        if let Some(content_length) = self.content_length {
            headers.insert(header::CONTENT_LENGTH, content_length);
        }

        response
    }
}
