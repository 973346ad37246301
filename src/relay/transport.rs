//! Origin transports.
//!
//! # Responsibilities
//! - Hold one plain (HTTP) and one encrypted (HTTPS) client per process
//! - Issue the origin GET and expose the response as a streaming body
//!
//! # Design Decisions
//! - The plain side is a hyper client with a bare `HttpConnector`; it cannot
//!   speak TLS at all
//! - The encrypted side is a rustls `reqwest` client restricted to HTTPS
//! - Neither client follows redirects

use std::path::Path;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Request, Uri};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use url::Url;

use crate::config::RelayConfig;
use crate::relay::RelayError;

const USER_AGENT: &str = concat!("games-api/", env!("CARGO_PKG_VERSION"));

/// Which client reaches the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Plain,
    Encrypted,
}

impl TransportKind {
    /// `https` selects the encrypted client; every other scheme the plain one.
    pub fn for_url(url: &Url) -> Self {
        if url.scheme() == "https" {
            TransportKind::Encrypted
        } else {
            TransportKind::Plain
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransportKind::Plain => "plain",
            TransportKind::Encrypted => "encrypted",
        }
    }
}

/// Head fields copied from the origin plus its unread body.
pub struct OriginResponse {
    pub transport: TransportKind,
    pub content_type: Option<HeaderValue>,
    pub content_length: Option<HeaderValue>,
    pub body: Body,
}

impl OriginResponse {
    fn new(transport: TransportKind, headers: &HeaderMap, body: Body) -> Self {
        Self {
            transport,
            content_type: headers.get(header::CONTENT_TYPE).cloned(),
            content_length: headers.get(header::CONTENT_LENGTH).cloned(),
            body,
        }
    }
}

fn load_root_cert(path: &Path) -> Result<reqwest::Certificate, RelayError> {
    let pem = std::fs::read(path).map_err(|e| {
        RelayError::Internal(format!("cannot read root certificate {}: {}", path.display(), e))
    })?;
    reqwest::Certificate::from_pem(&pem).map_err(|e| {
        RelayError::Internal(format!("invalid root certificate {}: {}", path.display(), e))
    })
}

/// The pair of clients shared by all relay sessions.
#[derive(Clone)]
pub struct Transports {
    plain: Client<HttpConnector, Body>,
    encrypted: reqwest::Client,
}

impl Transports {
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        let connect_timeout = Duration::from_secs(config.connect_timeout_secs);

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(connect_timeout));
        let plain = Client::builder(TokioExecutor::new()).build(connector);

        let mut builder = reqwest::Client::builder()
            .https_only(true)
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(connect_timeout)
            .user_agent(USER_AGENT);
        for path in &config.extra_root_certs {
            builder = builder.add_root_certificate(load_root_cert(path)?);
        }
        let encrypted = builder
            .build()
            .map_err(|e| RelayError::Internal(format!("TLS client setup failed: {}", e)))?;

        Ok(Self { plain, encrypted })
    }

    /// GET `url` over the chosen transport and return once the head arrives.
    pub async fn fetch(
        &self,
        kind: TransportKind,
        url: &Url,
    ) -> Result<OriginResponse, RelayError> {
        match kind {
            TransportKind::Plain => self.fetch_plain(url).await,
            TransportKind::Encrypted => self.fetch_encrypted(url).await,
        }
    }

    async fn fetch_plain(&self, url: &Url) -> Result<OriginResponse, RelayError> {
        let uri: Uri = url.as_str().parse().map_err(|_| RelayError::InvalidUrl)?;
        let request = Request::get(uri)
            .header(header::USER_AGENT, USER_AGENT)
            .body(Body::empty())
            .map_err(|e| RelayError::Internal(e.to_string()))?;

        let response = self
            .plain
            .request(request)
            .await
            .map_err(|e| RelayError::Upstream(format!("{:?}", e)))?;

        let (parts, body): (_, hyper::body::Incoming) = response.into_parts();
        Ok(OriginResponse::new(TransportKind::Plain, &parts.headers, Body::new(body)))
    }

    async fn fetch_encrypted(&self, url: &Url) -> Result<OriginResponse, RelayError> {
        let response = self
            .encrypted
            .get(url.clone())
            .send()
            .await
            .map_err(|e| RelayError::Upstream(format!("{:?}", e)))?;

        let headers = response.headers().clone();
        let body = Body::from_stream(response.bytes_stream());
        Ok(OriginResponse::new(TransportKind::Encrypted, &headers, body))
    }
}
