//! Image relay subsystem.
//!
//! # Data Flow
//! ```text
//! GET /api/proxy-image?url=...
//!     → session.rs (validate URL, check allow-list)
//!     → transport.rs (plain or encrypted client, by scheme)
//!     → origin response head (deadline enforced)
//!     → session.rs (policy headers, copy content type/length)
//!     → origin body streamed to the client as it is polled
//! ```
//!
//! # Design Decisions
//! - No origin bytes are buffered; the client's read pace drives the origin read
//! - Dropping the client response drops the origin connection
//! - Origin status is not forwarded; a connected origin yields 200
//! - Nothing is retried

pub mod handler;
pub mod session;
pub mod transport;

use std::time::Duration;

use thiserror::Error;

use crate::http::response::ApiError;

pub use session::{ImageRelay, RelayTarget, CACHE_POLICY};
pub use transport::{OriginResponse, TransportKind, Transports};

/// Errors that end a relay session.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("image URL required")]
    MissingUrl,

    #[error("invalid URL")]
    InvalidUrl,

    #[error("host {0} is not allowed")]
    HostNotAllowed(String),

    /// DNS, connect, TLS or protocol failure before the response head.
    #[error("upstream request failed: {0}")]
    Upstream(String),

    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),

    /// Failure while preparing the session, before any network I/O.
    #[error("relay setup failed: {0}")]
    Internal(String),
}

impl RelayError {
    /// Metrics label for the failure class.
    pub fn outcome(&self) -> &'static str {
        match self {
            RelayError::MissingUrl | RelayError::InvalidUrl => "rejected",
            RelayError::HostNotAllowed(_) => "forbidden",
            RelayError::Upstream(_) | RelayError::Timeout(_) => "upstream_failure",
            RelayError::Internal(_) => "internal_failure",
        }
    }
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::MissingUrl | RelayError::InvalidUrl => {
                ApiError::BadRequest(err.to_string())
            }
            RelayError::HostNotAllowed(_) => ApiError::Forbidden(err.to_string()),
            RelayError::Upstream(_) | RelayError::Timeout(_) => {
                ApiError::Internal("failed to fetch image".to_string())
            }
            RelayError::Internal(_) => ApiError::internal(),
        }
    }
}
