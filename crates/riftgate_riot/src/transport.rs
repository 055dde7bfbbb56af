//! HTTP transport seam.
//!
//! The gateway never talks to the network itself; it runs operations that
//! call a [`Transport`]. Production code uses [`ReqwestTransport`], tests
//! substitute their own implementation.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use riftgate_error::{UpstreamError, UpstreamErrorKind};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// Performs exactly one HTTP GET per call.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `url` and parse the body as JSON.
    ///
    /// # Errors
    ///
    /// Non-success statuses are returned as classified [`UpstreamError`]s;
    /// connection failures as `UpstreamErrorKind::Unknown` without a status.
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<Value, UpstreamError>;
}

/// Classify a non-success response.
///
/// A 429's `Retry-After` header (delay in seconds) is kept on the error.
pub fn classify_response(status: StatusCode, headers: &HeaderMap) -> UpstreamErrorKind {
    let reason = status.canonical_reason().unwrap_or("unrecognised status");
    match UpstreamErrorKind::from_status(status.as_u16(), reason) {
        UpstreamErrorKind::RateLimited { .. } => UpstreamErrorKind::RateLimited {
            retry_after: headers
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs),
        },
        kind => kind,
    }
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with a fresh connection pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self, headers))]
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<Value, UpstreamError> {
        let response = self
            .client
            .get(url)
            .headers(headers.clone())
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Upstream request did not complete");
                UpstreamError::new(UpstreamErrorKind::Unknown {
                    status: e.status().map(|s| s.as_u16()),
                    message: e.to_string(),
                })
            })?;

        let status = response.status();
        if !status.is_success() {
            let kind = classify_response(status, response.headers());
            if matches!(kind, UpstreamErrorKind::Unknown { .. }) {
                error!(status = status.as_u16(), %kind, "Unclassified upstream failure");
            } else {
                debug!(status = status.as_u16(), %kind, "Upstream returned failure status");
            }
            return Err(UpstreamError::new(kind));
        }

        response.json::<Value>().await.map_err(|e| {
            error!(status = status.as_u16(), error = %e, "Upstream body is not JSON");
            UpstreamError::new(UpstreamErrorKind::Unknown {
                status: Some(status.as_u16()),
                message: format!("undecodable response body: {}", e),
            })
        })
    }
}
