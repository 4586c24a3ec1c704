//! Delivery transports
//!
//! A [`DeliveryTransport`] is anything that can POST a JSON body to a URL and
//! hand back the status and body. [`HttpTransport`] is the reqwest-backed
//! implementation used by the binary; tests substitute scripted transports.

use crate::error::Result;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use thiserror::Error;

/// Response returned by an endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: String,
}

/// Why a single delivery attempt did not produce a response
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The attempt exceeded its time bound
    #[error("request timed out")]
    Timeout,

    /// The endpoint could not be reached (refused, DNS, unreachable)
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other request failure
    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

/// Capability to attempt delivery of a JSON body to one endpoint
#[async_trait]
pub trait DeliveryTransport: Send + Sync {
    /// POST `body` as `application/json` to `endpoint`
    async fn post_json(
        &self,
        endpoint: &str,
        body: &[u8],
    ) -> std::result::Result<DeliveryResponse, TransportError>;
}

/// reqwest-backed transport with a per-request timeout
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport whose requests are bounded by `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DeliveryTransport for HttpTransport {
    async fn post_json(
        &self,
        endpoint: &str,
        body: &[u8],
    ) -> std::result::Result<DeliveryResponse, TransportError> {
        tracing::debug!("POST {} ({} bytes)", endpoint, body.len());

        let response = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_vec())
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(DeliveryResponse { status, body })
    }
}
