//! Endpoint prober
//!
//! Tries each candidate endpoint in the order given, one at a time, and stops
//! at the first one that answers `200 OK`. Every per-attempt failure is
//! absorbed and recorded in the returned [`DeliveryReport`].

use crate::payload::MemoryPayload;
use crate::transport::{DeliveryTransport, TransportError};
use std::fmt;
use std::time::Duration;

/// Status an endpoint must return for the memory to count as saved
pub const SUCCESS_STATUS: u16 = 200;

/// Result of a single delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Endpoint answered with [`SUCCESS_STATUS`]
    Delivered { status: u16, body: String },
    /// Endpoint answered with any other status
    Rejected { status: u16, body: String },
    /// Attempt exceeded the per-attempt timeout
    TimedOut,
    /// Endpoint could not be reached or the request failed
    Failed { reason: String },
}

impl AttemptOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, AttemptOutcome::Delivered { .. })
    }
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptOutcome::Delivered { status, body } => {
                write!(f, "delivered (status {}): {}", status, body)
            }
            AttemptOutcome::Rejected { status, body } => {
                write!(f, "rejected with status {}: {}", status, body)
            }
            AttemptOutcome::TimedOut => write!(f, "timed out"),
            AttemptOutcome::Failed { reason } => write!(f, "{}", reason),
        }
    }
}

/// One endpoint tried and what happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    pub endpoint: String,
    pub outcome: AttemptOutcome,
}

/// Every attempt made during one delivery, in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub attempts: Vec<AttemptRecord>,
}

impl DeliveryReport {
    /// True when the last attempt delivered the memory
    pub fn is_success(&self) -> bool {
        self.attempts
            .last()
            .map(|a| a.outcome.is_delivered())
            .unwrap_or(false)
    }

    /// Endpoint and response body of the successful attempt, if any
    pub fn delivered(&self) -> Option<(&str, &str)> {
        self.attempts.last().and_then(|a| match &a.outcome {
            AttemptOutcome::Delivered { body, .. } => Some((a.endpoint.as_str(), body.as_str())),
            _ => None,
        })
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.len()
    }

    /// Endpoints tried, in order
    pub fn endpoints_tried(&self) -> Vec<&str> {
        self.attempts.iter().map(|a| a.endpoint.as_str()).collect()
    }
}

/// Sequential fallback across candidate endpoints
pub struct EndpointProber<T> {
    transport: T,
    attempt_timeout: Duration,
}

impl<T: DeliveryTransport> EndpointProber<T> {
    /// Create a prober that bounds each attempt by `attempt_timeout`
    pub fn new(transport: T, attempt_timeout: Duration) -> Self {
        Self {
            transport,
            attempt_timeout,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Deliver `payload` to the first endpoint that accepts it.
    ///
    /// Endpoints are tried strictly in the given order and each attempt
    /// completes before the next starts. Iteration stops at the first
    /// success; an empty list yields a failed report with no attempts.
    pub async fn attempt_delivery<S: AsRef<str>>(
        &self,
        payload: &MemoryPayload,
        endpoints: &[S],
    ) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        let body = match payload.to_json_body() {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Error: {}", e);
                return report;
            }
        };

        for endpoint in endpoints {
            let endpoint = endpoint.as_ref();
            tracing::info!("Trying endpoint: {}", endpoint);

            let outcome = self.attempt(endpoint, &body).await;
            match &outcome {
                AttemptOutcome::Delivered { body, .. } => {
                    tracing::info!("Endpoint {} accepted memory: {}", endpoint, body);
                }
                other => tracing::warn!("Error with {}: {}", endpoint, other),
            }

            let delivered = outcome.is_delivered();
            report.attempts.push(AttemptRecord {
                endpoint: endpoint.to_string(),
                outcome,
            });
            if delivered {
                return report;
            }
        }

        tracing::debug!(
            "No endpoint accepted memory after {} attempts",
            report.attempt_count()
        );
        report
    }

    async fn attempt(&self, endpoint: &str, body: &[u8]) -> AttemptOutcome {
        let call = self.transport.post_json(endpoint, body);
        match tokio::time::timeout(self.attempt_timeout, call).await {
            Err(_) | Ok(Err(TransportError::Timeout)) => AttemptOutcome::TimedOut,
            Ok(Err(e)) => AttemptOutcome::Failed {
                reason: e.to_string(),
            },
            Ok(Ok(response)) if response.status == SUCCESS_STATUS => AttemptOutcome::Delivered {
                status: response.status,
                body: response.body,
            },
            Ok(Ok(response)) => AttemptOutcome::Rejected {
                status: response.status,
                body: response.body,
            },
        }
    }
}
