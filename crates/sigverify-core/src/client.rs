//! Verification client: one POST per attempt through a pluggable
//! [`Transport`].
//!
//! The client owns the wire contract (multipart encoding, status
//! handling, reply parsing); the transport only moves bytes. Keeping the
//! transport behind a trait lets the browser use `fetch` while tests use
//! an in-memory fake.

use std::time::Duration;

use web_time::Instant;

use crate::config::VerifierConfig;
use crate::error::VerifyError;
use crate::request::VerificationRequest;
use crate::response::{ResponseAdapter, ResponseShape, VerificationResponse};

/// A fully encoded HTTP POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Absolute endpoint URL.
    pub url: String,
    /// `Content-Type` header value.
    pub content_type: String,
    /// Request body.
    pub body: Vec<u8>,
    /// Deadline after which the transport must give up.
    pub timeout: Option<Duration>,
}

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl HttpReply {
    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Failures that happen before any HTTP status is available.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Connection, DNS, or policy failure.
    #[error("network error: {0}")]
    Network(String),
    /// The deadline elapsed and the request was abandoned.
    #[error("timed out after {} ms", .0.as_millis())]
    Timeout(Duration),
}

impl From<TransportError> for VerifyError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Network(reason) => Self::Network(reason),
            TransportError::Timeout(after) => Self::Timeout { after },
        }
    }
}

/// Moves one request to the service and back.
///
/// Implementations perform a single attempt and never retry.
#[allow(async_fn_in_trait)] // Single-threaded callers; Send bounds are not needed.
pub trait Transport {
    /// Send `request` and wait for the reply.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Network`] if no response arrived and
    /// [`TransportError::Timeout`] if `request.timeout` elapsed first.
    async fn send(&self, request: HttpRequest) -> Result<HttpReply, TransportError>;
}

/// Submits verification requests to one configured endpoint.
#[derive(Debug, Clone)]
pub struct VerificationClient<T> {
    transport: T,
    endpoint: String,
    shape: ResponseShape,
    timeout: Option<Duration>,
}

impl<T: Transport> VerificationClient<T> {
    /// Create a client for the endpoint, reply shape, and deadline in
    /// `config`.
    #[must_use]
    pub fn new(transport: T, config: &VerifierConfig) -> Self {
        Self {
            transport,
            endpoint: config.endpoint.clone(),
            shape: config.response_shape,
            timeout: config.timeout(),
        }
    }

    /// The underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `request` and parse the reply.
    ///
    /// The request is consumed; its buffers are released when this
    /// future completes.
    ///
    /// # Errors
    ///
    /// - [`VerifyError::Network`] / [`VerifyError::Timeout`] when the
    ///   transport fails.
    /// - [`VerifyError::Server`] for a non-2xx status.
    /// - [`VerifyError::Protocol`] for a 2xx reply without a valid score.
    #[allow(clippy::future_not_send)] // WASM is single-threaded; Send is not needed
    pub async fn submit(
        &self,
        request: VerificationRequest,
    ) -> Result<VerificationResponse, VerifyError> {
        let encoded = request.encode_multipart();
        drop(request);

        let http = HttpRequest {
            url: self.endpoint.clone(),
            content_type: encoded.content_type,
            body: encoded.bytes,
            timeout: self.timeout,
        };
        log::debug!("POST {} ({} bytes)", http.url, http.body.len());

        let started = Instant::now();
        let reply = self.transport.send(http).await.inspect_err(|e| {
            log::warn!("verification request failed: {e}");
        })?;
        let elapsed = started.elapsed();

        if !reply.is_success() {
            log::warn!("verification service returned HTTP {}", reply.status);
            return Err(VerifyError::server(reply.status, &reply.body));
        }

        let response = self.shape.parse(&reply.body, elapsed)?;
        log::info!(
            "verification score {} in {} ms",
            response.match_score,
            elapsed.as_millis()
        );
        Ok(response)
    }
}
