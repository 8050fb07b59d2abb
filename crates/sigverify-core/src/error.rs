//! Error taxonomy for a verification attempt.
//!
//! [`VerifyError`] carries the details of a single failure; [`ErrorKind`]
//! is the coarse, copyable classification the session stores and the
//! presentation layer renders. Every kind has its own operator message so
//! "fix your input", "try again later", and "contact the service owner"
//! stay distinguishable.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::Slot;

/// Longest server body excerpt kept on [`VerifyError::Server`].
const BODY_EXCERPT_LIMIT: usize = 200;

/// Coarse classification of a failed verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// One or both comparison inputs are missing or empty.
    EmptyInput,
    /// The service could not be reached (DNS, refused connection, CORS).
    Network,
    /// The request exceeded the configured deadline.
    Timeout,
    /// The service answered but the reply lacked a valid score.
    Protocol,
    /// The service answered with a non-success HTTP status.
    Server,
}

impl ErrorKind {
    /// Human-readable message shown to the operator for this kind.
    #[must_use]
    pub const fn operator_message(self) -> &'static str {
        match self {
            Self::EmptyInput => "Please provide both handwriting samples first.",
            Self::Network => "Could not reach the verification service. Check your connection and try again.",
            Self::Timeout => "The verification service took too long to respond. Try again later.",
            Self::Protocol => "The verification service returned an unreadable result. Contact the service owner.",
            Self::Server => "The verification service reported an error. Try again later or contact the service owner.",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::EmptyInput => "empty input",
            Self::Network => "network error",
            Self::Timeout => "timeout",
            Self::Protocol => "protocol error",
            Self::Server => "server error",
        })
    }
}

/// A failure anywhere in the verification lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    /// A comparison slot has no usable content.
    #[error("{slot} is missing or empty")]
    EmptyInput {
        /// The slot that failed validation.
        slot: Slot,
    },

    /// A drawing could not be rasterized into an image.
    #[error("failed to rasterize {slot}: {reason}")]
    Rasterize {
        /// The slot whose drawing failed.
        slot: Slot,
        /// Underlying encoder or canvas error.
        reason: String,
    },

    /// Transport-level failure before any HTTP response arrived.
    #[error("network error: {0}")]
    Network(String),

    /// No response within the configured deadline.
    #[error("request timed out after {} ms", .after.as_millis())]
    Timeout {
        /// The deadline that was exceeded.
        after: Duration,
    },

    /// A success status with a body that does not carry a valid score.
    #[error("invalid response: {0}")]
    Protocol(String),

    /// A non-success HTTP status.
    #[error("server returned HTTP {status}: {body}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Leading excerpt of the response body.
        body: String,
    },
}

impl VerifyError {
    /// Build a [`VerifyError::Server`], trimming the body to a short excerpt.
    #[must_use]
    pub fn server(status: u16, body: &[u8]) -> Self {
        let text = String::from_utf8_lossy(body);
        let text = text.trim();
        let body = match text.char_indices().nth(BODY_EXCERPT_LIMIT) {
            Some((cut, _)) => format!("{}...", &text[..cut]),
            None => text.to_owned(),
        };
        Self::Server { status, body }
    }

    /// The coarse kind the session records for this error.
    ///
    /// Rasterization failures count as [`ErrorKind::EmptyInput`]: the
    /// operator-side remedy is the same (redraw or re-select the sample).
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyInput { .. } | Self::Rasterize { .. } => ErrorKind::EmptyInput,
            Self::Network(_) => ErrorKind::Network,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Protocol(_) => ErrorKind::Protocol,
            Self::Server { .. } => ErrorKind::Server,
        }
    }
}
