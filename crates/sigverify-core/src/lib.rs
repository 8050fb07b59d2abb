//! sigverify-core: Signature verification request lifecycle (sans-IO).
//!
//! Takes two handwriting samples (uploaded files or freehand drawings)
//! through:
//! resolve -> build multipart request -> submit -> parse reply ->
//! classify score into an outcome band.
//!
//! A [`Session`] coordinates the steps as a state machine and hands the
//! actual network round trip to its caller. The only I/O seam is the
//! [`Transport`] trait; browser `fetch` lives in `sigverify-io`, tests use
//! in-memory fakes.

pub mod charts;
pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod resolve;
pub mod response;
pub mod session;
pub mod types;

pub use classify::{BandPolicy, OutcomeBand, classify};
pub use client::{HttpReply, HttpRequest, Transport, TransportError, VerificationClient};
pub use config::{CanvasConfig, ConfigError, FieldNames, VerifierConfig};
pub use error::{ErrorKind, VerifyError};
pub use request::{EncodedBody, VerificationRequest, build};
pub use resolve::{DrawingSurface, ImageInput, StrokeCanvas, resolve};
pub use response::{ResponseAdapter, ResponseShape, VerificationResponse};
pub use session::{Completion, PendingSubmission, Session, SessionState, Snapshot, SubmitAttempt};
pub use types::{BinaryImage, CanvasSize, Point, Slot, Stroke, UnsupportedFileType, UploadedFile};
