//! Session state machine: coordinates inputs, submission, and results.
//!
//! ```text
//!           inputs complete            begin_submit
//!   Idle ───────────────────▶ Ready ───────────────▶ Submitting
//!    ▲  ◀─────────────────── │   ▲                    │      │
//!    │     slot emptied          │ input change   Ok  │      │ Err
//!    │                           │                    ▼      ▼
//!    └──── reset ──────────── Succeeded ◀──────  complete(gen, ..)
//!                             Failed    ◀──────
//! ```
//!
//! The session is sans-IO. [`Session::begin_submit`] hands back a
//! [`PendingSubmission`] carrying the request and its generation; the
//! caller drives the network call and reports back through
//! [`Session::complete`]. Two guards hold regardless of what the UI
//! does:
//!
//! - While `Submitting`, further submits are ignored, so at most one
//!   request per session is ever in flight.
//! - Every reset or mid-flight input change bumps the request
//!   generation; completions tagged with an older generation are
//!   discarded without touching state.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::classify::{OutcomeBand, classify};
use crate::config::{ConfigError, VerifierConfig};
use crate::error::{ErrorKind, VerifyError};
use crate::request::{VerificationRequest, build};
use crate::resolve::{DrawingSurface, ImageInput, StrokeCanvas, resolve};
use crate::response::VerificationResponse;
use crate::types::{BinaryImage, Slot, Stroke, UploadedFile};

/// Lifecycle state of one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    /// At least one slot is missing or empty.
    Idle,
    /// Both slots hold non-empty inputs.
    Ready,
    /// A request is in flight.
    Submitting,
    /// The service scored the pair.
    Succeeded {
        /// Band derived from `score`.
        band: OutcomeBand,
        /// Score reported by the service.
        score: f64,
    },
    /// The attempt failed.
    Failed {
        /// Classification of the failure.
        kind: ErrorKind,
    },
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Ready => f.write_str("ready"),
            Self::Submitting => f.write_str("submitting"),
            Self::Succeeded { band, score } => write!(f, "succeeded ({band}, {score})"),
            Self::Failed { kind } => write!(f, "failed ({kind})"),
        }
    }
}

/// Read-only view of a session, published on every state transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Current state.
    pub state: SessionState,
    /// Score, when `Succeeded`.
    pub score: Option<f64>,
    /// Outcome band, when `Succeeded`.
    pub band: Option<OutcomeBand>,
    /// Failure classification, when `Failed`.
    pub error_kind: Option<ErrorKind>,
    /// Operator-facing status line.
    pub message: String,
    /// Technical detail of the last failure, if any.
    pub detail: Option<String>,
    /// Round trip of the request that produced a success.
    pub elapsed: Option<Duration>,
    /// Current request generation.
    pub generation: u64,
}

/// A request that has been admitted and must be sent by the caller.
#[derive(Debug)]
#[must_use = "a pending submission must be sent and completed, or the session stays Submitting"]
pub struct PendingSubmission {
    /// Generation to pass back to [`Session::complete`].
    pub generation: u64,
    /// The request to send.
    pub request: VerificationRequest,
}

/// Outcome of [`Session::begin_submit`].
#[derive(Debug)]
pub enum SubmitAttempt {
    /// Inputs resolved; the caller must send the request.
    Started(PendingSubmission),
    /// Validation failed before any request was built; the session is
    /// now `Failed`.
    Rejected(VerifyError),
    /// The session was not accepting submits; nothing changed.
    Ignored,
}

/// Outcome of [`Session::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The result was applied to the session.
    Applied,
    /// The result belonged to a superseded request and was dropped.
    Discarded,
}

type Observer = Box<dyn FnMut(&Snapshot)>;

/// One comparison session: two input slots and the request lifecycle.
pub struct Session {
    config: VerifierConfig,
    original: Option<ImageInput>,
    test: Option<ImageInput>,
    state: SessionState,
    generation: u64,
    last_error: Option<VerifyError>,
    last_response: Option<VerificationResponse>,
    observers: Vec<Observer>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("original", &self.original)
            .field("test", &self.test)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::with_valid_config(VerifierConfig::default())
    }
}

impl Session {
    /// Create an `Idle` session.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant of `config`.
    pub fn new(config: VerifierConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    const fn with_valid_config(config: VerifierConfig) -> Self {
        Self {
            config,
            original: None,
            test: None,
            state: SessionState::Idle,
            generation: 0,
            last_error: None,
            last_response: None,
            observers: Vec::new(),
        }
    }

    /// The configuration the session was built with.
    #[must_use]
    pub const fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Current request generation.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` while a request is in flight.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        matches!(self.state, SessionState::Submitting)
    }

    /// The input held in `slot`, if any.
    #[must_use]
    pub const fn input(&self, slot: Slot) -> Option<&ImageInput> {
        match slot {
            Slot::Original => self.original.as_ref(),
            Slot::Test => self.test.as_ref(),
        }
    }

    /// The drawing held in `slot`, if the slot is in drawing mode.
    #[must_use]
    pub const fn canvas(&self, slot: Slot) -> Option<&StrokeCanvas> {
        match self.input(slot) {
            Some(ImageInput::Drawn(canvas)) => Some(canvas),
            _ => None,
        }
    }

    /// Register a callback invoked with a fresh [`Snapshot`] after every
    /// state transition.
    ///
    /// Observers see state changes only. An operation that leaves the
    /// state as it was publishes nothing; call [`Session::snapshot`] for
    /// the current view.
    pub fn observe(&mut self, observer: impl FnMut(&Snapshot) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Put a selected file in `slot`, replacing whatever was there.
    pub fn select_file(&mut self, slot: Slot, file: UploadedFile) {
        log::debug!("{slot}: selected {} ({})", file.name(), file.mime_type());
        *self.slot_mut(slot) = Some(ImageInput::Uploaded(file));
        self.input_changed();
    }

    /// Switch `slot` to drawing mode with an empty canvas.
    ///
    /// A slot that is already in drawing mode keeps its strokes.
    pub fn use_canvas(&mut self, slot: Slot) {
        if self.canvas(slot).is_some() {
            return;
        }
        let canvas = StrokeCanvas::new(self.config.canvas);
        *self.slot_mut(slot) = Some(ImageInput::Drawn(canvas));
        self.input_changed();
    }

    /// Append a completed stroke to the drawing in `slot`, switching the
    /// slot to drawing mode first if needed. Empty strokes are ignored.
    pub fn add_stroke(&mut self, slot: Slot, stroke: Stroke) {
        if stroke.is_empty() {
            return;
        }
        let config = self.config.canvas;
        match self.slot_mut(slot) {
            Some(ImageInput::Drawn(canvas)) => canvas.push_stroke(stroke),
            entry => {
                let mut canvas = StrokeCanvas::new(config);
                canvas.push_stroke(stroke);
                *entry = Some(ImageInput::Drawn(canvas));
            }
        }
        self.input_changed();
    }

    /// Erase the drawing in `slot`. No effect on uploaded files.
    pub fn clear_canvas(&mut self, slot: Slot) {
        if let Some(ImageInput::Drawn(canvas)) = self.slot_mut(slot) {
            canvas.clear();
            self.input_changed();
        }
    }

    /// Empty `slot` entirely.
    pub fn remove_input(&mut self, slot: Slot) {
        if self.slot_mut(slot).take().is_some() {
            self.input_changed();
        }
    }

    /// Try to start a submission.
    ///
    /// - `Ready` / `Failed`: both inputs are resolved and a fresh request
    ///   is built under a new generation; the session enters
    ///   `Submitting`.
    /// - `Idle`: a slot is missing, so the attempt fails validation with
    ///   [`ErrorKind::EmptyInput`] and no request is built.
    /// - `Submitting` / `Succeeded`: ignored.
    pub fn begin_submit(&mut self) -> SubmitAttempt {
        match self.state {
            SessionState::Submitting | SessionState::Succeeded { .. } => {
                log::debug!("submit ignored while {}", self.state);
                return SubmitAttempt::Ignored;
            }
            SessionState::Idle | SessionState::Ready | SessionState::Failed { .. } => {}
        }

        match self.resolve_inputs() {
            Ok((original, test)) => {
                self.generation += 1;
                self.last_error = None;
                self.last_response = None;
                let request = build(original, test, &self.config.field_names);
                self.transition(SessionState::Submitting);
                SubmitAttempt::Started(PendingSubmission {
                    generation: self.generation,
                    request,
                })
            }
            Err(err) => {
                log::info!("submission rejected: {err}");
                self.fail(err.clone());
                SubmitAttempt::Rejected(err)
            }
        }
    }

    /// Apply the result of the request tagged `generation`.
    ///
    /// Results from superseded generations, or arriving when the session
    /// is no longer `Submitting`, are discarded.
    pub fn complete(
        &mut self,
        generation: u64,
        result: Result<VerificationResponse, VerifyError>,
    ) -> Completion {
        if generation != self.generation || !self.is_submitting() {
            log::debug!(
                "discarding result for generation {generation} (current {}, {})",
                self.generation,
                self.state
            );
            return Completion::Discarded;
        }

        match result {
            Ok(response) => {
                let score = response.match_score;
                let band = classify(score, &self.config.band_policy);
                self.last_response = Some(response);
                self.transition(SessionState::Succeeded { band, score });
            }
            Err(err) => self.fail(err),
        }
        Completion::Applied
    }

    /// Drop both inputs and any in-flight request, returning to `Idle`.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.original = None;
        self.test = None;
        self.last_error = None;
        self.last_response = None;
        self.transition(SessionState::Idle);
    }

    /// Read-only view of the current state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let (score, band, error_kind) = match self.state {
            SessionState::Succeeded { band, score } => (Some(score), Some(band), None),
            SessionState::Failed { kind } => (None, None, Some(kind)),
            SessionState::Idle | SessionState::Ready | SessionState::Submitting => {
                (None, None, None)
            }
        };
        Snapshot {
            state: self.state,
            score,
            band,
            error_kind,
            message: self.message(),
            detail: self.last_error.as_ref().map(ToString::to_string),
            elapsed: self.last_response.map(|r| r.elapsed),
            generation: self.generation,
        }
    }

    /// Operator-facing status line for the current state.
    #[must_use]
    pub fn message(&self) -> String {
        match self.state {
            SessionState::Idle => "Pending".to_owned(),
            SessionState::Ready => "Ready to compare".to_owned(),
            SessionState::Submitting => "Analyzing handwriting...".to_owned(),
            SessionState::Succeeded { band, score } => format!("{band} ({score}%)"),
            SessionState::Failed { kind } => kind.operator_message().to_owned(),
        }
    }

    const fn slot_mut(&mut self, slot: Slot) -> &mut Option<ImageInput> {
        match slot {
            Slot::Original => &mut self.original,
            Slot::Test => &mut self.test,
        }
    }

    fn resolve_inputs(&self) -> Result<(BinaryImage, BinaryImage), VerifyError> {
        let resolve_slot = |slot| {
            self.input(slot)
                .ok_or(VerifyError::EmptyInput { slot })
                .and_then(|input| resolve(input, slot))
        };
        Ok((resolve_slot(Slot::Original)?, resolve_slot(Slot::Test)?))
    }

    fn both_present(&self) -> bool {
        Slot::ALL
            .iter()
            .all(|&slot| self.input(slot).is_some_and(|input| !input.is_empty()))
    }

    /// Any input change discards the previous result. A change while a
    /// request is in flight supersedes that request.
    fn input_changed(&mut self) {
        if self.is_submitting() {
            self.generation += 1;
            log::debug!("input changed mid-flight; now generation {}", self.generation);
        }
        self.last_error = None;
        self.last_response = None;
        let next = if self.both_present() {
            SessionState::Ready
        } else {
            SessionState::Idle
        };
        self.transition(next);
    }

    fn fail(&mut self, err: VerifyError) {
        let kind = err.kind();
        self.last_error = Some(err);
        self.last_response = None;
        self.transition(SessionState::Failed { kind });
    }

    fn transition(&mut self, next: SessionState) {
        if self.state == next {
            return;
        }
        log::debug!("session {} -> {next}", self.state);
        self.state = next;
        let snapshot = self.snapshot();
        for observer in &mut self.observers {
            observer(&snapshot);
        }
    }
}
