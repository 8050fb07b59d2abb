//! Response adapters: interpret the service's JSON reply.
//!
//! This module defines the [`ResponseAdapter`] trait for extracting a
//! score from a reply body and the [`ResponseShape`] enum for selecting
//! which backend contract is active.
//!
//! A missing or invalid score is always a [`VerifyError::Protocol`]; a
//! reply is never silently read as a score of 0.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::classify::MAX_SCORE;
use crate::error::VerifyError;

/// JSON key carrying the numeric score.
pub const SCORE_FIELD: &str = "match_score";

/// JSON key carrying the legacy boolean verdict.
pub const FLAG_FIELD: &str = "match";

/// Score extracted from a successful reply.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerificationResponse {
    /// Similarity score in `[0, 100]`.
    pub match_score: f64,

    /// Legacy boolean verdict, when the score was derived from one.
    pub matched: Option<bool>,

    /// Wall-clock round trip of the request.
    pub elapsed: Duration,
}

/// Which reply contract the backend speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseShape {
    /// `{ "match_score": number }` only.
    MatchScore,
    /// `{ "match": boolean }` only; `true` reads as 100, `false` as 0.
    MatchFlag,
    /// Prefer `match_score`, fall back to `match`.
    #[default]
    ScoreOrFlag,
}

/// Extracts a score from a successful reply body.
pub trait ResponseAdapter {
    /// Parse `body` into a response, stamping it with `elapsed`.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Protocol`] if the body is not JSON or does
    /// not carry a valid score for this contract.
    fn parse(&self, body: &[u8], elapsed: Duration) -> Result<VerificationResponse, VerifyError>;
}

impl ResponseAdapter for ResponseShape {
    fn parse(&self, body: &[u8], elapsed: Duration) -> Result<VerificationResponse, VerifyError> {
        let json: Value = serde_json::from_slice(body)
            .map_err(|e| VerifyError::Protocol(format!("reply is not JSON: {e}")))?;
        let Value::Object(fields) = json else {
            return Err(VerifyError::Protocol("reply is not a JSON object".into()));
        };

        let score = fields.get(SCORE_FIELD);
        let flag = fields.get(FLAG_FIELD);
        let (match_score, matched) = match (*self, score, flag) {
            (Self::MatchScore | Self::ScoreOrFlag, Some(score), _) => (read_score(score)?, None),
            (Self::MatchFlag, _, Some(flag)) | (Self::ScoreOrFlag, None, Some(flag)) => {
                let matched = read_flag(flag)?;
                (if matched { MAX_SCORE } else { 0.0 }, Some(matched))
            }
            (Self::MatchScore, None, _) => {
                return Err(VerifyError::Protocol(format!("reply has no `{SCORE_FIELD}`")));
            }
            (Self::MatchFlag, _, None) => {
                return Err(VerifyError::Protocol(format!("reply has no `{FLAG_FIELD}`")));
            }
            (Self::ScoreOrFlag, None, None) => {
                return Err(VerifyError::Protocol(format!(
                    "reply has neither `{SCORE_FIELD}` nor `{FLAG_FIELD}`"
                )));
            }
        };

        Ok(VerificationResponse {
            match_score,
            matched,
            elapsed,
        })
    }
}

/// Read a finite score in `[0, 100]`.
fn read_score(value: &Value) -> Result<f64, VerifyError> {
    let score = value.as_f64().ok_or_else(|| {
        VerifyError::Protocol(format!("`{SCORE_FIELD}` is not a number: {value}"))
    })?;
    if score.is_finite() && (0.0..=MAX_SCORE).contains(&score) {
        Ok(score)
    } else {
        Err(VerifyError::Protocol(format!(
            "`{SCORE_FIELD}` {score} is outside [0, 100]"
        )))
    }
}

fn read_flag(value: &Value) -> Result<bool, VerifyError> {
    value
        .as_bool()
        .ok_or_else(|| VerifyError::Protocol(format!("`{FLAG_FIELD}` is not a boolean: {value}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    const RTT: Duration = Duration::from_millis(12);

    fn parse(shape: ResponseShape, body: &str) -> Result<VerificationResponse, VerifyError> {
        shape.parse(body.as_bytes(), RTT)
    }

    #[test]
    fn score_is_read() {
        let resp = parse(ResponseShape::MatchScore, r#"{"match_score": 82}"#).unwrap();
        assert_eq!(resp.match_score, 82.0);
        assert_eq!(resp.matched, None);
        assert_eq!(resp.elapsed, RTT);
    }

    #[test]
    fn fractional_score_is_kept() {
        let resp = parse(ResponseShape::ScoreOrFlag, r#"{"match_score": 69.999}"#).unwrap();
        assert_eq!(resp.match_score, 69.999);
    }

    #[test]
    fn empty_object_is_protocol_error_not_zero() {
        for shape in [
            ResponseShape::MatchScore,
            ResponseShape::MatchFlag,
            ResponseShape::ScoreOrFlag,
        ] {
            let err = parse(shape, "{}").unwrap_err();
            assert!(matches!(err, VerifyError::Protocol(_)), "{shape:?}: {err:?}");
        }
    }

    #[test]
    fn flag_fallback() {
        let resp = parse(ResponseShape::ScoreOrFlag, r#"{"match": true}"#).unwrap();
        assert_eq!(resp.match_score, 100.0);
        assert_eq!(resp.matched, Some(true));

        let resp = parse(ResponseShape::MatchFlag, r#"{"match": false}"#).unwrap();
        assert_eq!(resp.match_score, 0.0);
        assert_eq!(resp.matched, Some(false));
    }

    #[test]
    fn score_preferred_over_flag() {
        let resp =
            parse(ResponseShape::ScoreOrFlag, r#"{"match_score": 55, "match": true}"#).unwrap();
        assert_eq!(resp.match_score, 55.0);
        assert_eq!(resp.matched, None);
    }

    #[test]
    fn flag_only_contract_ignores_score() {
        let err = parse(ResponseShape::MatchFlag, r#"{"match_score": 55}"#).unwrap_err();
        assert!(matches!(err, VerifyError::Protocol(_)));
    }

    #[test]
    fn score_only_contract_ignores_flag() {
        let err = parse(ResponseShape::MatchScore, r#"{"match": true}"#).unwrap_err();
        assert!(matches!(err, VerifyError::Protocol(_)));
    }

    #[test]
    fn invalid_scores_are_rejected() {
        for body in [
            r#"{"match_score": null}"#,
            r#"{"match_score": "82"}"#,
            r#"{"match_score": -1}"#,
            r#"{"match_score": 100.5}"#,
        ] {
            let err = parse(ResponseShape::ScoreOrFlag, body).unwrap_err();
            assert!(matches!(err, VerifyError::Protocol(_)), "{body}: {err:?}");
        }
    }

    #[test]
    fn non_object_bodies_are_rejected() {
        for body in ["", "not json", "[82]", "82"] {
            let err = parse(ResponseShape::ScoreOrFlag, body).unwrap_err();
            assert!(matches!(err, VerifyError::Protocol(_)), "{body:?}: {err:?}");
        }
    }

    #[test]
    fn non_boolean_flag_is_rejected() {
        let err = parse(ResponseShape::MatchFlag, r#"{"match": "yes"}"#).unwrap_err();
        assert!(matches!(err, VerifyError::Protocol(_)));
    }
}
