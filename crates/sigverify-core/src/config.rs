//! Verifier configuration: endpoint, wire contract, and band policy.
//!
//! Backends disagree on field names (`original`/`test` vs. the legacy
//! `signature1`/`signature2`) and on the response shape (`match_score`
//! vs. `match`), so both are selected here at session construction and
//! never hard-coded elsewhere.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::classify::BandPolicy;
use crate::response::ResponseShape;
use crate::types::{CanvasSize, Slot};

/// Errors raised while loading or validating a [`VerifierConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The configuration document is not valid JSON for this schema.
    #[error("failed to parse verifier configuration: {0}")]
    Parse(String),

    /// The endpoint is not an absolute `http(s)` URL.
    #[error("endpoint must be an absolute http(s) URL, got {0:?}")]
    InvalidEndpoint(String),

    /// Field names are empty or identical.
    #[error("multipart field names must be non-empty and distinct, got {original:?} and {test:?}")]
    InvalidFieldNames {
        /// Configured name for the original sample.
        original: String,
        /// Configured name for the test sample.
        test: String,
    },

    /// Band thresholds are unordered or outside `[0, 100]`.
    #[error("invalid band thresholds: {0}")]
    InvalidThresholds(String),

    /// Canvas geometry cannot be rasterized.
    #[error("invalid canvas: {0}")]
    InvalidCanvas(String),
}

/// Multipart field names for the two samples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldNames {
    /// Part name for the original sample.
    pub original: String,
    /// Part name for the test sample.
    pub test: String,
}

impl FieldNames {
    /// The legacy `signature1`/`signature2` contract.
    #[must_use]
    pub fn legacy() -> Self {
        Self {
            original: "signature1".to_owned(),
            test: "signature2".to_owned(),
        }
    }

    /// The field name used for `slot`.
    #[must_use]
    pub fn for_slot(&self, slot: Slot) -> &str {
        match slot {
            Slot::Original => &self.original,
            Slot::Test => &self.test,
        }
    }
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            original: "original".to_owned(),
            test: "test".to_owned(),
        }
    }
}

/// Geometry of the drawing surface and its rasterization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Raster width in pixels.
    pub width: u32,
    /// Raster height in pixels.
    pub height: u32,
    /// Stroke width in pixels.
    pub stroke_width: f32,
}

impl CanvasConfig {
    /// The canvas dimensions.
    #[must_use]
    pub const fn size(&self) -> CanvasSize {
        CanvasSize {
            width: self.width,
            height: self.height,
        }
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 200,
            stroke_width: 3.0,
        }
    }
}

/// Everything a session needs to know about the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Absolute URL the multipart request is posted to.
    pub endpoint: String,

    /// Multipart part names.
    pub field_names: FieldNames,

    /// How the JSON reply is interpreted.
    pub response_shape: ResponseShape,

    /// How scores map onto outcome bands.
    pub band_policy: BandPolicy,

    /// Request deadline in milliseconds. `None` waits indefinitely.
    pub timeout_ms: Option<u64>,

    /// Drawing surface geometry.
    pub canvas: CanvasConfig,
}

impl VerifierConfig {
    /// Hosted verification endpoint.
    pub const DEFAULT_ENDPOINT: &'static str =
        "https://signature-recognition-0n3m.onrender.com/api/verify";

    /// Parse and validate a JSON configuration document.
    ///
    /// Missing keys take their [`Default`] values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON, or any
    /// validation error from [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every invariant the lifecycle relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant as a [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.endpoint.trim();
        let has_host = ["http://", "https://"]
            .iter()
            .any(|scheme| endpoint.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty()));
        if !has_host {
            return Err(ConfigError::InvalidEndpoint(self.endpoint.clone()));
        }

        let FieldNames { original, test } = &self.field_names;
        if original.is_empty() || test.is_empty() || original == test {
            return Err(ConfigError::InvalidFieldNames {
                original: original.clone(),
                test: test.clone(),
            });
        }

        self.band_policy.validate()?;

        let canvas = &self.canvas;
        if canvas.width == 0 || canvas.height == 0 {
            return Err(ConfigError::InvalidCanvas(format!(
                "{}x{} has no area",
                canvas.width, canvas.height
            )));
        }
        if !(canvas.stroke_width.is_finite() && canvas.stroke_width > 0.0) {
            return Err(ConfigError::InvalidCanvas(format!(
                "stroke width {} must be positive",
                canvas.stroke_width
            )));
        }
        Ok(())
    }

    /// The request deadline, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            endpoint: Self::DEFAULT_ENDPOINT.to_owned(),
            field_names: FieldNames::default(),
            response_shape: ResponseShape::default(),
            band_policy: BandPolicy::default(),
            timeout_ms: None,
            canvas: CanvasConfig::default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = VerifierConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.field_names.original, "original");
        assert_eq!(config.field_names.test, "test");
        assert_eq!(config.response_shape, ResponseShape::ScoreOrFlag);
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn legacy_field_names() {
        let names = FieldNames::legacy();
        assert_eq!(names.for_slot(Slot::Original), "signature1");
        assert_eq!(names.for_slot(Slot::Test), "signature2");
    }

    #[test]
    fn from_json_fills_missing_keys() {
        let config = VerifierConfig::from_json(
            r#"{
                "endpoint": "http://localhost:5000/verify",
                "field_names": { "original": "signature1", "test": "signature2" },
                "response_shape": "match_flag",
                "band_policy": { "policy": "two_band", "threshold": 50.0 },
                "timeout_ms": 15000
            }"#,
        )
        .unwrap();
        assert_eq!(config.endpoint, "http://localhost:5000/verify");
        assert_eq!(config.field_names, FieldNames::legacy());
        assert_eq!(config.response_shape, ResponseShape::MatchFlag);
        assert_eq!(config.band_policy, BandPolicy::TwoBand { threshold: 50.0 });
        assert_eq!(config.timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.canvas, CanvasConfig::default());
    }

    #[test]
    fn from_json_rejects_malformed() {
        let err = VerifierConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_relative_endpoint() {
        let config = VerifierConfig {
            endpoint: "/api/verify".into(),
            ..VerifierConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn rejects_duplicate_field_names() {
        let config = VerifierConfig {
            field_names: FieldNames {
                original: "file".into(),
                test: "file".into(),
            },
            ..VerifierConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidFieldNames { .. })
        ));
    }

    #[test]
    fn rejects_degenerate_canvas() {
        let config = VerifierConfig {
            canvas: CanvasConfig {
                width: 0,
                ..CanvasConfig::default()
            },
            ..VerifierConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidCanvas(_))));
    }
}
