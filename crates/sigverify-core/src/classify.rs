//! Result classification: map a match score onto outcome bands.
//!
//! The active [`BandPolicy`] is a parameter, never a constant: some
//! deployments use a binary match/no-match split, others a three-band
//! strong/partial/weak split. Bands are closed on their lower edge and
//! open on their upper edge, except the top band which also includes 100.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Upper end of the score scale.
pub const MAX_SCORE: f64 = 100.0;

/// Discrete classification of a match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeBand {
    /// Score at or above the strong (or binary) threshold.
    StrongMatch,
    /// Score between the partial and strong thresholds (three-band only).
    PartialMatch,
    /// Score below every threshold.
    WeakOrNoMatch,
}

impl OutcomeBand {
    /// Display label for the band.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::StrongMatch => "Strong Match",
            Self::PartialMatch => "Partial Match",
            Self::WeakOrNoMatch => "Weak or No Match",
        }
    }
}

impl fmt::Display for OutcomeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Thresholds that partition `[0, 100]` into outcome bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum BandPolicy {
    /// `score >= strong` is strong, `score >= partial` is partial,
    /// anything lower is weak.
    ThreeBand {
        /// Lower edge of [`OutcomeBand::StrongMatch`].
        strong: f64,
        /// Lower edge of [`OutcomeBand::PartialMatch`].
        partial: f64,
    },
    /// `score >= threshold` is a match, anything lower is not.
    TwoBand {
        /// Lower edge of [`OutcomeBand::StrongMatch`].
        threshold: f64,
    },
}

impl BandPolicy {
    /// Default three-band strong threshold.
    pub const DEFAULT_STRONG: f64 = 70.0;
    /// Default three-band partial threshold.
    pub const DEFAULT_PARTIAL: f64 = 40.0;

    /// Check that the thresholds are ordered and inside the score scale.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidThresholds`] unless
    /// `0 < partial < strong <= 100` (three-band) or
    /// `0 < threshold <= 100` (two-band).
    pub fn validate(&self) -> Result<(), ConfigError> {
        let in_scale = |t: f64| t.is_finite() && t > 0.0 && t <= MAX_SCORE;
        let ok = match *self {
            Self::ThreeBand { strong, partial } => {
                in_scale(strong) && in_scale(partial) && partial < strong
            }
            Self::TwoBand { threshold } => in_scale(threshold),
        };
        if ok {
            Ok(())
        } else {
            Err(ConfigError::InvalidThresholds(format!("{self:?}")))
        }
    }
}

impl Default for BandPolicy {
    fn default() -> Self {
        Self::ThreeBand {
            strong: Self::DEFAULT_STRONG,
            partial: Self::DEFAULT_PARTIAL,
        }
    }
}

/// Classify a score under the given policy.
///
/// Total over every `f64`: scores are expected in `[0, 100]` (the
/// response parser rejects anything else), and a NaN falls through to
/// [`OutcomeBand::WeakOrNoMatch`].
#[must_use]
pub fn classify(score: f64, policy: &BandPolicy) -> OutcomeBand {
    match *policy {
        BandPolicy::ThreeBand { strong, partial } => {
            if score >= strong {
                OutcomeBand::StrongMatch
            } else if score >= partial {
                OutcomeBand::PartialMatch
            } else {
                OutcomeBand::WeakOrNoMatch
            }
        }
        BandPolicy::TwoBand { threshold } => {
            if score >= threshold {
                OutcomeBand::StrongMatch
            } else {
                OutcomeBand::WeakOrNoMatch
            }
        }
    }
}
