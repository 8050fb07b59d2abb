//! Chart data: score breakdown, feature variation, and the session-local
//! comparison log.
//!
//! Everything here is presentation data derived from session snapshots.
//! The lifecycle never reads it back.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::classify::{MAX_SCORE, OutcomeBand};
use crate::error::ErrorKind;
use crate::session::{SessionState, Snapshot};

/// One slice of the match/difference pie.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PieSlice {
    /// Legend label.
    pub label: &'static str,
    /// Share of the whole, in percent.
    pub value: f64,
}

/// Split a score into `Match` and `Difference` slices summing to 100.
///
/// Out-of-range input is clamped.
#[must_use]
pub fn pie_slices(score: f64) -> [PieSlice; 2] {
    let matched = if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, MAX_SCORE)
    };
    [
        PieSlice {
            label: "Match",
            value: matched,
        },
        PieSlice {
            label: "Difference",
            value: MAX_SCORE - matched,
        },
    ]
}

/// Map `values` onto an SVG polyline inside a `width` x `height` box.
///
/// Values are read on a `[0, 100]` scale with 100 at the top edge; points
/// are spread evenly across the width. Returns the `points` attribute.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn polyline_points(values: &[f64], width: f64, height: f64) -> String {
    let step = if values.len() > 1 {
        width / (values.len() - 1) as f64
    } else {
        0.0
    };
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let x = i as f64 * step;
            let y = height - v.clamp(0.0, MAX_SCORE) / MAX_SCORE * height;
            format!("{x:.1},{y:.1}")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Produces per-feature variation values for the line chart.
///
/// The verification service does not report per-feature data, so every
/// source shipped here is synthetic and must be labelled as such.
pub trait FeatureVariationSource {
    /// Human-readable provenance shown next to the chart.
    fn label(&self) -> &'static str;

    /// Draw `count` values in `[0, 100)`.
    fn sample(&mut self, count: usize) -> Vec<f64>;
}

/// Number of points the variation chart shows.
pub const VARIATION_POINTS: usize = 10;

/// Seeded pseudo-random variation data.
#[derive(Debug, Clone)]
pub struct SimulatedVariation {
    rng: StdRng,
}

impl SimulatedVariation {
    /// A reproducible source for `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl FeatureVariationSource for SimulatedVariation {
    fn label(&self) -> &'static str {
        "Simulated data"
    }

    fn sample(&mut self, count: usize) -> Vec<f64> {
        (0..count)
            .map(|_| f64::from(self.rng.random_range(0..100u32)))
            .collect()
    }
}

/// Outcome of one finished comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ComparisonOutcome {
    /// The service returned a score.
    Scored {
        /// Reported score.
        score: f64,
        /// Band under the active policy.
        band: OutcomeBand,
    },
    /// The request failed after being sent.
    Failed(ErrorKind),
}

/// One row of the recent comparisons table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparisonEntry {
    /// 1-based position in the session.
    pub sequence: u64,
    /// What happened.
    pub outcome: ComparisonOutcome,
}

/// Aggregate metrics over every comparison recorded this session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LogSummary {
    /// Comparisons sent to the service.
    pub total: u64,
    /// Comparisons that produced a score.
    pub succeeded: u64,
    /// Comparisons that failed after being sent.
    pub failed: u64,
    /// Scored comparisons in the strong band.
    pub strong_matches: u64,
    /// `strong_matches / succeeded` in percent; `None` before any score.
    pub match_rate: Option<f64>,
}

/// Default number of rows [`ComparisonLog`] retains.
pub const DEFAULT_LOG_CAPACITY: usize = 20;

/// Session-local history of finished comparisons. Never persisted.
///
/// Only outcomes of requests that reached the transport are recorded;
/// local validation failures are not comparisons.
#[derive(Debug, Clone)]
pub struct ComparisonLog {
    entries: VecDeque<ComparisonEntry>,
    capacity: usize,
    summary: LogSummary,
}

impl Default for ComparisonLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}

impl ComparisonLog {
    /// An empty log keeping at most `capacity` rows (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            summary: LogSummary::default(),
        }
    }

    /// Record `snapshot` if it is a finished comparison.
    ///
    /// Returns `true` if a row was added.
    pub fn record(&mut self, snapshot: &Snapshot) -> bool {
        let outcome = match snapshot.state {
            SessionState::Succeeded { band, score } => ComparisonOutcome::Scored { score, band },
            SessionState::Failed { kind } if kind != ErrorKind::EmptyInput => {
                ComparisonOutcome::Failed(kind)
            }
            _ => return false,
        };

        let summary = &mut self.summary;
        summary.total += 1;
        match outcome {
            ComparisonOutcome::Scored { band, .. } => {
                summary.succeeded += 1;
                if band == OutcomeBand::StrongMatch {
                    summary.strong_matches += 1;
                }
            }
            ComparisonOutcome::Failed(_) => summary.failed += 1,
        }
        summary.match_rate = rate(summary.strong_matches, summary.succeeded);

        if self.entries.len() == self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front(ComparisonEntry {
            sequence: summary.total,
            outcome,
        });
        true
    }

    /// Retained rows, newest first.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &ComparisonEntry> {
        self.entries.iter()
    }

    /// Metrics over every recorded comparison, including evicted rows.
    #[must_use]
    pub const fn summary(&self) -> LogSummary {
        self.summary
    }

    /// Retained scores, oldest first, for the trend chart.
    #[must_use]
    pub fn scores(&self) -> Vec<f64> {
        self.entries
            .iter()
            .rev()
            .filter_map(|entry| match entry.outcome {
                ComparisonOutcome::Scored { score, .. } => Some(score),
                ComparisonOutcome::Failed(_) => None,
            })
            .collect()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[allow(clippy::cast_precision_loss)]
fn rate(part: u64, whole: u64) -> Option<f64> {
    (whole > 0).then(|| part as f64 / whole as f64 * MAX_SCORE)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn snapshot(state: SessionState) -> Snapshot {
        Snapshot {
            state,
            score: None,
            band: None,
            error_kind: None,
            message: String::new(),
            detail: None,
            elapsed: None,
            generation: 1,
        }
    }

    fn scored(score: f64, band: OutcomeBand) -> Snapshot {
        snapshot(SessionState::Succeeded { band, score })
    }

    fn failed(kind: ErrorKind) -> Snapshot {
        snapshot(SessionState::Failed { kind })
    }

    #[test]
    fn pie_sums_to_hundred() {
        let [matched, diff] = pie_slices(82.0);
        assert_eq!(matched.label, "Match");
        assert_eq!(matched.value, 82.0);
        assert_eq!(diff.label, "Difference");
        assert_eq!(diff.value, 18.0);
    }

    #[test]
    fn pie_clamps() {
        assert_eq!(pie_slices(150.0)[0].value, 100.0);
        assert_eq!(pie_slices(-5.0)[1].value, 100.0);
        assert_eq!(pie_slices(f64::NAN)[0].value, 0.0);
    }

    #[test]
    fn polyline_spans_box() {
        assert_eq!(polyline_points(&[0.0, 50.0, 100.0], 200.0, 100.0), "0.0,100.0 100.0,50.0 200.0,0.0");
        assert_eq!(polyline_points(&[25.0], 200.0, 100.0), "0.0,75.0");
        assert_eq!(polyline_points(&[], 200.0, 100.0), "");
    }

    #[test]
    fn simulated_variation_is_reproducible_and_in_range() {
        let a = SimulatedVariation::seeded(7).sample(VARIATION_POINTS);
        let b = SimulatedVariation::seeded(7).sample(VARIATION_POINTS);
        assert_eq!(a, b);
        assert_eq!(a.len(), VARIATION_POINTS);
        assert!(a.iter().all(|v| (0.0..100.0).contains(v)));
        assert!(SimulatedVariation::seeded(7).label().contains("Simulated"));
    }

    #[test]
    fn log_ignores_non_terminal_and_validation_failures() {
        let mut log = ComparisonLog::default();
        assert!(!log.record(&snapshot(SessionState::Idle)));
        assert!(!log.record(&snapshot(SessionState::Submitting)));
        assert!(!log.record(&failed(ErrorKind::EmptyInput)));
        assert!(log.is_empty());
        assert_eq!(log.summary(), LogSummary::default());
    }

    #[test]
    fn log_is_newest_first_and_summarized() {
        let mut log = ComparisonLog::default();
        log.record(&scored(82.0, OutcomeBand::StrongMatch));
        log.record(&failed(ErrorKind::Server));
        log.record(&scored(45.0, OutcomeBand::PartialMatch));

        let sequences: Vec<u64> = log.entries().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![3, 2, 1]);
        assert_eq!(log.scores(), vec![82.0, 45.0]);

        let summary = log.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.strong_matches, 1);
        assert_eq!(summary.match_rate, Some(50.0));
    }

    #[test]
    fn log_evicts_oldest_but_keeps_totals() {
        let mut log = ComparisonLog::with_capacity(2);
        for score in [10.0, 20.0, 30.0] {
            log.record(&scored(score, OutcomeBand::WeakOrNoMatch));
        }
        assert_eq!(log.entries().len(), 2);
        assert_eq!(log.scores(), vec![20.0, 30.0]);
        assert_eq!(log.summary().total, 3);
        assert_eq!(log.summary().match_rate, Some(0.0));
    }
}
