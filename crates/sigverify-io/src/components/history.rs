//! Recent comparisons table and session metrics.

use dioxus::prelude::*;
use sigverify_core::charts::{ComparisonEntry, ComparisonOutcome, LogSummary};

/// Props for the [`HistoryPanel`] component.
#[derive(Props, Clone, PartialEq)]
pub struct HistoryPanelProps {
    /// Retained rows, newest first.
    entries: Vec<ComparisonEntry>,
    /// Totals over the whole session.
    summary: LogSummary,
}

/// Metrics cards plus a table of this session's comparisons.
#[component]
pub fn HistoryPanel(props: HistoryPanelProps) -> Element {
    let LogSummary {
        total,
        succeeded,
        failed,
        strong_matches,
        match_rate,
    } = props.summary;
    let rate = match_rate.map_or_else(|| "-".to_owned(), |r| format!("{r:.0}%"));

    rsx! {
        section { class: "bg-(--surface) border border-(--border) rounded-lg p-4 space-y-3",
            h2 { class: "text-lg font-semibold text-(--text-heading)", "This Session" }

            div { class: "flex flex-wrap gap-4",
                Metric { label: "Comparisons", value: total.to_string() }
                Metric { label: "Scored", value: succeeded.to_string() }
                Metric { label: "Failed", value: failed.to_string() }
                Metric { label: "Strong Matches", value: strong_matches.to_string() }
                Metric { label: "Match Rate", value: rate }
            }

            if props.entries.is_empty() {
                p { class: "text-(--muted) text-sm", "No comparisons yet" }
            } else {
                table { class: "w-full text-sm text-left border-collapse",
                    thead {
                        tr {
                            th { class: "py-1 border-b border-(--border)", "#" }
                            th { class: "py-1 border-b border-(--border)", "Result" }
                            th { class: "py-1 border-b border-(--border)", "Score" }
                        }
                    }
                    tbody {
                        for (sequence, entry) in props.entries.iter().map(|e| (e.sequence, *e)) {
                            Row { key: "{sequence}", entry }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn Metric(label: &'static str, value: String) -> Element {
    rsx! {
        div { class: "flex flex-col min-w-28",
            span { class: "text-2xl font-semibold tabular-nums", "{value}" }
            span { class: "text-xs text-(--text-secondary)", "{label}" }
        }
    }
}

#[component]
fn Row(entry: ComparisonEntry) -> Element {
    let (result, score) = describe(&entry.outcome);
    let sequence = entry.sequence;
    rsx! {
        tr {
            td { class: "py-1 tabular-nums", "{sequence}" }
            td { class: "py-1", "{result}" }
            td { class: "py-1 tabular-nums", "{score}" }
        }
    }
}

/// Result and score cells for one outcome.
fn describe(outcome: &ComparisonOutcome) -> (String, String) {
    match outcome {
        ComparisonOutcome::Scored { score, band } => (band.to_string(), format!("{score}%")),
        ComparisonOutcome::Failed(kind) => (format!("Failed ({kind})"), "-".to_owned()),
    }
}
