//! Analysis result: status line, match/difference donut, and actions.

use std::f64::consts::PI;

use dioxus::prelude::*;
use sigverify_core::charts::pie_slices;
use sigverify_core::{OutcomeBand, SessionState, Snapshot};

/// Donut radius in SVG user units.
const RADIUS: f64 = 40.0;

/// Props for the [`ResultPanel`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ResultPanelProps {
    /// Latest session snapshot.
    snapshot: Snapshot,
    /// Called when the operator asks for a comparison.
    on_submit: EventHandler<()>,
    /// Called when the operator starts over.
    on_reset: EventHandler<()>,
}

/// Status card with the compare button.
///
/// The button is disabled and relabelled while a request is in flight.
/// That is cosmetic: the session itself ignores re-entrant submits.
#[component]
pub fn ResultPanel(props: ResultPanelProps) -> Element {
    let snap = &props.snapshot;
    let busy = matches!(snap.state, SessionState::Submitting);
    let status_class = match (snap.band, snap.error_kind) {
        (Some(OutcomeBand::StrongMatch), _) => "text-xl font-semibold text-(--strong)",
        (Some(OutcomeBand::PartialMatch), _) => "text-xl font-semibold text-(--partial)",
        (Some(OutcomeBand::WeakOrNoMatch), _) => "text-xl font-semibold text-(--weak)",
        (None, Some(_)) => "text-xl font-semibold text-(--text-error) bg-(--error-bg) p-2 rounded",
        (None, None) if busy => "text-xl font-semibold animate-pulse",
        (None, None) => "text-xl font-semibold",
    };
    let message = &snap.message;
    let elapsed = snap.elapsed.map(|d| d.as_millis());

    rsx! {
        section { class: "bg-(--surface) border border-(--border) rounded-lg p-4 space-y-3",
            h2 { class: "text-lg font-semibold text-(--text-heading)", "Analysis Result" }

            p { class: status_class, role: "status", "{message}" }

            if let Some(ref detail) = snap.detail {
                p { class: "text-(--muted) text-sm", "{detail}" }
            }

            if let Some(score) = snap.score {
                Donut { score }
                if let Some(ms) = elapsed {
                    p { class: "text-(--muted) text-sm", "Answered in {ms} ms" }
                }
            }

            div { class: "flex gap-2 pt-1",
                button {
                    class: if busy { "inline-flex items-center gap-1.5 px-4 py-2 rounded font-medium transition-colors bg-(--border) text-(--text-disabled) cursor-not-allowed" } else { "inline-flex items-center gap-1.5 px-4 py-2 rounded font-medium transition-colors bg-(--btn-primary) hover:bg-(--btn-primary-hover) text-white cursor-pointer" },
                    disabled: busy,
                    onclick: move |_| props.on_submit.call(()),
                    if busy { "Analyzing..." } else { "Compare Samples" }
                }
                button {
                    class: "inline-flex items-center gap-1.5 px-4 py-2 rounded font-medium transition-colors border border-(--border) text-(--text) cursor-pointer disabled:opacity-50 disabled:cursor-not-allowed",
                    onclick: move |_| props.on_reset.call(()),
                    "Reset"
                }
            }
        }
    }
}

/// Match/difference donut for one score.
#[component]
fn Donut(score: f64) -> Element {
    let [matched, difference] = pie_slices(score);
    let (dash, gap) = arc_dash(matched.value);
    let dasharray = format!("{dash:.2} {gap:.2}");
    let center = format!("{:.0}%", matched.value);
    let match_legend = format!("{} {:.1}%", matched.label, matched.value);
    let rest_legend = format!("{} {:.1}%", difference.label, difference.value);

    rsx! {
        figure { class: "flex flex-col items-center gap-2",
            svg { view_box: "0 0 100 100", width: "160", height: "160",
                circle {
                    cx: "50", cy: "50", r: "{RADIUS}",
                    fill: "none", class: "stroke-(--border)", stroke_width: "12",
                }
                circle {
                    cx: "50", cy: "50", r: "{RADIUS}",
                    fill: "none", class: "stroke-(--strong)", stroke_width: "12",
                    stroke_dasharray: "{dasharray}",
                    transform: "rotate(-90 50 50)",
                }
                text { x: "50", y: "55", text_anchor: "middle", class: "fill-(--text) text-base font-semibold",
                    "{center}"
                }
            }
            figcaption { class: "flex gap-4 text-sm text-(--muted)",
                span { class: "text-(--strong)", "{match_legend}" }
                span { class: "text-(--text-secondary)", "{rest_legend}" }
            }
        }
    }
}

/// Dash and gap lengths drawing `percent` of the donut's circumference.
fn arc_dash(percent: f64) -> (f64, f64) {
    let circumference = 2.0 * PI * RADIUS;
    let dash = circumference * percent / 100.0;
    (dash, circumference - dash)
}
