//! Line chart for score trends and feature variation.

use dioxus::prelude::*;
use sigverify_core::charts::polyline_points;

const WIDTH: f64 = 300.0;
const HEIGHT: f64 = 120.0;

/// Props for the [`LineChart`] component.
#[derive(Props, Clone, PartialEq)]
pub struct LineChartProps {
    /// Chart heading.
    title: String,
    /// Values on a `[0, 100]` scale, in plotting order.
    values: Vec<f64>,
    /// Provenance note rendered under the chart (e.g. "Simulated data").
    caption: Option<String>,
    /// Text shown instead of the chart when `values` is empty.
    #[props(default = String::from("No data yet"))]
    empty_text: String,
}

/// A minimal SVG line chart on a fixed 0-100 scale.
#[component]
pub fn LineChart(props: LineChartProps) -> Element {
    let points = polyline_points(&props.values, WIDTH, HEIGHT);
    let mid = HEIGHT / 2.0;
    let title = &props.title;
    let empty_text = &props.empty_text;

    rsx! {
        figure { class: "bg-(--surface) border border-(--border) rounded-lg p-4 space-y-2",
            h3 { class: "text-base font-semibold text-(--text-heading)", "{title}" }
            if props.values.is_empty() {
                p { class: "text-(--muted) text-sm", "{empty_text}" }
            } else {
                svg {
                    class: "w-full h-30",
                    view_box: "0 0 {WIDTH} {HEIGHT}",
                    preserve_aspect_ratio: "none",
                    line { x1: "0", y1: "{mid}", x2: "{WIDTH}", y2: "{mid}", class: "stroke-(--border)", stroke_dasharray: "4 4" }
                    polyline { points, fill: "none", class: "stroke-(--btn-primary)", stroke_width: "2" }
                }
            }
            if let Some(ref caption) = props.caption {
                figcaption { class: "text-xs text-(--text-secondary) italic", "{caption}" }
            }
        }
    }
}
