//! Freehand drawing pad rendered as inline SVG.
//!
//! Pointer events are captured into a [`Stroke`] while the pen is down;
//! the finished stroke is handed to the parent on pen-up. Strokes are
//! stored in `viewBox` units, which match the canvas' pixel size, so the
//! rasterized PNG lines up with what the operator saw even when the pad
//! is rendered smaller than its configured size.

use std::fmt::Write;

use std::rc::Rc;

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdEraser;
use sigverify_core::{CanvasSize, Point, Stroke};

/// Props for the [`DrawPad`] component.
#[derive(Props, Clone, PartialEq)]
pub struct DrawPadProps {
    /// Completed strokes, in drawing order.
    strokes: Vec<Stroke>,
    /// Canvas size in pixels.
    size: CanvasSize,
    /// Pen width in pixels.
    stroke_width: f32,
    /// Called with each completed stroke.
    on_stroke: EventHandler<Stroke>,
    /// Called when the operator clears the pad.
    on_clear: EventHandler<()>,
}

/// A white drawing surface with a clear button.
#[component]
pub fn DrawPad(props: DrawPadProps) -> Element {
    let mut current = use_signal(|| Option::<Stroke>::None);
    let mut mounted = use_signal(|| Option::<Rc<MountedData>>::None);
    let mut rendered = use_signal(|| Option::<(f64, f64)>::None);
    let size = props.size;
    let CanvasSize { width, height } = size;
    let on_stroke = props.on_stroke;

    // Re-read the on-screen box; layout can change between strokes.
    let measure = move || {
        let Some(element) = mounted.peek().clone() else {
            return;
        };
        spawn(async move {
            match element.get_client_rect().await {
                Ok(rect) => rendered.set(Some((rect.size.width, rect.size.height))),
                Err(e) => log::debug!("draw pad not measured: {e:?}"),
            }
        });
    };

    let mut finish = move || {
        if let Some(stroke) = current.take() {
            on_stroke.call(stroke);
        }
    };

    let pen_width = props.stroke_width;
    let radius = pen_width / 2.0;
    let live = current.read().clone();
    let empty = props.strokes.is_empty() && live.is_none();

    rsx! {
        div { class: "space-y-2",
            svg {
                class: "block max-w-full h-auto bg-white rounded outline outline-(--border) touch-none cursor-crosshair",
                width: "{width}",
                height: "{height}",
                view_box: "0 0 {width} {height}",
                onmounted: move |evt: MountedEvent| {
                    mounted.set(Some(evt.data()));
                    measure();
                },
                onpointerenter: move |_| measure(),
                onpointerdown: move |evt| {
                    evt.prevent_default();
                    let at = to_point(&evt, rendered(), size);
                    current.set(Some(Stroke::new(vec![at])));
                    measure();
                },
                onpointermove: move |evt| {
                    let at = to_point(&evt, rendered(), size);
                    if let Some(stroke) = current.write().as_mut() {
                        stroke.push(at);
                    }
                },
                onpointerup: move |_| finish(),
                onpointerleave: move |_| finish(),

                rect { width: "100%", height: "100%", fill: "white" }

                for (i, stroke) in props.strokes.iter().chain(live.as_ref()).enumerate() {
                    if let [Point { x, y }] = stroke.points() {
                        circle { key: "{i}", cx: "{x}", cy: "{y}", r: "{radius}", fill: "black" }
                    } else {
                        polyline {
                            key: "{i}",
                            points: svg_points(stroke),
                            fill: "none",
                            stroke: "black",
                            stroke_width: "{pen_width}",
                            stroke_linecap: "round",
                            stroke_linejoin: "round",
                        }
                    }
                }
            }

            div { class: "flex items-center justify-between",
                if empty {
                    span { class: "text-(--muted) text-sm", "Draw the signature above" }
                }
                button {
                    class: "inline-flex items-center gap-1.5 px-4 py-2 rounded font-medium transition-colors border border-(--border) text-(--text) cursor-pointer disabled:opacity-50 disabled:cursor-not-allowed",
                    disabled: empty,
                    onclick: move |_| {
                        current.set(None);
                        props.on_clear.call(());
                    },
                    Icon { width: 16, height: 16, icon: LdEraser }
                    "Clear"
                }
            }
        }
    }
}

fn to_point(evt: &PointerEvent, rendered: Option<(f64, f64)>, size: CanvasSize) -> Point {
    let at = evt.element_coordinates();
    to_canvas(at.x, at.y, rendered, size)
}

/// Map a position in rendered CSS pixels onto the canvas' `viewBox`.
///
/// The SVG fits its `viewBox` into the rendered box with one uniform
/// scale and centres it (`xMidYMid meet`), so the inverse is that scale
/// plus the letterbox offset. Unmeasured or collapsed boxes map 1:1.
fn to_canvas(x: f64, y: f64, rendered: Option<(f64, f64)>, size: CanvasSize) -> Point {
    let Some((rendered_w, rendered_h)) = rendered.filter(|&(w, h)| w > 0.0 && h > 0.0) else {
        return Point::new(x, y);
    };
    let (w, h) = (f64::from(size.width), f64::from(size.height));
    let scale = (w / rendered_w).max(h / rendered_h);
    let dx = (rendered_w - w / scale) / 2.0;
    let dy = (rendered_h - h / scale) / 2.0;
    Point::new((x - dx) * scale, (y - dy) * scale)
}

/// Format a stroke as an SVG `points` attribute.
fn svg_points(stroke: &Stroke) -> String {
    let mut out = String::new();
    for (i, p) in stroke.points().iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{:.1},{:.1}", p.x, p.y);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn svg_points_format() {
        let stroke = Stroke::new(vec![Point::new(1.0, 2.0), Point::new(3.3, 4.5)]);
        assert_eq!(svg_points(&stroke), "1.0,2.0 3.3,4.5");
        assert_eq!(svg_points(&Stroke::default()), "");
    }

    const CANVAS: CanvasSize = CanvasSize {
        width: 400,
        height: 200,
    };

    fn assert_near(actual: Point, x: f64, y: f64) {
        assert!(
            (actual.x - x).abs() < 1e-9 && (actual.y - y).abs() < 1e-9,
            "{actual:?} != ({x}, {y})"
        );
    }

    #[test]
    fn to_canvas_at_configured_size_is_identity() {
        assert_near(to_canvas(120.0, 80.0, Some((400.0, 200.0)), CANVAS), 120.0, 80.0);
        assert_near(to_canvas(120.0, 80.0, None, CANVAS), 120.0, 80.0);
        assert_near(to_canvas(120.0, 80.0, Some((0.0, 0.0)), CANVAS), 120.0, 80.0);
    }

    #[test]
    fn to_canvas_scales_up_a_shrunken_pad() {
        // 400x200 canvas shown at 300x150: the visual right edge is x=400.
        assert_near(to_canvas(300.0, 150.0, Some((300.0, 150.0)), CANVAS), 400.0, 200.0);
        assert_near(to_canvas(150.0, 75.0, Some((300.0, 150.0)), CANVAS), 200.0, 100.0);
    }

    #[test]
    fn to_canvas_removes_letterbox_offset() {
        // Width shrunk to 300 but height kept at 200: content is 300x150,
        // centred with 25px bands above and below.
        let rendered = Some((300.0, 200.0));
        assert_near(to_canvas(0.0, 25.0, rendered, CANVAS), 0.0, 0.0);
        assert_near(to_canvas(150.0, 100.0, rendered, CANVAS), 200.0, 100.0);
        assert_near(to_canvas(300.0, 175.0, rendered, CANVAS), 400.0, 200.0);
    }
}
