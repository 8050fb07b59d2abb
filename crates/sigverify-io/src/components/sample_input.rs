//! One comparison slot: upload or draw, with a mode toggle.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::{LdPencil, LdUpload};
use sigverify_core::{CanvasConfig, Slot, Stroke, UploadedFile};

use super::draw_pad::DrawPad;
use super::upload::SampleUpload;

/// How a slot acquires its sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// File upload.
    #[default]
    Upload,
    /// Freehand drawing.
    Draw,
}

/// Props for the [`SampleInput`] component.
#[derive(Props, Clone, PartialEq)]
pub struct SampleInputProps {
    /// Slot this card fills.
    slot: Slot,
    /// Active acquisition mode.
    mode: InputMode,
    /// Name of the uploaded file, in upload mode.
    file_name: Option<String>,
    /// Preview URL of the uploaded file, in upload mode.
    preview: Option<String>,
    /// Strokes drawn so far, in draw mode.
    strokes: Vec<Stroke>,
    /// Drawing surface geometry.
    canvas: CanvasConfig,
    /// Called when the operator switches mode.
    on_mode: EventHandler<InputMode>,
    /// Called with a selected file.
    on_file: EventHandler<UploadedFile>,
    /// Called with each completed stroke.
    on_stroke: EventHandler<Stroke>,
    /// Called when the drawing is cleared.
    on_clear: EventHandler<()>,
}

/// Card holding one sample, switchable between upload and drawing.
#[component]
pub fn SampleInput(props: SampleInputProps) -> Element {
    let mode = props.mode;
    let title = props.slot.label();
    let tab = move |target: InputMode| {
        if mode == target {
            "inline-flex items-center gap-1 px-3 py-1 rounded border border-(--btn-primary) bg-(--btn-primary) text-white cursor-pointer"
        } else {
            "inline-flex items-center gap-1 px-3 py-1 rounded border border-(--border) text-(--text) cursor-pointer"
        }
    };

    rsx! {
        section { class: "bg-(--surface) border border-(--border) rounded-lg p-4 space-y-3",
            header { class: "flex items-center justify-between",
                h2 { class: "text-lg font-semibold text-(--text-heading)", "{title}" }
                div { class: "flex gap-1", role: "tablist",
                    button {
                        class: tab(InputMode::Upload),
                        role: "tab",
                        onclick: move |_| props.on_mode.call(InputMode::Upload),
                        Icon { width: 14, height: 14, icon: LdUpload }
                        "Upload"
                    }
                    button {
                        class: tab(InputMode::Draw),
                        role: "tab",
                        onclick: move |_| props.on_mode.call(InputMode::Draw),
                        Icon { width: 14, height: 14, icon: LdPencil }
                        "Draw"
                    }
                }
            }

            if mode == InputMode::Upload {
                SampleUpload {
                    slot: props.slot,
                    file_name: props.file_name.clone(),
                    preview: props.preview.clone(),
                    on_select: props.on_file,
                }
            } else {
                DrawPad {
                    strokes: props.strokes.clone(),
                    size: props.canvas.size(),
                    stroke_width: props.canvas.stroke_width,
                    on_stroke: props.on_stroke,
                    on_clear: props.on_clear,
                }
            }
        }
    }
}
