//! Sample upload zone with drag-and-drop and file picker.

use dioxus::html::{FileData, HasFileData};
use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdUpload;
use sigverify_core::{Slot, UploadedFile};

/// Props for the [`SampleUpload`] component.
#[derive(Props, Clone, PartialEq)]
pub struct SampleUploadProps {
    /// Which comparison slot this zone fills.
    slot: Slot,
    /// Name of the file currently held by the slot.
    file_name: Option<String>,
    /// Object URL previewing the current file.
    preview: Option<String>,
    /// Called with the validated file after a successful read.
    on_select: EventHandler<UploadedFile>,
}

/// A drag-and-drop zone with a file picker button.
///
/// Reads the first dropped or picked file and forwards it as an
/// [`UploadedFile`]; anything not recognized as an image is rejected
/// here, before it reaches the session.
#[component]
pub fn SampleUpload(props: SampleUploadProps) -> Element {
    let mut dragging = use_signal(|| false);
    let mut error = use_signal(|| Option::<String>::None);
    let slot = props.slot;

    // Shared by the picker and drop paths.
    let process_files = move |files: Vec<FileData>| async move {
        let Some(file) = files.first() else {
            return;
        };
        let name = file.name();
        let bytes = match file.read_bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                error.set(Some(format!("Failed to read file: {e}")));
                return;
            }
        };
        match UploadedFile::new(name, bytes) {
            Ok(upload) => {
                log::debug!("{slot}: read {} ({} bytes)", upload.name(), upload.bytes().len());
                error.set(None);
                props.on_select.call(upload);
            }
            Err(e) => error.set(Some(e.to_string())),
        }
    };

    let handle_files = move |evt: FormEvent| async move {
        process_files(evt.files()).await;
    };

    let handle_drop = move |evt: DragEvent| async move {
        evt.prevent_default();
        dragging.set(false);
        process_files(evt.files()).await;
    };

    let border_class = if dragging() {
        "border-(--btn-primary) bg-(--active-bg)"
    } else {
        "border-(--border)"
    };

    rsx! {
        div {
            class: "border-2 border-dashed rounded-lg p-6 text-center transition-colors {border_class}",
            ondragover: move |evt| {
                evt.prevent_default();
                dragging.set(true);
            },
            ondragleave: move |_| {
                dragging.set(false);
            },
            ondrop: handle_drop,

            if let Some(ref url) = props.preview {
                img {
                    class: "mx-auto mb-3 max-h-48 max-w-full rounded object-contain",
                    src: "{url}",
                    alt: "{slot} preview",
                }
            }

            if let Some(ref name) = props.file_name {
                p { class: "text-(--text-success) mb-2", "Loaded: {name}" }
            }

            if let Some(ref err) = error() {
                p { class: "text-(--text-error) mb-2", "{err}" }
            }

            p { class: "text-(--text-secondary) mb-3", "Drop an image here or " }

            label { class: "inline-flex items-center gap-1.5 px-4 py-2 rounded font-medium transition-colors bg-(--btn-primary) hover:bg-(--btn-primary-hover) text-white cursor-pointer",
                input {
                    r#type: "file",
                    accept: "image/*",
                    class: "hidden",
                    onchange: handle_files,
                }
                Icon { width: 16, height: 16, icon: LdUpload }
                "Choose File"
            }

            p { class: "text-(--muted) text-sm mt-2", "PNG, JPEG, BMP, WebP, GIF" }
        }
    }
}
