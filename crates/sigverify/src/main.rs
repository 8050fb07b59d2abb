use std::cell::RefCell;
use std::rc::Rc;

use dioxus::prelude::*;
use sigverify_core::charts::{
    ComparisonLog, FeatureVariationSource, SimulatedVariation, VARIATION_POINTS,
};
use sigverify_core::{
    Completion, DrawingSurface, ImageInput, Session, SessionState, Slot, SubmitAttempt,
    UploadedFile, VerificationClient, VerifierConfig,
};
use sigverify_io::{FetchTransport, HistoryPanel, InputMode, LineChart, ResultPanel, SampleInput, raster};

/// Deployment configuration, embedded at build time.
const VERIFIER_JSON: &str = include_str!("../verifier.json");

fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(log::Level::Debug));
    dioxus::launch(app);
}

/// Build the session from the embedded configuration, falling back to
/// defaults if it does not parse or validate.
fn new_session() -> Session {
    match VerifierConfig::from_json(VERIFIER_JSON).and_then(Session::new) {
        Ok(session) => session,
        Err(e) => {
            log::warn!("verifier.json rejected ({e}); using built-in defaults");
            Session::default()
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clock_seed() -> u64 {
    js_sys::Date::now() as u64
}

const fn slot_index(slot: Slot) -> usize {
    match slot {
        Slot::Original => 0,
        Slot::Test => 1,
    }
}

/// Root application component.
///
/// Owns the verification session in a signal and wires the two sample
/// cards, the result panel, the charts, and the session history.
#[allow(clippy::too_many_lines)]
fn app() -> Element {
    // --- Application state ---
    let mut history = use_signal(ComparisonLog::default);
    let mut session = use_signal(|| {
        let mut session = new_session();
        session.observe(move |snapshot| {
            history.write().record(snapshot);
        });
        session
    });
    let modes = use_signal(|| [InputMode::Upload; 2]);
    let mut previews = use_signal(|| [None::<String>, None]);
    let mut variation = use_signal(Vec::<f64>::new);

    let client = use_hook(|| {
        Rc::new(VerificationClient::new(
            FetchTransport,
            session.peek().config(),
        ))
    });
    let source = use_hook(|| Rc::new(RefCell::new(SimulatedVariation::seeded(clock_seed()))));
    let variation_label = source.borrow().label();

    // Revoke outstanding preview URLs when the app is torn down.
    use_drop(move || {
        for url in previews.peek().iter().flatten() {
            raster::revoke_blob_url(url);
        }
    });

    // --- Submit handler ---
    // The session ignores submits while one is in flight, so a second
    // click never reaches the network.
    let on_submit = move |()| {
        let attempt = session.write().begin_submit();
        let SubmitAttempt::Started(pending) = attempt else {
            return;
        };
        let client = Rc::clone(&client);
        let source = Rc::clone(&source);
        spawn(async move {
            let result = client.submit(pending.request).await;
            let completion = session.write().complete(pending.generation, result);
            let succeeded = matches!(session.peek().state(), SessionState::Succeeded { .. });
            if completion == Completion::Applied && succeeded {
                variation.set(source.borrow_mut().sample(VARIATION_POINTS));
            }
        });
    };

    // --- Reset handler ---
    let on_reset = move |()| {
        for url in previews.write().iter_mut().filter_map(Option::take) {
            raster::revoke_blob_url(&url);
        }
        variation.set(Vec::new());
        session.write().reset();
    };

    let snapshot = session.read().snapshot();
    let scores = history.read().scores();
    let entries: Vec<_> = history.read().entries().copied().collect();
    let summary = history.read().summary();

    // --- Layout ---
    rsx! {
        // Tailwind utilities, compiled by build.rs via npx @tailwindcss/cli.
        style { dangerous_inner_html: include_str!(env!("TAILWIND_CSS_PATH")) }
        // Colour variables the utilities refer to.
        style { dangerous_inner_html: include_str!("../assets/theme.css") }

        div { class: "min-h-screen bg-(--bg) text-(--text)",
            header { class: "px-6 py-4 border-b border-(--border)",
                h1 { class: "text-2xl font-semibold text-(--text-heading)", "Signature Verification" }
                p { class: "text-(--muted) text-sm",
                    "Compare a reference sample with a questioned sample"
                }
            }

            main { class: "max-w-6xl mx-auto p-6 flex flex-wrap gap-6",
                div { class: "flex-[2_1_460px] min-w-0 flex flex-col gap-4",
                    SlotCard { slot: Slot::Original, session, modes, previews }
                    SlotCard { slot: Slot::Test, session, modes, previews }
                }

                div { class: "flex-[1_1_320px] min-w-0 flex flex-col gap-4",
                    ResultPanel {
                        snapshot,
                        on_submit: on_submit,
                        on_reset: on_reset,
                    }
                    LineChart {
                        title: "Feature Variation",
                        values: variation(),
                        caption: Some(variation_label.to_owned()),
                        empty_text: "Run a comparison to see feature variation",
                    }
                    LineChart {
                        title: "Score Trend",
                        values: scores,
                        caption: None,
                    }
                }
            }

            div { class: "max-w-6xl mx-auto px-6 pb-6",
                HistoryPanel { entries, summary }
            }
        }
    }
}

/// One sample card bound to its session slot.
#[component]
fn SlotCard(
    slot: Slot,
    mut session: Signal<Session>,
    mut modes: Signal<[InputMode; 2]>,
    mut previews: Signal<[Option<String>; 2]>,
) -> Element {
    let i = slot_index(slot);

    let mut drop_preview = move || {
        if let Some(url) = previews.write()[i].take() {
            raster::revoke_blob_url(&url);
        }
    };

    let on_file = move |file: UploadedFile| {
        drop_preview();
        match raster::preview_url(&file) {
            Ok(url) => previews.write()[i] = Some(url),
            Err(e) => log::warn!("{slot}: no preview: {e}"),
        }
        session.write().select_file(slot, file);
    };

    let on_mode = move |mode: InputMode| {
        if modes.peek()[i] == mode {
            return;
        }
        modes.write()[i] = mode;
        drop_preview();
        match mode {
            InputMode::Draw => session.write().use_canvas(slot),
            InputMode::Upload => session.write().remove_input(slot),
        }
    };

    let state = session.read();
    let (file_name, strokes) = match state.input(slot) {
        Some(ImageInput::Uploaded(file)) => (Some(file.name().to_owned()), Vec::new()),
        Some(ImageInput::Drawn(canvas)) => (None, canvas.strokes().to_vec()),
        None => (None, Vec::new()),
    };
    let canvas = state.config().canvas;
    drop(state);

    rsx! {
        SampleInput {
            slot,
            mode: modes()[i],
            file_name,
            preview: previews()[i].clone(),
            strokes,
            canvas,
            on_mode,
            on_file,
            on_stroke: move |stroke| session.write().add_stroke(slot, stroke),
            on_clear: move |()| session.write().clear_canvas(slot),
        }
    }
}
