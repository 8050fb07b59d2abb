//! Dioxus UI components for sigverify.
//!
//! Provides the per-slot sample card (upload zone or drawing pad), the
//! result panel with its match/difference donut, line charts, and the
//! session history panel.

mod charts;
mod draw_pad;
mod history;
mod result_panel;
mod sample_input;
mod upload;

pub use charts::LineChart;
pub use draw_pad::DrawPad;
pub use history::HistoryPanel;
pub use result_panel::ResultPanel;
pub use sample_input::{InputMode, SampleInput};
pub use upload::SampleUpload;
