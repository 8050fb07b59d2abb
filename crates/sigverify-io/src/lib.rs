//! sigverify-io: Browser I/O and Dioxus component library.
//!
//! Sends verification requests with `fetch`, previews uploaded samples
//! through Blob URLs, and provides the UI components for the sigverify
//! web application.

pub mod components;
pub mod fetch;
pub mod raster;

pub use components::{
    DrawPad, HistoryPanel, InputMode, LineChart, ResultPanel, SampleInput, SampleUpload,
};
pub use fetch::{FetchError, FetchTransport};
