//! Browser `fetch` transport.
//!
//! [`FetchTransport`] posts the already-encoded multipart body with an
//! explicit `Content-Type` header. When a deadline is set the fetch is
//! raced against a `gloo-timers` timeout and cancelled through an
//! `AbortController` if the timer wins.

use std::pin::pin;
use std::time::Duration;

use futures::future::{Either, select};
use gloo_timers::future::TimeoutFuture;
use sigverify_core::{HttpReply, HttpRequest, Transport, TransportError};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, AbortSignal, Headers, Request, RequestInit, Response};

/// Errors raised by the browser fetch API.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// No `window` global (not running in a browser page).
    #[error("no global window")]
    NoWindow,

    /// A browser API call returned an error or the fetch was rejected.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for FetchError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

impl From<FetchError> for TransportError {
    fn from(err: FetchError) -> Self {
        Self::Network(err.to_string())
    }
}

/// [`Transport`] backed by `window.fetch`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FetchTransport;

impl Transport for FetchTransport {
    #[allow(clippy::future_not_send)] // WASM is single-threaded; Send is not needed
    async fn send(&self, request: HttpRequest) -> Result<HttpReply, TransportError> {
        let controller = AbortController::new().map_err(FetchError::from)?;
        let Some(after) = request.timeout else {
            return Ok(exchange(request, &controller.signal()).await?);
        };

        let signal = controller.signal();
        let fetch = pin!(exchange(request, &signal));
        let timer = pin!(TimeoutFuture::new(timer_millis(after)));
        match select(fetch, timer).await {
            Either::Left((reply, _)) => Ok(reply?),
            Either::Right(((), _)) => {
                controller.abort();
                log::warn!("request aborted after {} ms", after.as_millis());
                Err(TransportError::Timeout(after))
            }
        }
    }
}

/// One POST round trip, reading the full body.
#[allow(clippy::future_not_send)] // WASM is single-threaded; Send is not needed
async fn exchange(request: HttpRequest, signal: &AbortSignal) -> Result<HttpReply, FetchError> {
    let window = web_sys::window().ok_or(FetchError::NoWindow)?;

    let headers = Headers::new()?;
    headers.set("Content-Type", &request.content_type)?;
    headers.set("Accept", "application/json")?;

    let body = js_sys::Uint8Array::from(request.body.as_slice());
    let init = RequestInit::new();
    init.set_method("POST");
    init.set_headers(&headers);
    init.set_body(&body);
    init.set_signal(Some(signal));

    let req = Request::new_with_str_and_init(&request.url, &init)?;
    let response: Response = JsFuture::from(window.fetch_with_request(&req))
        .await?
        .dyn_into()?;

    let status = response.status();
    let buffer = JsFuture::from(response.array_buffer()?).await?;
    let body = js_sys::Uint8Array::new(&buffer).to_vec();
    Ok(HttpReply { status, body })
}

/// Clamp a deadline to the range `setTimeout` accepts.
fn timer_millis(after: Duration) -> u32 {
    u32::try_from(after.as_millis()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_millis_saturates() {
        assert_eq!(timer_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(timer_millis(Duration::from_secs(u64::MAX / 1000)), u32::MAX);
    }

    #[test]
    fn fetch_errors_become_network_failures() {
        let err: TransportError = FetchError::NoWindow.into();
        assert_eq!(err, TransportError::Network("no global window".into()));
    }
}
