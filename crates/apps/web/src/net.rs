//! `fetch`-backed implementations of the chat transport and the geocoder.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use chat::{ChatTransport, TransportError};
use foundation::LngLat;
use futures_util::Stream;
use gloo_net::http::Request;
use selection::{GeocodeError, Geocoder, Place, parse_reverse_response, reverse_geocode_url};
use streaming::ChatRequest;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::ReadableStreamDefaultReader;

fn js_error_string(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

/// `POST`s chat requests to the stream endpoint.
#[derive(Debug, Clone)]
pub struct FetchChatTransport {
    url: String,
}

impl FetchChatTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl ChatTransport for FetchChatTransport {
    type Body = BodyStream;

    async fn open(&self, request: &ChatRequest) -> Result<BodyStream, TransportError> {
        let resp = Request::post(&self.url)
            .header("Accept", "text/event-stream")
            .json(request)
            .map_err(|e| TransportError::Request(e.to_string()))?
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        if !resp.ok() {
            return Err(TransportError::Status {
                status: resp.status(),
            });
        }
        let body = resp.body().ok_or(TransportError::MissingBody)?;
        let reader = body.get_reader().unchecked_into::<ReadableStreamDefaultReader>();
        Ok(BodyStream::new(reader))
    }
}

/// A response body as a stream of byte chunks.
///
/// Dropping it before the end cancels the underlying transfer.
pub struct BodyStream {
    reader: ReadableStreamDefaultReader,
    pending: Option<JsFuture>,
    done: bool,
}

impl BodyStream {
    fn new(reader: ReadableStreamDefaultReader) -> Self {
        Self {
            reader,
            pending: None,
            done: false,
        }
    }
}

impl Stream for BodyStream {
    type Item = Result<Vec<u8>, TransportError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        if this.done {
            return Poll::Ready(None);
        }

        let reader = &this.reader;
        let read = this
            .pending
            .get_or_insert_with(|| JsFuture::from(reader.read()));
        let result = ready!(Pin::new(read).poll(cx));
        this.pending = None;

        let chunk = match result {
            Ok(chunk) => chunk,
            Err(err) => {
                this.done = true;
                return Poll::Ready(Some(Err(TransportError::Body(js_error_string(&err)))));
            }
        };

        let done = js_sys::Reflect::get(&chunk, &JsValue::from_str("done"))
            .map(|v| v.is_truthy())
            .unwrap_or(true);
        if done {
            this.done = true;
            return Poll::Ready(None);
        }

        match js_sys::Reflect::get(&chunk, &JsValue::from_str("value")) {
            Ok(value) => Poll::Ready(Some(Ok(js_sys::Uint8Array::new(&value).to_vec()))),
            Err(err) => {
                this.done = true;
                Poll::Ready(Some(Err(TransportError::Body(js_error_string(&err)))))
            }
        }
    }
}

impl Drop for BodyStream {
    fn drop(&mut self) {
        if !self.done {
            let _ = self.reader.cancel();
        }
    }
}

/// Reverse geocoding against a Mapbox `places` endpoint.
#[derive(Debug, Clone)]
pub struct MapboxGeocoder {
    base_url: String,
    access_token: String,
    types: Vec<String>,
}

impl MapboxGeocoder {
    pub fn new(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
        types: Vec<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            access_token: access_token.into(),
            types,
        }
    }
}

impl Geocoder for MapboxGeocoder {
    async fn reverse(&self, center: LngLat) -> Result<Vec<Place>, GeocodeError> {
        let url = reverse_geocode_url(&self.base_url, &self.access_token, center, &self.types)?;
        let resp = Request::get(url.as_str())
            .send()
            .await
            .map_err(|e| GeocodeError::Transport(e.to_string()))?;
        if !resp.ok() {
            return Err(GeocodeError::Status(resp.status()));
        }
        let body = resp
            .text()
            .await
            .map_err(|e| GeocodeError::Transport(e.to_string()))?;
        parse_reverse_response(&body)
    }
}
