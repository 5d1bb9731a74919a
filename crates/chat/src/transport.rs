//! Drives one streamed exchange from a [`ChatTransport`] into an [`ExchangeSink`].

use std::ops::ControlFlow;

use futures_util::{Stream, StreamExt};
use streaming::{ChatRequest, LineDecoder};
use thiserror::Error;

use crate::exchange::{Exchange, ExchangeUpdate};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("server responded with status {status}")]
    Status { status: u16 },

    #[error("response has no body")]
    MissingBody,

    #[error("reading the response failed: {0}")]
    Body(String),
}

/// Opens the chat stream endpoint.
///
/// Dropping the returned body must release (and may cancel) the transfer.
#[allow(async_fn_in_trait)]
pub trait ChatTransport {
    type Body: Stream<Item = Result<Vec<u8>, TransportError>> + Unpin;

    async fn open(&self, request: &ChatRequest) -> Result<Self::Body, TransportError>;
}

/// Receives exchange updates.
pub trait ExchangeSink {
    /// Returns `false` once the receiver wants no further updates.
    fn deliver(&mut self, update: ExchangeUpdate) -> bool;
}

impl<F> ExchangeSink for F
where
    F: FnMut(ExchangeUpdate) -> bool,
{
    fn deliver(&mut self, update: ExchangeUpdate) -> bool {
        self(update)
    }
}

/// How [`drive_exchange`] ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DriveOutcome {
    Completed,
    Failed,
    /// The sink stopped listening; the body was dropped unread.
    Detached,
}

/// Sends `request` and streams the reply into `sink` until a terminal update
/// is delivered or the sink detaches.
pub async fn drive_exchange<T, K>(transport: &T, request: &ChatRequest, sink: &mut K) -> DriveOutcome
where
    T: ChatTransport,
    K: ExchangeSink,
{
    let mut exchange = Exchange::new();

    let mut body = match transport.open(request).await {
        Ok(body) => body,
        Err(err) => return finish(sink, exchange.on_failure(err.to_string())),
    };

    let mut decoder = LineDecoder::new();
    let mut opened = false;

    while let Some(read) = body.next().await {
        let bytes = match read {
            Ok(bytes) => bytes,
            Err(err) => return finish(sink, exchange.on_failure(err.to_string())),
        };
        if bytes.is_empty() {
            continue;
        }
        if !opened {
            opened = true;
            if let ControlFlow::Break(outcome) = forward(sink, ExchangeUpdate::Opened) {
                return outcome;
            }
        }
        for decoded in decoder.push(&bytes) {
            if let Some(update) = exchange.on_decoded(decoded) {
                if let ControlFlow::Break(outcome) = forward(sink, update) {
                    return outcome;
                }
            }
        }
    }

    if let Some(update) = decoder.finish().and_then(|d| exchange.on_decoded(d)) {
        if let ControlFlow::Break(outcome) = forward(sink, update) {
            return outcome;
        }
    }

    match exchange.on_end_of_body() {
        Some(update) => finish(sink, update),
        None => DriveOutcome::Completed,
    }
}

fn forward<K: ExchangeSink>(sink: &mut K, update: ExchangeUpdate) -> ControlFlow<DriveOutcome> {
    let terminal = match &update {
        ExchangeUpdate::Completed { .. } => Some(DriveOutcome::Completed),
        ExchangeUpdate::Failed { .. } => Some(DriveOutcome::Failed),
        _ => None,
    };
    if !sink.deliver(update) {
        return ControlFlow::Break(DriveOutcome::Detached);
    }
    match terminal {
        Some(outcome) => ControlFlow::Break(outcome),
        None => ControlFlow::Continue(()),
    }
}

fn finish<K: ExchangeSink>(sink: &mut K, update: ExchangeUpdate) -> DriveOutcome {
    match forward(sink, update) {
        ControlFlow::Break(outcome) => outcome,
        ControlFlow::Continue(()) => DriveOutcome::Completed,
    }
}
