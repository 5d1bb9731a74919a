//! Per-request accumulator for a streamed reply.
//!
//! An [`Exchange`] is owned by the task reading the response body. It is the
//! only place the assistant draft is mutated; the rest of the app sees the
//! draft as immutable [`ChatMessage`] snapshots carried by [`ExchangeUpdate`]s.

use streaming::{Decoded, MapAction, StreamEvent};

use crate::message::ChatMessage;

/// What the stream task reports to the reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum ExchangeUpdate {
    /// The first response bytes arrived.
    Opened,
    /// Current state of the assistant message; same `id` for the whole exchange.
    Draft(ChatMessage),
    /// The reply ended normally.
    Completed { actions: Vec<MapAction> },
    /// The reply ended with an error; any draft must be discarded.
    Failed { reason: String },
}

impl ExchangeUpdate {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExchangeUpdate::Completed { .. } | ExchangeUpdate::Failed { .. }
        )
    }
}

#[derive(Debug, Default)]
pub struct Exchange {
    draft: Option<ChatMessage>,
    finished: bool,
}

impl Exchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> Option<&ChatMessage> {
        self.draft.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Folds one decoded line. Malformed lines are logged and skipped.
    pub fn on_decoded(&mut self, decoded: Decoded) -> Option<ExchangeUpdate> {
        match decoded {
            Decoded::Event(event) => self.on_event(event),
            Decoded::Malformed { line, error } => {
                tracing::warn!(%line, %error, "skipping malformed stream line");
                None
            }
        }
    }

    pub fn on_event(&mut self, event: StreamEvent) -> Option<ExchangeUpdate> {
        if self.finished {
            tracing::debug!(kind = event.kind(), "event after terminal event ignored");
            return None;
        }

        match event {
            StreamEvent::Chunk { chunk } => {
                if chunk.is_empty() {
                    return None;
                }
                let draft = self
                    .draft
                    .get_or_insert_with(|| ChatMessage::assistant(String::new()));
                draft.content.push_str(&chunk);
                Some(ExchangeUpdate::Draft(draft.clone()))
            }
            StreamEvent::Final { metadata, .. } => {
                self.finished = true;
                let actions = metadata.map(|m| m.map_actions()).unwrap_or_default();
                Some(ExchangeUpdate::Completed { actions })
            }
            StreamEvent::Error { error } => {
                self.finished = true;
                self.draft = None;
                let reason = error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| "the assistant reported an error".to_string());
                Some(ExchangeUpdate::Failed { reason })
            }
            StreamEvent::Other => {
                tracing::debug!("ignoring unknown stream event");
                None
            }
        }
    }

    /// Body ended. Without a prior terminal event the reply counts as complete
    /// and the partial draft stands.
    pub fn on_end_of_body(&mut self) -> Option<ExchangeUpdate> {
        if self.finished {
            return None;
        }
        self.finished = true;
        tracing::debug!(has_draft = self.draft.is_some(), "stream ended without final event");
        Some(ExchangeUpdate::Completed {
            actions: Vec::new(),
        })
    }

    /// Transport failure at any point of the exchange.
    pub fn on_failure(&mut self, reason: impl Into<String>) -> ExchangeUpdate {
        self.finished = true;
        self.draft = None;
        ExchangeUpdate::Failed {
            reason: reason.into(),
        }
    }
}
