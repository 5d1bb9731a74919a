//! Conversation state machine: `Idle -> Sending -> Streaming -> Idle`.
//!
//! The reducer owns the transcript. Network work happens elsewhere and reports
//! back through [`ChatReducer::apply`] tagged with the [`Ticket`] handed out by
//! [`ChatReducer::submit`]; updates for any other ticket are stale.

use runtime::NoticeLevel;
use selection::{AreaSelection, ContextIntent, compose_outgoing};
use streaming::{ChatRequest, MapAction, SessionId};
use uuid::Uuid;

use crate::exchange::ExchangeUpdate;
use crate::message::{ChatMessage, ChatPhase};

/// Identifies one request/response exchange.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// A request the caller must now send.
#[derive(Debug, Clone, PartialEq)]
pub struct Outgoing {
    pub ticket: Ticket,
    pub request: ChatRequest,
}

/// Side effects requested by the reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEffect {
    /// Hand these to the map action executor, once.
    RunMapActions(Vec<MapAction>),
    Notify { level: NoticeLevel, message: String },
}

/// What the stream task should do after an update was applied.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading.
    Continue,
    /// The exchange reached its terminal state.
    Done,
    /// The exchange was stopped or superseded; stop reading and drop the body.
    Detach,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub flow: Flow,
    pub effects: Vec<ChatEffect>,
}

impl Applied {
    fn flow(flow: Flow) -> Self {
        Self {
            flow,
            effects: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct ChatReducer {
    session_id: SessionId,
    transcript: Vec<ChatMessage>,
    phase: ChatPhase,
    current: Option<Ticket>,
    next_ticket: u64,
    // Transcript index of the in-flight assistant message.
    draft_index: Option<usize>,
}

impl Default for ChatReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatReducer {
    pub fn new() -> Self {
        Self::with_session_id(new_session_id())
    }

    pub fn with_session_id(session_id: impl Into<SessionId>) -> Self {
        Self {
            session_id: session_id.into(),
            transcript: Vec::new(),
            phase: ChatPhase::Idle,
            current: None,
            next_ticket: 0,
            draft_index: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn phase(&self) -> ChatPhase {
        self.phase
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.current == Some(ticket)
    }

    /// Starts an exchange for `text`.
    ///
    /// Returns `None` (and changes nothing) when the text is blank or an
    /// exchange is already in flight. The transcript shows `text` as typed;
    /// the request carries the area context when `area` is present.
    pub fn submit(
        &mut self,
        text: &str,
        area: Option<&AreaSelection>,
        intent: ContextIntent,
    ) -> Option<Outgoing> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if self.phase.is_busy() {
            tracing::debug!(phase = self.phase.as_str(), "submit ignored while busy");
            return None;
        }

        self.transcript.push(ChatMessage::user(text));
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.current = Some(ticket);
        self.draft_index = None;
        self.set_phase(ChatPhase::Sending);

        Some(Outgoing {
            ticket,
            request: ChatRequest {
                message: compose_outgoing(text, area, intent),
                session_id: self.session_id.clone(),
            },
        })
    }

    pub fn apply(&mut self, ticket: Ticket, update: ExchangeUpdate) -> Applied {
        if !self.is_current(ticket) {
            tracing::debug!(?ticket, "stale exchange update");
            return Applied::flow(Flow::Detach);
        }

        match update {
            ExchangeUpdate::Opened => {
                if self.phase == ChatPhase::Sending {
                    self.set_phase(ChatPhase::Streaming);
                }
                Applied::flow(Flow::Continue)
            }
            ExchangeUpdate::Draft(message) => {
                self.set_phase(ChatPhase::Streaming);
                match self.draft_index {
                    Some(idx) => self.transcript[idx] = message,
                    None => {
                        self.transcript.push(message);
                        self.draft_index = Some(self.transcript.len() - 1);
                    }
                }
                Applied::flow(Flow::Continue)
            }
            ExchangeUpdate::Completed { actions } => {
                self.finish();
                let mut applied = Applied::flow(Flow::Done);
                if !actions.is_empty() {
                    applied.effects.push(ChatEffect::RunMapActions(actions));
                }
                applied
            }
            ExchangeUpdate::Failed { reason } => {
                if let Some(idx) = self.draft_index.take() {
                    self.transcript.remove(idx);
                }
                self.finish();
                tracing::warn!(%reason, "chat exchange failed");
                let mut applied = Applied::flow(Flow::Done);
                applied.effects.push(ChatEffect::Notify {
                    level: NoticeLevel::Error,
                    message: format!("Message failed: {reason}"),
                });
                applied
            }
        }
    }

    /// Abandons the in-flight exchange; a partial reply stays in the transcript.
    ///
    /// Returns `false` when nothing was in flight.
    pub fn stop(&mut self) -> bool {
        if !self.phase.is_busy() {
            return false;
        }
        self.finish();
        true
    }

    /// Empties the transcript and starts a new backend session.
    pub fn reset(&mut self) {
        self.finish();
        self.transcript.clear();
        self.session_id = new_session_id();
        tracing::info!(session_id = %self.session_id, "chat session reset");
    }

    fn finish(&mut self) {
        self.current = None;
        self.draft_index = None;
        self.set_phase(ChatPhase::Idle);
    }

    fn set_phase(&mut self, phase: ChatPhase) {
        if self.phase != phase {
            tracing::debug!(from = self.phase.as_str(), to = phase.as_str(), "chat phase");
            self.phase = phase;
        }
    }
}

fn new_session_id() -> SessionId {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;
    use foundation::{LngLat, Ring};
    use pretty_assertions::assert_eq;

    fn draft(content: &str, id: &str) -> ExchangeUpdate {
        let mut m = ChatMessage::assistant(content);
        m.id = id.to_string();
        ExchangeUpdate::Draft(m)
    }

    fn area() -> AreaSelection {
        let ring = Ring::new(vec![
            LngLat::new(2.0, 48.0),
            LngLat::new(2.0, 49.0),
            LngLat::new(3.0, 49.0),
        ])
        .unwrap();
        AreaSelection::new(ring, "Somewhere")
    }

    #[test]
    fn submit_appends_user_message_and_enters_sending() {
        let mut r = ChatReducer::with_session_id("s1");
        let out = r.submit("  hello  ", None, ContextIntent::Informational).unwrap();
        assert_eq!(r.phase(), ChatPhase::Sending);
        assert_eq!(r.transcript().len(), 1);
        assert_eq!(r.transcript()[0].role, Role::User);
        assert_eq!(r.transcript()[0].content, "hello");
        assert_eq!(
            out.request,
            ChatRequest {
                message: "hello".to_string(),
                session_id: "s1".to_string()
            }
        );
    }

    #[test]
    fn blank_submit_is_ignored() {
        let mut r = ChatReducer::new();
        assert!(r.submit("   ", None, ContextIntent::Informational).is_none());
        assert!(r.transcript().is_empty());
        assert_eq!(r.phase(), ChatPhase::Idle);
    }

    #[test]
    fn submit_while_busy_is_a_no_op() {
        let mut r = ChatReducer::new();
        let out = r.submit("one", None, ContextIntent::Informational).unwrap();
        assert!(r.submit("two", None, ContextIntent::Informational).is_none());
        assert_eq!(r.transcript().len(), 1);

        r.apply(out.ticket, ExchangeUpdate::Opened);
        assert_eq!(r.phase(), ChatPhase::Streaming);
        assert!(r.submit("three", None, ContextIntent::Informational).is_none());
        assert_eq!(r.transcript().len(), 1);
    }

    #[test]
    fn area_context_goes_to_request_not_transcript() {
        let mut r = ChatReducer::new();
        let sel = area();
        let out = r.submit("what is here?", Some(&sel), ContextIntent::Analyze).unwrap();
        assert_eq!(r.transcript()[0].content, "what is here?");
        assert!(out.request.message.starts_with("what is here?\n\n"));
        assert!(out.request.message.contains("- Address: Somewhere"));
    }

    #[test]
    fn drafts_replace_in_place_and_complete_to_idle() {
        let mut r = ChatReducer::new();
        let t = r.submit("hi", None, ContextIntent::Informational).unwrap().ticket;
        r.apply(t, ExchangeUpdate::Opened);
        r.apply(t, draft("Hi", "a1"));
        r.apply(t, draft("Hi there", "a1"));
        assert_eq!(r.transcript().len(), 2);

        let applied = r.apply(t, ExchangeUpdate::Completed { actions: vec![] });
        assert_eq!(applied, Applied::flow(Flow::Done));
        assert_eq!(r.phase(), ChatPhase::Idle);
        assert_eq!(r.transcript()[1].content, "Hi there");
        assert_eq!(r.transcript()[1].role, Role::Assistant);
    }

    #[test]
    fn completion_forwards_map_actions_once() {
        let mut r = ChatReducer::new();
        let t = r.submit("hi", None, ContextIntent::Informational).unwrap().ticket;
        let applied = r.apply(
            t,
            ExchangeUpdate::Completed {
                actions: vec![MapAction::ClearMarkers],
            },
        );
        assert_eq!(
            applied.effects,
            vec![ChatEffect::RunMapActions(vec![MapAction::ClearMarkers])]
        );
        // A duplicate terminal update is stale now.
        let again = r.apply(
            t,
            ExchangeUpdate::Completed {
                actions: vec![MapAction::ClearMarkers],
            },
        );
        assert_eq!(again, Applied::flow(Flow::Detach));
    }

    #[test]
    fn failure_removes_draft_and_notifies() {
        let mut r = ChatReducer::new();
        let t = r.submit("hi", None, ContextIntent::Informational).unwrap().ticket;
        r.apply(t, ExchangeUpdate::Opened);
        r.apply(t, draft("partial", "a1"));

        let applied = r.apply(
            t,
            ExchangeUpdate::Failed {
                reason: "boom".to_string(),
            },
        );
        assert_eq!(r.transcript().len(), 1);
        assert_eq!(r.transcript()[0].role, Role::User);
        assert_eq!(r.phase(), ChatPhase::Idle);
        assert!(matches!(
            applied.effects.as_slice(),
            [ChatEffect::Notify { level: NoticeLevel::Error, message }] if message.contains("boom")
        ));
    }

    #[test]
    fn stop_goes_idle_and_detaches_late_updates() {
        let mut r = ChatReducer::new();
        let t = r.submit("hi", None, ContextIntent::Informational).unwrap().ticket;
        r.apply(t, draft("par", "a1"));
        assert!(r.stop());
        assert_eq!(r.phase(), ChatPhase::Idle);
        assert!(!r.stop());

        assert_eq!(r.apply(t, draft("partial", "a1")).flow, Flow::Detach);
        assert_eq!(r.transcript()[1].content, "par");

        let t2 = r.submit("again", None, ContextIntent::Informational).unwrap().ticket;
        assert_ne!(t, t2);
        assert_eq!(r.transcript().len(), 3);
    }

    #[test]
    fn reset_clears_transcript_and_rotates_session() {
        let mut r = ChatReducer::with_session_id("old");
        let t = r.submit("hi", None, ContextIntent::Informational).unwrap().ticket;
        r.reset();
        assert!(r.transcript().is_empty());
        assert_eq!(r.phase(), ChatPhase::Idle);
        assert_ne!(r.session_id(), "old");
        assert_eq!(r.apply(t, ExchangeUpdate::Opened).flow, Flow::Detach);
    }
}
