//! Page-level state, independent of the browser bindings.

use std::rc::Rc;

use chat::{ChatEffect, ChatMessage, ChatPhase, ChatReducer, ExchangeUpdate, Flow, Outgoing, Ticket};
use foundation::{LngLat, Ring};
use layers::{MapActionExecutor, MapSurface};
use runtime::{Notice, NoticeBoard};
use selection::{AreaSelection, ContextIntent, CurrentSelection, DrawId};
use settings::AppConfig;

pub struct Page<S: MapSurface> {
    config: AppConfig,
    chat: ChatReducer,
    selection: CurrentSelection,
    executor: MapActionExecutor<S>,
    notices: NoticeBoard,
}

impl<S: MapSurface> Page<S> {
    pub fn new(config: AppConfig, surface: S) -> Self {
        let executor = MapActionExecutor::with_default_zoom(surface, config.default_zoom);
        Self {
            config,
            chat: ChatReducer::new(),
            selection: CurrentSelection::new(),
            executor,
            notices: NoticeBoard::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        self.chat.transcript()
    }

    pub fn phase(&self) -> ChatPhase {
        self.chat.phase()
    }

    pub fn session_id(&self) -> &str {
        self.chat.session_id()
    }

    pub fn executor(&self) -> &MapActionExecutor<S> {
        &self.executor
    }

    pub fn selection(&self) -> Option<Rc<AreaSelection>> {
        self.selection.get()
    }

    /// Validates a finished polygon and starts resolving it.
    ///
    /// A degenerate polygon is ignored without superseding a draw that is
    /// still resolving.
    pub fn begin_draw(&mut self, raw: Vec<LngLat>) -> Option<(DrawId, Ring)> {
        let Some(ring) = Ring::from_closed(raw) else {
            tracing::debug!("ignoring degenerate polygon");
            return None;
        };
        Some((self.selection.begin_draw(), ring))
    }

    /// Stores a finished selection unless a newer draw or a reset superseded it.
    pub fn commit_selection(
        &mut self,
        draw: DrawId,
        selection: AreaSelection,
    ) -> Option<Rc<AreaSelection>> {
        self.selection.commit(draw, selection)
    }

    /// Submits `text`, attaching the current selection as context.
    pub fn send(&mut self, text: &str, intent: ContextIntent) -> Option<Outgoing> {
        let area = self.selection.get();
        self.chat.submit(text, area.as_deref(), intent)
    }

    /// Applies a stream update and runs the effects it produced.
    pub fn apply(&mut self, ticket: Ticket, update: ExchangeUpdate) -> Flow {
        let applied = self.chat.apply(ticket, update);
        for effect in applied.effects {
            match effect {
                ChatEffect::RunMapActions(actions) => self.executor.execute(&actions),
                ChatEffect::Notify { level, message } => {
                    self.notices.emit(level, message);
                }
            }
        }
        applied.flow
    }

    pub fn stop(&mut self) -> bool {
        self.chat.stop()
    }

    /// Starts over: no selection, no transcript, no overlays, new session.
    pub fn reset_session(&mut self) {
        self.selection.clear();
        self.chat.reset();
        self.executor.clear();
    }

    pub fn notify(&mut self, level: runtime::NoticeLevel, message: impl Into<String>) {
        self.notices.emit(level, message);
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }
}
