use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};

use chat::{ExchangeUpdate, Flow, drive_exchange};
use foundation::LngLat;
use runtime::NoticeLevel;
use selection::{AreaSelector, ContextIntent, DrawMode, DrawingTool};
use settings::{
    AppConfig, InMemoryTokenStore, LocalStorageTokenStore, SettingsError, TOKEN_STORAGE_KEY,
    TokenProvider, TokenState, TokenStore,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

mod logging;
mod net;
pub mod page;
mod shim;

use logging::{init_panic_hook, init_tracing};
use net::{FetchChatTransport, MapboxGeocoder};
use page::Page;
use shim::{JsDrawTool, JsMapSurface};

// Guard against double start (hot reload re-running the host script).
static INITIALIZED: AtomicBool = AtomicBool::new(false);

#[derive(Debug)]
enum BrowserTokenStore {
    Local(LocalStorageTokenStore),
    Memory(InMemoryTokenStore),
}

impl BrowserTokenStore {
    fn new() -> Self {
        match LocalStorageTokenStore::new(TOKEN_STORAGE_KEY) {
            Ok(s) => BrowserTokenStore::Local(s),
            Err(err) => {
                tracing::warn!(%err, "local storage unavailable, token will not persist");
                BrowserTokenStore::Memory(InMemoryTokenStore::new(TOKEN_STORAGE_KEY))
            }
        }
    }
}

impl TokenStore for BrowserTokenStore {
    fn load(&self) -> Result<Option<String>, SettingsError> {
        match self {
            BrowserTokenStore::Local(s) => s.load(),
            BrowserTokenStore::Memory(s) => s.load(),
        }
    }

    fn save(&mut self, value: &str) -> Result<(), SettingsError> {
        match self {
            BrowserTokenStore::Local(s) => s.save(value),
            BrowserTokenStore::Memory(s) => s.save(value),
        }
    }

    fn remove(&mut self) -> Result<(), SettingsError> {
        match self {
            BrowserTokenStore::Local(s) => s.remove(),
            BrowserTokenStore::Memory(s) => s.remove(),
        }
    }

    fn clear_all(&mut self) -> Result<(), SettingsError> {
        match self {
            BrowserTokenStore::Local(s) => s.clear_all(),
            BrowserTokenStore::Memory(s) => s.clear_all(),
        }
    }
}

struct App {
    page: Page<JsMapSurface>,
    tokens: TokenProvider<BrowserTokenStore>,
}

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

/// Runs `f` on the started app.
///
/// `f` must not call back into JS code that may re-enter a wasm export; events
/// are emitted after the borrow ends.
fn with_app<F, R>(f: F) -> Result<R, JsValue>
where
    F: FnOnce(&mut App) -> R,
{
    APP.try_with(|cell| {
        let mut slot = cell.borrow_mut();
        slot.as_mut()
            .map(f)
            .ok_or_else(|| JsValue::from_str("start() has not been called"))
    })
    .map_err(|_| JsValue::from_str("app state unavailable"))?
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Pushes the transcript, phase and pending notices to the host page.
fn publish_chat() {
    let Ok((transcript, phase, notices)) = with_app(|app| {
        (
            serde_json::to_string(app.page.transcript()),
            app.page.phase(),
            app.page.drain_notices(),
        )
    }) else {
        return;
    };

    match transcript {
        Ok(json) => shim::nc_emit_chat(&json, phase.as_str()),
        Err(err) => tracing::error!(%err, "transcript serialization failed"),
    }
    for notice in notices {
        shim::nc_emit_toast(notice.level.as_str(), &notice.message);
    }
}

fn publish_selection() {
    match selected_area_json() {
        Ok(json) => shim::nc_emit_selection(&json),
        Err(err) => tracing::error!(?err, "selection serialization failed"),
    }
}

fn apply_token_state(state: TokenState) -> Result<(), JsValue> {
    match state {
        TokenState::Ready(token) => {
            let (style, center, zoom) = with_app(|app| {
                let cfg = app.page.config();
                (cfg.map_style.clone(), cfg.initial_center, cfg.initial_zoom)
            })?;
            shim::nc_map_init(token.as_str(), &style, center.lng, center.lat, zoom)?;
            shim::nc_emit_token_prompt(false, None);
        }
        TokenState::Prompt { rejected } => shim::nc_emit_token_prompt(true, rejected),
    }
    Ok(())
}

/// Boots the page with a JSON [`AppConfig`] (empty string for defaults).
#[wasm_bindgen]
pub fn start(config_json: &str) -> Result<(), JsValue> {
    init_panic_hook();
    if INITIALIZED.load(Ordering::SeqCst) {
        return Ok(());
    }
    let config = AppConfig::from_json(config_json).map_err(to_js)?;
    init_tracing(&config.log_level);

    let mut tokens = TokenProvider::new(BrowserTokenStore::new());
    let state = tokens.init();

    APP.with(|cell| {
        *cell.borrow_mut() = Some(App {
            page: Page::new(config, JsMapSurface),
            tokens,
        });
    });
    INITIALIZED.store(true, Ordering::SeqCst);
    tracing::info!("page started");

    apply_token_state(state)?;
    publish_chat();
    publish_selection();
    Ok(())
}

#[wasm_bindgen]
pub fn submit_token(raw: &str) -> Result<(), JsValue> {
    let token = with_app(|app| app.tokens.submit(raw))?.map_err(to_js)?;
    apply_token_state(TokenState::Ready(token))?;
    with_app(|app| app.page.notify(NoticeLevel::Success, "Map token saved"))?;
    publish_chat();
    Ok(())
}

#[wasm_bindgen]
pub fn reset_token() -> Result<(), JsValue> {
    with_app(|app| app.tokens.reset())?.map_err(to_js)?;
    apply_token_state(TokenState::Prompt { rejected: None })
}

/// Escape hatch for a page stuck on a bad token: wipes local storage and reloads.
#[wasm_bindgen]
pub fn clear_all_and_reload() -> Result<(), JsValue> {
    let cleared = match with_app(|app| app.tokens.clear_all()) {
        Ok(result) => result,
        Err(_) => BrowserTokenStore::new().clear_all(),
    };
    cleared.map_err(to_js)?;
    shim::nc_reload();
    Ok(())
}

/// Switches the drawing control between `"pan"` and `"polygon"`.
#[wasm_bindgen]
pub fn set_tool(mode: &str) -> Result<(), JsValue> {
    let mode = DrawMode::parse(mode)
        .ok_or_else(|| JsValue::from_str("tool must be \"pan\" or \"polygon\""))?;
    JsDrawTool.set_mode(mode);
    Ok(())
}

/// Handles a finished polygon given as a JSON array of `[lng, lat]` pairs.
#[wasm_bindgen]
pub fn on_draw_complete(coords_json: &str) -> Result<(), JsValue> {
    let raw: Vec<LngLat> = serde_json::from_str(coords_json).map_err(to_js)?;

    let started = with_app(|app| {
        let (draw, ring) = app.page.begin_draw(raw)?;
        let cfg = app.page.config();
        let token = app
            .tokens
            .token()
            .map(|t| t.as_str().to_string())
            .unwrap_or_default();
        let geocoder = MapboxGeocoder::new(
            cfg.geocoding_url.clone(),
            token,
            cfg.geocoding_types.clone(),
        );
        Some((draw, ring, geocoder))
    })?;
    let Some((draw, ring, geocoder)) = started else {
        return Ok(());
    };

    spawn_local(async move {
        let selector = AreaSelector::new(geocoder);
        let mut tool = JsDrawTool;
        let selection = selector.complete_ring(ring, &mut tool).await;
        let committed = with_app(|app| app.page.commit_selection(draw, selection))
            .ok()
            .flatten();
        if committed.is_some() {
            publish_selection();
        }
    });
    Ok(())
}

/// Sends a chat message. Returns `false` when it was ignored (blank or busy).
///
/// With `analyze`, the current selection is attached as an explicit analysis
/// request instead of background context.
#[wasm_bindgen]
pub fn send_message(text: &str, analyze: bool) -> Result<bool, JsValue> {
    let intent = if analyze {
        ContextIntent::Analyze
    } else {
        ContextIntent::Informational
    };
    let (outgoing, url) = with_app(|app| {
        let outgoing = app.page.send(text, intent);
        (outgoing, app.page.config().chat_stream_url.clone())
    })?;
    publish_chat();

    let Some(outgoing) = outgoing else {
        return Ok(false);
    };

    spawn_local(async move {
        let transport = FetchChatTransport::new(url);
        let ticket = outgoing.ticket;
        let mut sink = |update: ExchangeUpdate| {
            let flow = with_app(|app| app.page.apply(ticket, update)).unwrap_or(Flow::Detach);
            publish_chat();
            flow != Flow::Detach
        };
        let outcome = drive_exchange(&transport, &outgoing.request, &mut sink).await;
        tracing::debug!(?outcome, "exchange finished");
    });
    Ok(true)
}

/// Stops reacting to the in-flight reply. Returns `false` when idle.
#[wasm_bindgen]
pub fn stop() -> bool {
    let stopped = with_app(|app| app.page.stop()).unwrap_or(false);
    publish_chat();
    stopped
}

#[wasm_bindgen]
pub fn reset_session() -> Result<(), JsValue> {
    with_app(|app| app.page.reset_session())?;
    shim::nc_clear_drawing();
    publish_chat();
    publish_selection();
    Ok(())
}

#[wasm_bindgen]
pub fn transcript_json() -> Result<String, JsValue> {
    with_app(|app| serde_json::to_string(app.page.transcript()))?.map_err(to_js)
}

/// `"idle"`, `"sending"` or `"streaming"`.
#[wasm_bindgen]
pub fn chat_phase() -> String {
    with_app(|app| app.page.phase().as_str())
        .unwrap_or("idle")
        .to_string()
}

/// The current selection as JSON, or `"null"`.
#[wasm_bindgen]
pub fn selected_area_json() -> Result<String, JsValue> {
    with_app(|app| serde_json::to_string(&app.page.selection().as_deref()))?.map_err(to_js)
}
