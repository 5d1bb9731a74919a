//! Bindings to the host page: the Mapbox GL map, its draw control, and DOM
//! events the page UI listens to.
//!
//! The host page loads `mapboxgl` and `MapboxDraw` and provides a `#map`
//! container. UI rendering happens in the host from these events:
//! - `nc:draw-complete` ring coordinates as a JSON string, to be passed to
//!   `on_draw_complete`
//! - `nc:chat` `{ transcript, phase }`
//! - `nc:selection` `AreaSelection | null`
//! - `nc:toast` `{ level, message }`
//! - `nc:token-prompt` `{ visible, reason }`

use layers::{CameraTarget, MapSurface, Overlay, OverlaySpec};
use selection::{DrawMode, DrawingTool};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(inline_js = "
let map = null;
let draw = null;
let markers = new Map();
let nextMarker = 1;

function emit(name, detail) {
    window.dispatchEvent(new CustomEvent(name, { detail }));
}

export function nc_map_init(token, style, lng, lat, zoom) {
    if (map) {
        map.remove();
        markers.clear();
    }
    mapboxgl.accessToken = token;
    map = new mapboxgl.Map({ container: 'map', style, center: [lng, lat], zoom });
    map.addControl(new mapboxgl.NavigationControl(), 'top-right');
    draw = new MapboxDraw({ displayControlsDefault: false, controls: {} });
    map.addControl(draw);

    const finished = (e) => {
        const feature = e.features && e.features[0];
        if (!feature || feature.geometry.type !== 'Polygon') return;
        for (const other of draw.getAll().features) {
            if (other.id !== feature.id) draw.delete(other.id);
        }
        emit('nc:draw-complete', JSON.stringify(feature.geometry.coordinates[0]));
    };
    map.on('draw.create', finished);
    map.on('draw.update', finished);
}

export function nc_fly_to(lng, lat, zoom) {
    if (map) map.flyTo({ center: [lng, lat], zoom, essential: true });
}

export function nc_add_marker(lng, lat, color, html) {
    const id = nextMarker++;
    if (!map) return id;
    const popup = new mapboxgl.Popup({ offset: 24 }).setHTML(html);
    const marker = new mapboxgl.Marker({ color }).setLngLat([lng, lat]).setPopup(popup).addTo(map);
    markers.set(id, marker);
    return id;
}

export function nc_remove_marker(id) {
    const marker = markers.get(id);
    if (marker) {
        marker.remove();
        markers.delete(id);
    }
}

export function nc_set_draw_mode(mode) {
    if (!draw) return;
    draw.changeMode(mode === 'polygon' ? 'draw_polygon' : 'simple_select');
}

export function nc_draw_mode() {
    if (!draw) return 'pan';
    return draw.getMode() === 'draw_polygon' ? 'polygon' : 'pan';
}

export function nc_clear_drawing() {
    if (draw) draw.deleteAll();
}

export function nc_emit_chat(transcriptJson, phase) {
    emit('nc:chat', { transcript: JSON.parse(transcriptJson), phase });
}

export function nc_emit_selection(selectionJson) {
    emit('nc:selection', JSON.parse(selectionJson));
}

export function nc_emit_toast(level, message) {
    emit('nc:toast', { level, message });
}

export function nc_emit_token_prompt(visible, reason) {
    emit('nc:token-prompt', { visible, reason });
}

export function nc_reload() {
    window.location.reload();
}
")]
extern "C" {
    #[wasm_bindgen(catch)]
    pub fn nc_map_init(
        token: &str,
        style: &str,
        lng: f64,
        lat: f64,
        zoom: f64,
    ) -> Result<(), JsValue>;

    pub fn nc_fly_to(lng: f64, lat: f64, zoom: f64);

    pub fn nc_add_marker(lng: f64, lat: f64, color: &str, html: &str) -> u32;

    pub fn nc_remove_marker(id: u32);

    pub fn nc_set_draw_mode(mode: &str);

    pub fn nc_draw_mode() -> String;

    pub fn nc_clear_drawing();

    pub fn nc_emit_chat(transcript_json: &str, phase: &str);

    pub fn nc_emit_selection(selection_json: &str);

    pub fn nc_emit_toast(level: &str, message: &str);

    pub fn nc_emit_token_prompt(visible: bool, reason: Option<String>);

    pub fn nc_reload();
}

/// The Mapbox GL map as a [`MapSurface`].
#[derive(Debug, Default)]
pub struct JsMapSurface;

impl MapSurface for JsMapSurface {
    fn fly_to(&mut self, target: CameraTarget) {
        nc_fly_to(target.center.lng, target.center.lat, target.zoom);
    }

    fn place_overlay(&mut self, spec: &OverlaySpec) -> Overlay {
        Overlay(nc_add_marker(
            spec.position.lng,
            spec.position.lat,
            spec.style.color,
            &spec.popup.to_html(),
        ))
    }

    fn remove_overlay(&mut self, overlay: Overlay) {
        nc_remove_marker(overlay.0);
    }
}

/// The Mapbox Draw control as a [`DrawingTool`].
#[derive(Debug, Default)]
pub struct JsDrawTool;

impl DrawingTool for JsDrawTool {
    fn set_mode(&mut self, mode: DrawMode) {
        nc_set_draw_mode(mode.as_str());
    }

    fn mode(&self) -> DrawMode {
        DrawMode::parse(&nc_draw_mode()).unwrap_or_default()
    }
}
