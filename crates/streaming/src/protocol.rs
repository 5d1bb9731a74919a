//! Wire types for the chat stream endpoint.
//!
//! This module defines:
//! - the outgoing request body (client → server)
//! - the `data:` events of the streamed reply (server → client)
//! - the declarative map actions carried by the terminal event
//!
//! Every server-side type tolerates unknown fields so the backend can grow its
//! payloads without breaking older clients.

use foundation::LngLat;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifies a conversation on the backend.
pub type SessionId = String;

/// Body of `POST {chat_stream_url}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: SessionId,
}

/// One event of the streamed reply, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Incremental assistant text.
    Chunk {
        #[serde(default)]
        chunk: String,
    },

    /// Terminal event of a successful reply.
    Final {
        /// Full reply text as assembled by the server (informational).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<FinalMetadata>,
    },

    /// Terminal event of a failed reply.
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// Any event type this client does not know.
    #[serde(other)]
    Other,
}

impl StreamEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::Chunk { .. } => "chunk",
            StreamEvent::Final { .. } => "final",
            StreamEvent::Error { .. } => "error",
            StreamEvent::Other => "other",
        }
    }
}

/// Metadata attached to the `final` event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinalMetadata {
    /// Raw map actions; decoded one by one so a single bad entry is skipped
    /// instead of discarding the whole list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_actions: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<String>,
}

impl FinalMetadata {
    /// Decodes the map actions in order, dropping entries that do not decode.
    pub fn map_actions(&self) -> Vec<MapAction> {
        let Some(raw) = &self.map_actions else {
            return Vec::new();
        };
        raw.iter()
            .enumerate()
            .filter_map(|(idx, value)| match MapAction::deserialize(value) {
                Ok(action) => Some(action),
                Err(err) => {
                    tracing::warn!(index = idx, %err, "skipping undecodable map action");
                    None
                }
            })
            .collect()
    }
}

/// Declarative instruction from the backend to alter the map camera or overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MapAction {
    /// Pan/zoom the camera.
    NavigateTo {
        lat: f64,
        lng: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        zoom: Option<f64>,
    },

    /// Replace all overlays with one marker per result, then move the camera.
    SearchProperties {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lat: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lng: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        zoom: Option<f64>,
        #[serde(default)]
        markers: Vec<MarkerSpec>,
    },

    /// Remove every overlay the client placed.
    ClearMarkers,

    /// Add one labelled marker, keeping the existing ones.
    AddMarker {
        lat: f64,
        lng: f64,
        #[serde(default)]
        label: String,
    },
}

impl MapAction {
    pub fn kind(&self) -> &'static str {
        match self {
            MapAction::NavigateTo { .. } => "navigate_to",
            MapAction::SearchProperties { .. } => "search_properties",
            MapAction::ClearMarkers => "clear_markers",
            MapAction::AddMarker { .. } => "add_marker",
        }
    }
}

/// A property (or point of interest) to render as a map overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSpec {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Property type, e.g. "appartement" or "maison".
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rooms: Option<u32>,
}

impl MarkerSpec {
    pub fn position(&self) -> LngLat {
        LngLat::new(self.lng, self.lat)
    }
}
