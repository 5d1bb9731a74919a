use foundation::LngLat;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::SettingsError;

/// Highest zoom level the map SDK accepts.
pub const MAX_ZOOM: f64 = 22.0;

/// Log levels accepted by `log_level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Page configuration supplied by the host page at start-up.
///
/// Every field has a default, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Chat stream endpoint (`POST`, newline-delimited `data:` events).
    pub chat_stream_url: String,

    /// Reverse geocoding base; `/{lng},{lat}.json` is appended.
    pub geocoding_url: String,

    /// Feature types requested from the geocoder.
    pub geocoding_types: Vec<String>,

    pub map_style: String,

    pub initial_center: LngLat,
    pub initial_zoom: f64,

    /// Zoom for map actions that do not specify one.
    pub default_zoom: f64,

    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chat_stream_url: "http://localhost:8000/chat/stream".to_string(),
            geocoding_url: "https://api.mapbox.com/geocoding/v5/mapbox.places".to_string(),
            geocoding_types: ["neighborhood", "locality", "place"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            map_style: "mapbox://styles/mapbox/light-v11".to_string(),
            initial_center: LngLat::new(-74.006, 40.7128),
            initial_zoom: 12.0,
            default_zoom: 12.0,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Parses and validates a JSON configuration. Blank input yields the defaults.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let config = if json.trim().is_empty() {
            Self::default()
        } else {
            serde_json::from_str(json).map_err(|e| SettingsError::InvalidConfig(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        check_url("chat_stream_url", &self.chat_stream_url)?;
        check_url("geocoding_url", &self.geocoding_url)?;
        if self.map_style.trim().is_empty() {
            return Err(invalid("map_style must not be empty"));
        }
        if !self.initial_center.is_finite()
            || self.initial_center.lat.abs() > 90.0
            || self.initial_center.lng.abs() > 180.0
        {
            return Err(invalid("initial_center must be a valid [lng, lat]"));
        }
        check_zoom("initial_zoom", self.initial_zoom)?;
        check_zoom("default_zoom", self.default_zoom)?;
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(invalid(format!(
                "log_level must be one of {}, got \"{}\"",
                LOG_LEVELS.join(", "),
                self.log_level
            )));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> SettingsError {
    SettingsError::InvalidConfig(msg.into())
}

fn check_url(field: &str, value: &str) -> Result<(), SettingsError> {
    if value.trim().is_empty() {
        return Err(invalid(format!("{field} must not be empty")));
    }
    Url::parse(value).map_err(|e| invalid(format!("{field}: {e}")))?;
    Ok(())
}

fn check_zoom(field: &str, zoom: f64) -> Result<(), SettingsError> {
    if !(0.0..=MAX_ZOOM).contains(&zoom) {
        return Err(invalid(format!("{field} must be within 0..={MAX_ZOOM}")));
    }
    Ok(())
}
