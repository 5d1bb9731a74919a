//! Reverse geocoding: request URL construction and response parsing for a
//! Mapbox-style `places` endpoint.
//!
//! The HTTP round trip itself lives behind [`crate::pipeline::Geocoder`] so the
//! browser app can use `fetch` and tests can script responses.

use foundation::LngLat;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("invalid geocoding endpoint: {0}")]
    InvalidUrl(String),

    #[error("geocoding request failed: {0}")]
    Transport(String),

    #[error("geocoding service returned status {0}")]
    Status(u16),

    #[error("geocoding response could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no access token configured")]
    MissingToken,
}

/// One candidate place returned by the geocoder, most relevant first.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    /// Fully qualified name, e.g. "Le Marais, Paris, France".
    pub name: String,
    /// Short name, e.g. "Le Marais".
    pub text: Option<String>,
    pub place_type: Option<String>,
}

/// Builds `{base}/{lng},{lat}.json?access_token=..&types=..`.
pub fn reverse_geocode_url(
    base: &str,
    access_token: &str,
    center: LngLat,
    types: &[String],
) -> Result<Url, GeocodeError> {
    if access_token.is_empty() {
        return Err(GeocodeError::MissingToken);
    }

    let mut url = Url::parse(base).map_err(|e| GeocodeError::InvalidUrl(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| GeocodeError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .push(&format!("{},{}.json", center.lng, center.lat));

    {
        let mut q = url.query_pairs_mut();
        q.append_pair("access_token", access_token);
        if !types.is_empty() {
            q.append_pair("types", &types.join(","));
        }
    }
    Ok(url)
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    place_name: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    place_type: Vec<String>,
}

/// Parses a `FeatureCollection` body into places, keeping the service's order.
///
/// Features with neither `place_name` nor `text` are skipped.
pub fn parse_reverse_response(body: &str) -> Result<Vec<Place>, GeocodeError> {
    let fc: FeatureCollection = serde_json::from_str(body)?;
    Ok(fc
        .features
        .into_iter()
        .filter_map(|f| {
            let name = f.place_name.clone().or_else(|| f.text.clone())?;
            Some(Place {
                name,
                text: f.text,
                place_type: f.place_type.into_iter().next(),
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn types() -> Vec<String> {
        ["neighborhood", "locality", "place"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn builds_reverse_url_with_lng_first() {
        let url = reverse_geocode_url(
            "https://api.mapbox.com/geocoding/v5/mapbox.places",
            "pk.test",
            LngLat::new(2.3522, 48.8566),
            &types(),
        )
        .unwrap();

        assert_eq!(
            url.path(),
            "/geocoding/v5/mapbox.places/2.3522,48.8566.json"
        );
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("access_token".to_string(), "pk.test".to_string()),
                ("types".to_string(), "neighborhood,locality,place".to_string()),
            ]
        );
    }

    #[test]
    fn tolerates_trailing_slash_on_base() {
        let url = reverse_geocode_url(
            "https://geo.example/places/",
            "pk.x",
            LngLat::new(-74.0, 40.7),
            &[],
        )
        .unwrap();
        assert_eq!(url.path(), "/places/-74,40.7.json");
        assert_eq!(url.query(), Some("access_token=pk.x"));
    }

    #[test]
    fn rejects_bad_base_and_missing_token() {
        assert!(matches!(
            reverse_geocode_url("not a url", "pk.x", LngLat::new(0.0, 0.0), &[]),
            Err(GeocodeError::InvalidUrl(_))
        ));
        assert!(matches!(
            reverse_geocode_url("mailto:someone@example.com", "pk.x", LngLat::new(0.0, 0.0), &[]),
            Err(GeocodeError::InvalidUrl(_))
        ));
        assert!(matches!(
            reverse_geocode_url("https://geo.example", "", LngLat::new(0.0, 0.0), &[]),
            Err(GeocodeError::MissingToken)
        ));
    }

    #[test]
    fn parses_features_in_order() {
        let body = r#"{
            "type": "FeatureCollection",
            "features": [
                { "place_name": "Le Marais, Paris, France", "text": "Le Marais", "place_type": ["neighborhood"], "center": [2.36, 48.86] },
                { "text": "Paris", "place_type": ["place"] },
                { "id": "no-name" }
            ]
        }"#;
        let places = parse_reverse_response(body).unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].name, "Le Marais, Paris, France");
        assert_eq!(places[0].place_type.as_deref(), Some("neighborhood"));
        assert_eq!(places[1].name, "Paris");
    }

    #[test]
    fn empty_and_invalid_bodies() {
        assert!(parse_reverse_response(r#"{"features":[]}"#).unwrap().is_empty());
        assert!(parse_reverse_response("{}").unwrap().is_empty());
        assert!(matches!(
            parse_reverse_response("<html>"),
            Err(GeocodeError::Parse(_))
        ));
    }
}
