//! Applies backend map actions to a [`MapSurface`].
//!
//! The executor is the only writer of overlays it places; it tracks their
//! handles so bulk removal takes away exactly those overlays.

use foundation::LngLat;
use streaming::{MapAction, MarkerSpec};

use crate::popup::Popup;
use crate::surface::{CameraTarget, MapSurface, Overlay, OverlaySpec};
use crate::symbology::MarkerStyle;

/// Zoom used by navigation actions that do not carry one.
pub const DEFAULT_ZOOM: f64 = 12.0;

pub struct MapActionExecutor<S> {
    surface: S,
    tracked: Vec<Overlay>,
    default_zoom: f64,
}

impl<S: MapSurface> MapActionExecutor<S> {
    pub fn new(surface: S) -> Self {
        Self::with_default_zoom(surface, DEFAULT_ZOOM)
    }

    pub fn with_default_zoom(surface: S, default_zoom: f64) -> Self {
        Self {
            surface,
            tracked: Vec::new(),
            default_zoom,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Overlays currently placed by this executor, in placement order.
    pub fn tracked(&self) -> &[Overlay] {
        &self.tracked
    }

    /// Applies `actions` in order.
    pub fn execute(&mut self, actions: &[MapAction]) {
        for action in actions {
            tracing::debug!(kind = action.kind(), "map action");
            self.apply(action);
        }
    }

    fn apply(&mut self, action: &MapAction) {
        match action {
            MapAction::NavigateTo { lat, lng, zoom } => self.navigate(*lat, *lng, *zoom),
            MapAction::SearchProperties {
                lat,
                lng,
                zoom,
                markers,
            } => {
                self.clear();
                for marker in markers {
                    self.place_marker(marker);
                }
                // Navigation happens even when the result list is empty.
                if let (Some(lat), Some(lng)) = (lat, lng) {
                    self.navigate(*lat, *lng, *zoom);
                }
            }
            MapAction::ClearMarkers => self.clear(),
            MapAction::AddMarker { lat, lng, label } => {
                let position = LngLat::new(*lng, *lat);
                if !position.is_finite() {
                    tracing::warn!(%label, "skipping marker with non-finite position");
                    return;
                }
                self.place(OverlaySpec {
                    position,
                    style: MarkerStyle::PIN,
                    popup: Popup::label(label.clone()),
                });
            }
        }
    }

    /// Removes every tracked overlay.
    pub fn clear(&mut self) {
        for overlay in self.tracked.drain(..) {
            self.surface.remove_overlay(overlay);
        }
    }

    fn navigate(&mut self, lat: f64, lng: f64, zoom: Option<f64>) {
        let center = LngLat::new(lng, lat);
        if !center.is_finite() {
            tracing::warn!(lat, lng, "ignoring navigation to non-finite position");
            return;
        }
        let zoom = zoom.filter(|z| z.is_finite()).unwrap_or(self.default_zoom);
        self.surface.fly_to(CameraTarget { center, zoom });
    }

    fn place_marker(&mut self, marker: &MarkerSpec) {
        let position = marker.position();
        if !position.is_finite() {
            tracing::warn!(label = %marker.label, "skipping marker with non-finite position");
            return;
        }
        self.place(OverlaySpec {
            position,
            style: MarkerStyle::for_property(marker.kind.as_deref()),
            popup: Popup::for_marker(marker),
        });
    }

    fn place(&mut self, spec: OverlaySpec) {
        let overlay = self.surface.place_overlay(&spec);
        self.tracked.push(overlay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    #[derive(Debug, Default)]
    struct RecordingSurface {
        next: u32,
        live: BTreeMap<Overlay, OverlaySpec>,
        flights: Vec<CameraTarget>,
        removed: Vec<Overlay>,
    }

    impl MapSurface for RecordingSurface {
        fn fly_to(&mut self, target: CameraTarget) {
            self.flights.push(target);
        }

        fn place_overlay(&mut self, spec: &OverlaySpec) -> Overlay {
            let overlay = Overlay(self.next);
            self.next += 1;
            self.live.insert(overlay, spec.clone());
            overlay
        }

        fn remove_overlay(&mut self, overlay: Overlay) {
            assert!(self.live.remove(&overlay).is_some(), "double remove");
            self.removed.push(overlay);
        }
    }

    fn marker(lat: f64, lng: f64, label: &str) -> MarkerSpec {
        MarkerSpec {
            lat,
            lng,
            label: label.to_string(),
            description: None,
            price: None,
            kind: None,
            rooms: None,
        }
    }

    #[test]
    fn search_after_add_marker_tracks_exactly_the_new_results() {
        let mut exec = MapActionExecutor::new(RecordingSurface::default());
        exec.execute(&[MapAction::AddMarker {
            lat: 1.0,
            lng: 2.0,
            label: "old".to_string(),
        }]);
        assert_eq!(exec.tracked().len(), 1);

        exec.execute(&[MapAction::SearchProperties {
            lat: Some(45.0),
            lng: Some(4.0),
            zoom: Some(14.0),
            markers: vec![marker(45.0, 4.0, "a"), marker(45.1, 4.1, "b")],
        }]);

        assert_eq!(exec.tracked().len(), 2);
        let surface = exec.surface();
        assert_eq!(surface.removed, vec![Overlay(0)]);
        assert_eq!(surface.live.len(), 2);
        let titles: Vec<&str> = surface.live.values().map(|s| s.popup.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b"]);
        assert_eq!(
            surface.flights,
            vec![CameraTarget {
                center: LngLat::new(4.0, 45.0),
                zoom: 14.0
            }]
        );
    }

    #[test]
    fn navigate_uses_default_zoom() {
        let mut exec = MapActionExecutor::new(RecordingSurface::default());
        exec.execute(&[MapAction::NavigateTo {
            lat: 48.85,
            lng: 2.35,
            zoom: None,
        }]);
        assert_eq!(exec.surface().flights[0].zoom, DEFAULT_ZOOM);

        let mut exec = MapActionExecutor::with_default_zoom(RecordingSurface::default(), 9.0);
        exec.execute(&[MapAction::NavigateTo {
            lat: 0.0,
            lng: 0.0,
            zoom: None,
        }]);
        assert_eq!(exec.surface().flights[0].zoom, 9.0);
    }

    #[test]
    fn clear_markers_removes_only_tracked_overlays() {
        let mut surface = RecordingSurface::default();
        // Someone else's overlay on the same surface.
        let foreign = surface.place_overlay(&OverlaySpec {
            position: LngLat::new(0.0, 0.0),
            style: MarkerStyle::DEFAULT,
            popup: Popup::label("foreign"),
        });

        let mut exec = MapActionExecutor::new(surface);
        exec.execute(&[
            MapAction::AddMarker {
                lat: 1.0,
                lng: 1.0,
                label: "x".to_string(),
            },
            MapAction::AddMarker {
                lat: 2.0,
                lng: 2.0,
                label: "y".to_string(),
            },
            MapAction::ClearMarkers,
        ]);

        assert!(exec.tracked().is_empty());
        assert_eq!(exec.surface().live.keys().copied().collect::<Vec<_>>(), vec![foreign]);
    }

    #[test]
    fn search_without_markers_clears_and_still_navigates() {
        let mut exec = MapActionExecutor::new(RecordingSurface::default());
        exec.execute(&[
            MapAction::AddMarker {
                lat: 1.0,
                lng: 1.0,
                label: "x".to_string(),
            },
            MapAction::SearchProperties {
                lat: Some(10.0),
                lng: Some(20.0),
                zoom: None,
                markers: vec![],
            },
        ]);
        assert!(exec.tracked().is_empty());
        assert_eq!(exec.surface().flights.len(), 1);
        assert_eq!(exec.surface().flights[0].center, LngLat::new(20.0, 10.0));
    }

    #[test]
    fn search_without_coordinates_does_not_move_camera() {
        let mut exec = MapActionExecutor::new(RecordingSurface::default());
        exec.execute(&[MapAction::SearchProperties {
            lat: None,
            lng: None,
            zoom: None,
            markers: vec![marker(1.0, 1.0, "a")],
        }]);
        assert_eq!(exec.tracked().len(), 1);
        assert!(exec.surface().flights.is_empty());
    }

    #[test]
    fn non_finite_positions_are_skipped() {
        let mut exec = MapActionExecutor::new(RecordingSurface::default());
        exec.execute(&[
            MapAction::AddMarker {
                lat: f64::NAN,
                lng: 1.0,
                label: "bad".to_string(),
            },
            MapAction::NavigateTo {
                lat: f64::INFINITY,
                lng: 0.0,
                zoom: None,
            },
        ]);
        assert!(exec.tracked().is_empty());
        assert!(exec.surface().flights.is_empty());
    }

    #[test]
    fn property_markers_get_typed_style() {
        let mut exec = MapActionExecutor::new(RecordingSurface::default());
        let mut house = marker(1.0, 1.0, "h");
        house.kind = Some("maison".to_string());
        exec.execute(&[MapAction::SearchProperties {
            lat: None,
            lng: None,
            zoom: None,
            markers: vec![house],
        }]);
        let spec = exec.surface().live.values().next().unwrap();
        assert_eq!(spec.style, MarkerStyle::HOUSE);
        assert_eq!(spec.popup.property_type.as_deref(), Some("maison"));
    }
}
