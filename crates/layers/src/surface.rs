use foundation::LngLat;
use serde::Serialize;

use crate::popup::Popup;
use crate::symbology::MarkerStyle;

/// Handle to an overlay placed on a [`MapSurface`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Overlay(pub u32);

/// Where the camera should go.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct CameraTarget {
    pub center: LngLat,
    pub zoom: f64,
}

/// Everything the surface needs to draw one marker overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlaySpec {
    pub position: LngLat,
    pub style: MarkerStyle,
    pub popup: Popup,
}

/// The live map as seen by the action executor.
pub trait MapSurface {
    fn fly_to(&mut self, target: CameraTarget);

    fn place_overlay(&mut self, spec: &OverlaySpec) -> Overlay;

    fn remove_overlay(&mut self, overlay: Overlay);
}
