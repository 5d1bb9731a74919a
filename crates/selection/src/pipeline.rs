use foundation::math::centroid;
use foundation::{LngLat, Ring};

use crate::area::AreaSelection;
use crate::geocoding::{GeocodeError, Place};

/// Resolves a coordinate to candidate place names, most relevant first.
#[allow(async_fn_in_trait)]
pub trait Geocoder {
    async fn reverse(&self, center: LngLat) -> Result<Vec<Place>, GeocodeError>;
}

/// Interaction mode of the map's drawing control.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum DrawMode {
    #[default]
    Pan,
    Polygon,
}

impl DrawMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DrawMode::Pan => "pan",
            DrawMode::Polygon => "polygon",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pan" => Some(DrawMode::Pan),
            "polygon" => Some(DrawMode::Polygon),
            _ => None,
        }
    }
}

/// The map's polygon drawing control.
pub trait DrawingTool {
    fn set_mode(&mut self, mode: DrawMode);
    fn mode(&self) -> DrawMode;
}

/// Placeholder address when geocoding yields nothing: `"lat, lng"` to 4 decimals.
pub fn fallback_address(center: LngLat) -> String {
    center.format_lat_lng(4)
}

/// Turns finished polygons into [`AreaSelection`]s.
pub struct AreaSelector<G> {
    geocoder: G,
}

impl<G: Geocoder> AreaSelector<G> {
    pub fn new(geocoder: G) -> Self {
        Self { geocoder }
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    /// Handles a draw-complete event for an already validated ring: builds the
    /// selection and returns the tool to [`DrawMode::Pan`].
    ///
    /// Degenerate polygons never get here; [`Ring::from_closed`] rejects them
    /// before a draw is started.
    pub async fn complete_ring<T: DrawingTool>(&self, ring: Ring, tool: &mut T) -> AreaSelection {
        let selection = self.select(ring).await;
        tool.set_mode(DrawMode::Pan);
        selection
    }

    /// Builds a selection for `ring`, resolving its address.
    ///
    /// Never fails: geocoding errors and empty results fall back to the
    /// formatted center coordinate.
    pub async fn select(&self, ring: Ring) -> AreaSelection {
        let center = centroid(&ring);
        let address = match self.geocoder.reverse(center).await {
            Ok(places) => places.into_iter().next().map(|p| p.name),
            Err(err) => {
                tracing::warn!(%err, "reverse geocoding failed");
                None
            }
        }
        .unwrap_or_else(|| fallback_address(center));

        let selection = AreaSelection::new(ring, address);
        tracing::info!(
            address = selection.address(),
            points = selection.point_count(),
            area_m2 = selection.area_square_meters(),
            "area selected"
        );
        selection
    }
}
