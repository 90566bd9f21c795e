//! Seam to the map display surface.
//!
//! The engine never renders; it drives whatever map implementation the
//! host application injects.

use crate::coords::LatLng;

/// Default view over central Bengaluru.
pub const DEFAULT_CENTER: LatLng = LatLng {
    lat: 12.9716,
    lng: 77.5946,
};
pub const DEFAULT_ZOOM: u8 = 13;

/// Zoom applied when a selection is committed.
pub const COMMIT_ZOOM: u8 = 15;

/// Operations the engine needs from the host's map.
pub trait MapSurface {
    /// Place (or move) the location marker.
    fn set_marker(&mut self, coords: LatLng);
    /// Recenter the view.
    fn set_view(&mut self, coords: LatLng, zoom: u8);
    /// Draw a transient highlight, replacing any existing one.
    fn add_highlight(&mut self, coords: LatLng);
    /// Remove the transient highlight, if any.
    fn remove_highlight(&mut self);
}

/// Map surface that only logs. Installed by the CLI driver, where there is
/// no map to draw on.
#[derive(Debug, Default)]
pub struct LoggingMapSurface;

impl MapSurface for LoggingMapSurface {
    fn set_marker(&mut self, coords: LatLng) {
        log::info!("map: marker -> {}", coords.display());
    }

    fn set_view(&mut self, coords: LatLng, zoom: u8) {
        log::info!("map: view -> {} @ z{zoom}", coords.display());
    }

    fn add_highlight(&mut self, coords: LatLng) {
        log::info!("map: highlight -> {}", coords.display());
    }

    fn remove_highlight(&mut self) {
        log::info!("map: highlight removed");
    }
}
