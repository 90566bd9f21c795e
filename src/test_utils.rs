//! Shared test utilities for civiq
//!
//! This module provides common fixtures and helpers used across multiple
//! test modules.

use crate::candidate::{Candidate, SourceKind};
use crate::coords::LatLng;
use crate::map::MapSurface;

/// Helper to build a candidate with the given source and no upstream id.
pub fn candidate(name: &str, lat: f64, lng: f64, source: SourceKind) -> Candidate {
    Candidate {
        name: name.to_string(),
        coords: LatLng::new(lat, lng).expect("test coordinates must be finite"),
        source,
        external_id: None,
        category: None,
        locality: None,
    }
}

/// Helper to build a nearby-feature candidate with a category and id.
pub fn nearby_candidate(name: &str, category: &str, lat: f64, lng: f64) -> Candidate {
    let mut c = candidate(name, lat, lng, SourceKind::NearbyFeature);
    c.category = Some(category.to_string());
    c.external_id = Some("1001".to_string());
    c
}

/// Map surface that records the last call of each kind.
#[derive(Debug, Default)]
pub struct RecordingMapSurface {
    pub marker: Option<LatLng>,
    pub view: Option<(LatLng, u8)>,
    pub highlight: Option<LatLng>,
    pub highlight_removed: u32,
}

impl MapSurface for RecordingMapSurface {
    fn set_marker(&mut self, coords: LatLng) {
        self.marker = Some(coords);
    }

    fn set_view(&mut self, coords: LatLng, zoom: u8) {
        self.view = Some((coords, zoom));
    }

    fn add_highlight(&mut self, coords: LatLng) {
        self.highlight = Some(coords);
    }

    fn remove_highlight(&mut self) {
        self.highlight_removed += 1;
        self.highlight = None;
    }
}

/// Helper to run async tests with a current-thread tokio runtime.
pub fn run_async<F: std::future::Future>(f: F) -> F::Output {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to create tokio runtime");
    rt.block_on(f)
}
