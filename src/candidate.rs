//! The unified candidate shape shared by every suggestion source.
//!
//! Nearby features, geocoder hits, and recency entries are all normalized
//! into [`Candidate`] at their source boundary, so the merger, blocklist,
//! and selection logic never branch on source-specific shapes.

use serde::{Deserialize, Serialize};

use crate::coords::LatLng;

/// External ids known to be data artifacts in the upstream POI index.
/// Candidates carrying one of these ids are dropped everywhere: at the
/// fetch boundary, in the merger, and at commit.
pub const BLOCKED_EXTERNAL_IDS: &[&str] = &["459471357"];

/// Which source produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    /// A point of interest from the radius POI index.
    NearbyFeature,
    /// A forward-geocoded match for free text.
    Geocoded,
    /// A previously committed location from the recency list.
    Recent,
}

/// A place the user can select from the suggestion panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Display string.
    pub name: String,
    /// Always finite; enforced by [`LatLng::new`] at the source boundary.
    pub coords: LatLng,
    pub source: SourceKind,
    /// Opaque id from the originating service; `None` for purely textual
    /// matches. Used for blocklist checks and dedup.
    pub external_id: Option<String>,
    /// Short tag like "restaurant"; present only for nearby features.
    pub category: Option<String>,
    /// Locality hint from the geocoder's full display string, kept for
    /// presentation under the name.
    pub locality: Option<String>,
}

impl Candidate {
    /// True when this candidate's external id is a known data artifact.
    pub fn is_blocked(&self) -> bool {
        match &self.external_id {
            Some(id) => BLOCKED_EXTERNAL_IDS.contains(&id.as_str()),
            None => false,
        }
    }

    /// Dedup key: lowercased name plus coordinates rounded to 3 decimal
    /// places. Two candidates with the same key are the same place.
    pub fn dedup_key(&self) -> (String, (i64, i64)) {
        (self.name.to_lowercase(), self.coords.dedup_key())
    }
}
