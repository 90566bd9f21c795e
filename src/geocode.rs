//! Forward geocoding client.
//!
//! Resolves free text to named candidates inside the service area via a
//! Nominatim-style `/search` endpoint, constrained to a fixed bounding box
//! and country filter. Calls observe a cancellation token at every
//! suspension point; a cancelled call never returns data.

use reqwest::Client;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::candidate::{Candidate, SourceKind};
use crate::coords::LatLng;
use crate::error::SearchError;

/// Service area: `left,top,right,bottom` around Bengaluru.
pub const SERVICE_VIEWBOX: &str = "77.4602,13.1439,77.7845,12.8349";

/// Country filter for the geocoder.
pub const COUNTRY_FILTER: &str = "in";

/// Maximum results requested per query.
pub const RESULT_LIMIT: u32 = 10;

const USER_AGENT: &str = concat!("civiq/", env!("CARGO_PKG_VERSION"));

/// Bounded forward geocoder.
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    client: Client,
    endpoint: String,
}

impl GeocodeClient {
    pub fn new(client: Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }

    /// Resolve free text to candidates inside the service area.
    ///
    /// Returns `Err(SearchError::Cancelled)` if the token fires before the
    /// response resolves; the caller never receives stale data from a
    /// cancelled call. Non-success responses map to
    /// `SearchError::Geocode` with the upstream status.
    pub async fn search(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Candidate>, SearchError> {
        if cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        let limit = RESULT_LIMIT.to_string();
        let request = self
            .client
            .get(&self.endpoint)
            .header("user-agent", USER_AGENT)
            .query(&[
                ("q", text),
                ("format", "json"),
                ("viewbox", SERVICE_VIEWBOX),
                ("bounded", "1"),
                ("countrycodes", COUNTRY_FILTER),
                ("limit", limit.as_str()),
                ("addressdetails", "1"),
            ]);

        let response = tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                log::debug!("Geocode request cancelled before response");
                return Err(SearchError::Cancelled);
            }

            result = request.send() => {
                result.map_err(|e| SearchError::Geocode {
                    status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                    message: e.to_string(),
                })?
            }
        };

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SearchError::Geocode {
                status: status.as_u16(),
                message,
            });
        }

        let hits: Vec<GeocodeHit> = tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                log::debug!("Geocode request cancelled while reading body");
                return Err(SearchError::Cancelled);
            }

            body = response.json() => {
                body.map_err(|e| SearchError::Geocode {
                    status: status.as_u16(),
                    message: format!("Malformed geocoder response: {e}"),
                })?
            }
        };

        Ok(hits.into_iter().filter_map(normalize_hit).collect())
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeHit {
    display_name: String,
    lat: String,
    lon: String,
    osm_id: Option<u64>,
    #[allow(dead_code)]
    osm_type: Option<String>,
}

/// Map a raw geocoder hit to a candidate.
///
/// The name is the first comma-delimited segment of the display string; the
/// remainder is kept as a locality hint for presentation. Hits with
/// unparseable or non-finite coordinates are dropped.
fn normalize_hit(hit: GeocodeHit) -> Option<Candidate> {
    let lat: f64 = hit.lat.parse().ok()?;
    let lon: f64 = hit.lon.parse().ok()?;
    let coords = LatLng::new(lat, lon)?;

    let (name, locality) = match hit.display_name.split_once(',') {
        Some((head, rest)) => (head.trim().to_string(), Some(rest.trim().to_string())),
        None => (hit.display_name.trim().to_string(), None),
    };
    if name.is_empty() {
        return None;
    }

    Some(Candidate {
        name,
        coords,
        source: SourceKind::Geocoded,
        external_id: hit.osm_id.map(|id| id.to_string()),
        category: None,
        locality,
    })
}
