//! Nearby-feature index: radius POI lookups against an Overpass-style
//! map-data query endpoint, with a TTL-bounded cache and a substring
//! matcher over the most recently loaded result set.

pub mod cache;

use std::collections::HashMap;

use reqwest::Client;
use serde::Deserialize;

use crate::candidate::{Candidate, SourceKind};
use crate::coords::LatLng;
use crate::error::SearchError;
use cache::{bucket_key, FeatureCache};

/// Tag keys that mark a man-made point of interest. Order matters: the
/// first present key supplies the candidate's category.
const POI_CATEGORIES: &[&str] = &[
    "amenity",
    "shop",
    "tourism",
    "leisure",
    "healthcare",
    "office",
    "emergency",
    "public_transport",
];

/// Radius POI index with cache-first fetching.
///
/// The last successful fetch stays resident for [`NearbyIndex::match_loaded`],
/// which lets typed text surface already-known nearby places without a
/// network round trip.
pub struct NearbyIndex {
    client: Client,
    endpoint: String,
    cache: FeatureCache,
    resident: Vec<Candidate>,
}

impl NearbyIndex {
    pub fn new(client: Client, endpoint: String) -> Self {
        Self {
            client,
            endpoint,
            cache: FeatureCache::new(),
            resident: Vec::new(),
        }
    }

    /// Fetch points of interest within `radius` meters of `coords`,
    /// truncated to `limit`.
    ///
    /// Cache-first: a bucket fetched less than the TTL ago is served
    /// verbatim. Fresh results are normalized, blocklist-filtered, cached
    /// un-truncated, and retained as the resident set for the substring
    /// matcher.
    pub async fn fetch(
        &mut self,
        coords: LatLng,
        radius: u32,
        limit: usize,
    ) -> Result<Vec<Candidate>, SearchError> {
        let key = bucket_key(coords, radius);
        if let Some(cached) = self.cache.get(&key) {
            log::debug!("Feature cache hit for bucket {key:?}");
            let features = cached.to_vec();
            self.resident = features.clone();
            return Ok(features.into_iter().take(limit).collect());
        }

        log::debug!("Feature cache miss for bucket {key:?}, querying POI index");
        let query = build_query(coords, radius);
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("data", query.as_str())])
            .send()
            .await
            .map_err(|e| SearchError::NearbyFetch {
                status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SearchError::NearbyFetch {
                status: status.as_u16(),
                message,
            });
        }

        let body: OverpassResponse =
            response
                .json()
                .await
                .map_err(|e| SearchError::NearbyFetch {
                    status: status.as_u16(),
                    message: format!("Malformed POI response: {e}"),
                })?;

        let features: Vec<Candidate> = body
            .elements
            .into_iter()
            .filter_map(normalize_element)
            .filter(|c| !c.is_blocked())
            .collect();

        self.cache.insert(key, features.clone());
        self.resident = features.clone();
        Ok(features.into_iter().take(limit).collect())
    }

    /// Case-insensitive substring match against name or category over the
    /// resident set from the last fetch. Never touches the network: typed
    /// text should surface already-loaded places instantly while the slower
    /// geocoder call is in flight.
    pub fn match_loaded(&self, query: &str) -> Vec<Candidate> {
        let needle = query.to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.resident
            .iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&needle)
                    || c.category
                        .as_deref()
                        .is_some_and(|cat| cat.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn set_resident(&mut self, features: Vec<Candidate>) {
        self.resident = features;
    }
}

/// Overpass QL query for man-made points of interest around a coordinate.
///
/// One clause per recognized tag key; each clause drops road and building
/// geometry explicitly. `out center` gives ways and relations a
/// representative point.
fn build_query(coords: LatLng, radius: u32) -> String {
    let mut clauses = String::new();
    for key in POI_CATEGORIES {
        clauses.push_str(&format!(
            "nwr(around:{radius},{lat:.7},{lng:.7})[\"{key}\"][!\"highway\"][!\"building\"];",
            lat = coords.lat,
            lng = coords.lng,
        ));
    }
    format!("[out:json][timeout:25];({clauses});out center;")
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    id: u64,
    #[serde(rename = "type")]
    kind: String,
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<OverpassCenter>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct OverpassCenter {
    lat: f64,
    lon: f64,
}

impl OverpassElement {
    fn coords(&self) -> Option<LatLng> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => LatLng::new(lat, lon),
            _ => self
                .center
                .as_ref()
                .and_then(|c| LatLng::new(c.lat, c.lon)),
        }
    }
}

/// Normalize a raw POI element into a candidate.
///
/// Elements without usable coordinates are dropped. An unnamed element
/// falls back to `"<category> #<id>"`, or `"<element type> #<id>"` when no
/// recognized category is present either.
fn normalize_element(element: OverpassElement) -> Option<Candidate> {
    let coords = element.coords()?;

    let category_key = POI_CATEGORIES
        .iter()
        .find(|key| element.tags.contains_key(**key));
    let category = category_key
        .and_then(|key| element.tags.get(*key))
        .cloned()
        .unwrap_or_else(|| "other".to_string());

    let name = match element.tags.get("name") {
        Some(name) if !name.trim().is_empty() => name.clone(),
        _ => {
            let kind = if category == "other" {
                element.kind.as_str()
            } else {
                category.as_str()
            };
            format!("{kind} #{}", element.id)
        }
    };

    Some(Candidate {
        name,
        coords,
        source: SourceKind::NearbyFeature,
        external_id: Some(element.id.to_string()),
        category: Some(category),
        locality: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::nearby_candidate;

    fn element(json: serde_json::Value) -> OverpassElement {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_build_query_covers_all_categories() {
        let coords = LatLng::new(12.9716, 77.5946).unwrap();
        let query = build_query(coords, 500);

        for key in POI_CATEGORIES {
            assert!(query.contains(&format!("[\"{key}\"]")), "missing {key}");
        }
        assert!(query.contains("around:500"));
        assert!(query.contains("[!\"highway\"]"));
        assert!(query.contains("[!\"building\"]"));
        assert!(query.contains("out center"));
    }

    #[test]
    fn test_normalize_named_node() {
        let c = normalize_element(element(serde_json::json!({
            "id": 12345,
            "type": "node",
            "lat": 12.9716,
            "lon": 77.5946,
            "tags": {"amenity": "restaurant", "name": "Cafe X"}
        })))
        .unwrap();

        assert_eq!(c.name, "Cafe X");
        assert_eq!(c.category.as_deref(), Some("restaurant"));
        assert_eq!(c.external_id.as_deref(), Some("12345"));
        assert_eq!(c.source, SourceKind::NearbyFeature);
    }

    #[test]
    fn test_normalize_unnamed_falls_back_to_category_and_id() {
        let c = normalize_element(element(serde_json::json!({
            "id": 987,
            "type": "node",
            "lat": 12.9716,
            "lon": 77.5946,
            "tags": {"shop": "bakery"}
        })))
        .unwrap();

        assert_eq!(c.name, "bakery #987");
    }

    #[test]
    fn test_normalize_unrecognized_tags_category_other() {
        let c = normalize_element(element(serde_json::json!({
            "id": 42,
            "type": "way",
            "center": {"lat": 12.9716, "lon": 77.5946},
            "tags": {"man_made": "water_tower"}
        })))
        .unwrap();

        assert_eq!(c.category.as_deref(), Some("other"));
        assert_eq!(c.name, "way #42");
    }

    #[test]
    fn test_normalize_way_uses_center_coordinates() {
        let c = normalize_element(element(serde_json::json!({
            "id": 7,
            "type": "way",
            "center": {"lat": 12.95, "lon": 77.60},
            "tags": {"leisure": "park", "name": "Cubbon Park"}
        })))
        .unwrap();

        assert!((c.coords.lat - 12.95).abs() < 1e-9);
        assert!((c.coords.lng - 77.60).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_drops_element_without_coordinates() {
        let result = normalize_element(element(serde_json::json!({
            "id": 7,
            "type": "relation",
            "tags": {"amenity": "hospital"}
        })));
        assert!(result.is_none());
    }

    #[test]
    fn test_category_priority_follows_recognized_order() {
        // amenity comes before shop in the recognized list.
        let c = normalize_element(element(serde_json::json!({
            "id": 8,
            "type": "node",
            "lat": 12.9716,
            "lon": 77.5946,
            "tags": {"shop": "convenience", "amenity": "cafe"}
        })))
        .unwrap();
        assert_eq!(c.category.as_deref(), Some("cafe"));
    }

    #[test]
    fn test_match_loaded_by_name_and_category() {
        let mut index = NearbyIndex::new(Client::new(), "http://unused".to_string());
        index.set_resident(vec![
            nearby_candidate("Koshy's", "restaurant", 12.97, 77.59),
            nearby_candidate("Blossom Book House", "books", 12.975, 77.6),
            nearby_candidate("Corner House", "restaurant", 12.96, 77.58),
        ]);

        let by_name = index.match_loaded("house");
        assert_eq!(by_name.len(), 2);

        let by_category = index.match_loaded("restaurant");
        assert_eq!(by_category.len(), 2);
        assert!(by_category.iter().all(|c| c.category.as_deref() == Some("restaurant")));

        assert!(index.match_loaded("xyz").is_empty());
        assert!(index.match_loaded("").is_empty());
    }

    #[test]
    fn test_match_loaded_is_case_insensitive() {
        let mut index = NearbyIndex::new(Client::new(), "http://unused".to_string());
        index.set_resident(vec![nearby_candidate("Koshy's", "restaurant", 12.97, 77.59)]);

        assert_eq!(index.match_loaded("KOSHY").len(), 1);
        assert_eq!(index.match_loaded("koshy").len(), 1);
    }
}
