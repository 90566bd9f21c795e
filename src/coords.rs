//! WGS84 coordinate pair with the rounding keys used by the cache and dedup
//! layers, plus parsing of free-text `"lat, lng"` input.

use serde::{Deserialize, Serialize};

/// A WGS84 coordinate pair.
///
/// Construction goes through [`LatLng::new`], which rejects non-finite
/// components so downstream code (cache keys, dedup keys, the merger) can
/// rely on finite values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Create a coordinate pair, rejecting NaN/infinite components.
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        if lat.is_finite() && lng.is_finite() {
            Some(Self { lat, lng })
        } else {
            None
        }
    }

    /// Cache bucket key: both components rounded to 4 decimal places,
    /// scaled to integers so the key is hashable and exact.
    pub fn bucket_key(&self) -> (i64, i64) {
        (round_scaled(self.lat, 1e4), round_scaled(self.lng, 1e4))
    }

    /// Dedup key component: both components rounded to 3 decimal places.
    pub fn dedup_key(&self) -> (i64, i64) {
        (round_scaled(self.lat, 1e3), round_scaled(self.lng, 1e3))
    }

    /// Canonical display rendering, 4 decimal places.
    pub fn display(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lng)
    }
}

fn round_scaled(value: f64, scale: f64) -> i64 {
    (value * scale).round() as i64
}

/// Parse free text of the form `"12.9716, 77.5946"` into a coordinate pair.
///
/// Accepts optional whitespace around the comma. Returns `None` for anything
/// that is not exactly two finite numbers.
pub fn parse_latlng(text: &str) -> Option<LatLng> {
    let (lat_str, lng_str) = text.split_once(',')?;
    let lat: f64 = lat_str.trim().parse().ok()?;
    let lng: f64 = lng_str.trim().parse().ok()?;
    LatLng::new(lat, lng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_rejects_non_finite() {
        assert!(LatLng::new(f64::NAN, 77.0).is_none());
        assert!(LatLng::new(12.0, f64::INFINITY).is_none());
        assert!(LatLng::new(f64::NEG_INFINITY, f64::NAN).is_none());
        assert!(LatLng::new(12.9716, 77.5946).is_some());
    }

    #[test]
    fn test_bucket_key_rounds_to_4dp() {
        let a = LatLng::new(12.97161, 77.59459).unwrap();
        let b = LatLng::new(12.97159, 77.59461).unwrap();
        assert_eq!(a.bucket_key(), b.bucket_key());

        let c = LatLng::new(12.9721, 77.5946).unwrap();
        assert_ne!(a.bucket_key(), c.bucket_key());
    }

    #[test]
    fn test_dedup_key_rounds_to_3dp() {
        let a = LatLng::new(12.9716, 77.5946).unwrap();
        let b = LatLng::new(12.9718, 77.5948).unwrap();
        assert_eq!(a.dedup_key(), b.dedup_key());

        let c = LatLng::new(12.9726, 77.5946).unwrap();
        assert_ne!(a.dedup_key(), c.dedup_key());
    }

    #[test]
    fn test_parse_latlng_valid() {
        let coords = parse_latlng("12.9716, 77.5946").unwrap();
        assert!((coords.lat - 12.9716).abs() < 1e-9);
        assert!((coords.lng - 77.5946).abs() < 1e-9);

        // No space after comma
        assert!(parse_latlng("12.9716,77.5946").is_some());
        // Extra whitespace
        assert!(parse_latlng("  12.9716 ,  77.5946  ").is_some());
    }

    #[test]
    fn test_parse_latlng_invalid() {
        assert!(parse_latlng("MG Road").is_none());
        assert!(parse_latlng("12.9716").is_none());
        assert!(parse_latlng("12.9716, abc").is_none());
        assert!(parse_latlng("NaN, 77.5946").is_none());
        assert!(parse_latlng("inf, 77.5946").is_none());
        assert!(parse_latlng("").is_none());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_parse_roundtrips_finite_pairs(
            lat in -90.0f64..90.0,
            lng in -180.0f64..180.0,
        ) {
            let text = format!("{}, {}", lat, lng);
            let parsed = parse_latlng(&text);
            prop_assert!(parsed.is_some());
            let coords = parsed.unwrap();
            prop_assert!((coords.lat - lat).abs() < 1e-9);
            prop_assert!((coords.lng - lng).abs() < 1e-9);
        }

        #[test]
        fn prop_nearby_points_share_bucket(
            lat in -89.0f64..89.0,
            lng in -179.0f64..179.0,
        ) {
            // A perturbation well below the rounding resolution never
            // changes the bucket key.
            let a = LatLng::new(lat, lng).unwrap();
            let b = LatLng::new(lat + 1e-6, lng - 1e-6).unwrap();
            let close = (a.bucket_key().0 - b.bucket_key().0).abs() <= 1
                && (a.bucket_key().1 - b.bucket_key().1).abs() <= 1;
            prop_assert!(close);
        }
    }
}
