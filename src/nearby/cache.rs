//! TTL + capacity bounded cache for nearby-feature fetches.
//!
//! Keys are `(lat, lng)` rounded to 4 decimal places plus the query radius,
//! so repeated fetches around the same map position hit the same bucket.
//! Entries expire 5 minutes after creation; the cache holds at most 20
//! entries, evicting oldest-created first.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::candidate::Candidate;
use crate::coords::LatLng;

pub const CACHE_TTL: Duration = Duration::from_secs(300);
pub const CACHE_CAPACITY: usize = 20;

/// `(rounded lat, rounded lng, radius in meters)`.
pub type BucketKey = (i64, i64, u32);

pub fn bucket_key(coords: LatLng, radius: u32) -> BucketKey {
    let (lat, lng) = coords.bucket_key();
    (lat, lng, radius)
}

struct CacheEntry {
    features: Vec<Candidate>,
    created: Instant,
}

/// Bounded cache of normalized nearby-feature lists.
pub struct FeatureCache {
    entries: HashMap<BucketKey, CacheEntry>,
    ttl: Duration,
    capacity: usize,
}

impl Default for FeatureCache {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureCache {
    pub fn new() -> Self {
        Self::with_limits(CACHE_TTL, CACHE_CAPACITY)
    }

    /// Cache with explicit limits. Used by tests.
    pub fn with_limits(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            capacity,
        }
    }

    /// The cached feature list for this bucket, if present and younger than
    /// the TTL. Expired entries are dropped on access.
    pub fn get(&mut self, key: &BucketKey) -> Option<&[Candidate]> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.created.elapsed() >= self.ttl,
            None => return None,
        };
        if expired {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|e| e.features.as_slice())
    }

    /// Store a freshly fetched list, evicting oldest-created entries once
    /// the capacity is exceeded.
    pub fn insert(&mut self, key: BucketKey, features: Vec<Candidate>) {
        self.entries.insert(
            key,
            CacheEntry {
                features,
                created: Instant::now(),
            },
        );
        while self.entries.len() > self.capacity {
            let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, e)| e.created)
                .map(|(k, _)| *k)
            else {
                break;
            };
            log::debug!("Feature cache full, evicting bucket {oldest:?}");
            self.entries.remove(&oldest);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
