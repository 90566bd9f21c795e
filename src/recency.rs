//! Bounded, persisted list of previously chosen locations.
//!
//! Backed by one reserved key in the key-value store. Malformed or missing
//! data degrades to an empty list; storage failures never reach the caller.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::candidate::{Candidate, SourceKind};
use crate::coords::LatLng;
use crate::kv::KeyValueStore;

/// Reserved key in the backing store.
pub const RECENCY_KEY: &str = "civiq.recent-locations";

/// Most-recent-first cap.
pub const MAX_RECENT: usize = 5;

/// One committed location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecencyEntry {
    pub name: String,
    pub coords: LatLng,
    pub external_id: Option<String>,
    /// Epoch milliseconds at commit time.
    pub timestamp: i64,
}

impl RecencyEntry {
    /// Build an entry for a committed candidate, stamped now.
    pub fn from_candidate(candidate: &Candidate) -> Self {
        Self {
            name: candidate.name.clone(),
            coords: candidate.coords,
            external_id: candidate.external_id.clone(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// Re-surface the entry as a selectable candidate.
    pub fn to_candidate(&self) -> Candidate {
        Candidate {
            name: self.name.clone(),
            coords: self.coords,
            source: SourceKind::Recent,
            external_id: self.external_id.clone(),
            category: None,
            locality: None,
        }
    }
}

/// Bounded recency list persisted under [`RECENCY_KEY`].
pub struct RecencyStore {
    store: Box<dyn KeyValueStore>,
}

impl RecencyStore {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Insert or move an entry to the front, unique by name, trimmed to
    /// [`MAX_RECENT`].
    pub fn record(&mut self, entry: RecencyEntry) {
        let mut entries = self.list();
        entries.retain(|e| e.name != entry.name);
        entries.insert(0, entry);
        entries.truncate(MAX_RECENT);
        self.save(&entries);
    }

    /// Entries most-recent-first. Missing or malformed persisted data reads
    /// as an empty list.
    pub fn list(&self) -> Vec<RecencyEntry> {
        let Some(raw) = self.store.get(RECENCY_KEY) else {
            return Vec::new();
        };
        match serde_json::from_str::<Vec<RecencyEntry>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Discarding malformed recency data: {e}");
                Vec::new()
            }
        }
    }

    pub fn clear(&mut self) {
        self.store.remove(RECENCY_KEY);
    }

    fn save(&mut self, entries: &[RecencyEntry]) {
        match serde_json::to_string(entries) {
            Ok(json) => self.store.set(RECENCY_KEY, &json),
            Err(e) => log::warn!("Failed to serialize recency list: {e}"),
        }
    }
}
