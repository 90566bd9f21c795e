//! Pure merge/dedup/ranking of candidates from the two search sources.

use std::collections::HashSet;

use crate::candidate::Candidate;

/// Section titles in presentation order.
pub const RECENT_SECTION_TITLE: &str = "Recent Locations";
pub const NEARBY_SECTION_TITLE: &str = "Nearby Features";
pub const GEOCODED_SECTION_TITLE: &str = "Bengaluru Locations";

/// Trailing affordance, always present after the sections.
pub const USE_MAP_AFFORDANCE: &str = "No match — pick the spot on the map";

/// Hint shown in place of the sections when nothing matched.
pub const EMPTY_STATE_HINT: &str =
    "No matching places found. Try a different name or use the map directly.";

/// Merged, deduplicated suggestion payload.
///
/// `recent`, `nearby` and `geocoded` are the ordered sections; the trailing
/// "use the map" affordance is implied and always rendered. When every
/// section is empty the payload is the dedicated empty state: `hint` is
/// set and there are no sections at all. Search results never carry a
/// `recent` section; it is only populated by
/// [`SuggestionPanel::from_recent`] when the input gains focus while empty.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionPanel {
    pub recent: Vec<Candidate>,
    pub nearby: Vec<Candidate>,
    pub geocoded: Vec<Candidate>,
    pub hint: Option<&'static str>,
}

impl SuggestionPanel {
    /// Panel showing previously chosen locations. Blocklisted entries are
    /// dropped here like everywhere else.
    pub fn from_recent(recent: Vec<Candidate>) -> Self {
        let recent: Vec<Candidate> = recent.into_iter().filter(|c| !c.is_blocked()).collect();
        let hint = if recent.is_empty() {
            Some(EMPTY_STATE_HINT)
        } else {
            None
        };
        Self {
            recent,
            nearby: Vec::new(),
            geocoded: Vec::new(),
            hint,
        }
    }

    /// True when this is the empty-state payload.
    pub fn is_empty(&self) -> bool {
        self.selectable_len() == 0
    }

    /// Number of selectable candidates across all sections.
    pub fn selectable_len(&self) -> usize {
        self.recent.len() + self.nearby.len() + self.geocoded.len()
    }

    /// Candidate at a flattened index, in section order: recent, nearby,
    /// geocoded.
    pub fn candidate_at(&self, index: usize) -> Option<&Candidate> {
        self.recent
            .iter()
            .chain(self.nearby.iter())
            .chain(self.geocoded.iter())
            .nth(index)
    }
}

/// Combine, filter, deduplicate, and rank candidates from both sources.
///
/// Pure function: no I/O, inputs are consumed but not otherwise observed.
/// Blocklisted candidates are dropped from both inputs even though the
/// nearby index already filters its own source; recency and geocoder
/// entries reach this point unchecked. Dedup is first-occurrence-wins over
/// `lowercase(name) + coords rounded to 3 dp`, with the nearby section
/// considered first so feature matches shadow geocoder matches for the same
/// place.
pub fn merge(nearby: Vec<Candidate>, geocoded: Vec<Candidate>) -> SuggestionPanel {
    let mut seen = HashSet::new();
    let mut dropped = 0usize;

    let mut keep = |candidate: Candidate| -> Option<Candidate> {
        if candidate.is_blocked() {
            dropped += 1;
            return None;
        }
        if seen.insert(candidate.dedup_key()) {
            Some(candidate)
        } else {
            None
        }
    };

    let nearby: Vec<Candidate> = nearby.into_iter().filter_map(&mut keep).collect();
    let geocoded: Vec<Candidate> = geocoded.into_iter().filter_map(&mut keep).collect();

    if dropped > 0 {
        log::debug!("Merge dropped {dropped} blocklisted candidate(s)");
    }

    let hint = if nearby.is_empty() && geocoded.is_empty() {
        Some(EMPTY_STATE_HINT)
    } else {
        None
    };

    SuggestionPanel {
        recent: Vec::new(),
        nearby,
        geocoded,
        hint,
    }
}
