//! Suggestion session: the state machine driving panel visibility,
//! keyboard/pointer selection, and selection commit.

use crate::candidate::Candidate;
use crate::map::{MapSurface, COMMIT_ZOOM};
use crate::merge::SuggestionPanel;
use crate::recency::{RecencyEntry, RecencyStore};

/// Keys the session reacts to while the panel is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKey {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
}

/// What a key press asks the surrounding application to do.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyOutcome {
    /// Nothing further to do.
    None,
    /// A candidate was committed: the marker and recency list are already
    /// updated; the application should re-fetch nearby features around the
    /// committed coordinate.
    Committed(Candidate),
    /// Enter on an empty panel: re-issue an immediate, non-debounced
    /// geocoder search for the current input text.
    Reissue,
}

#[derive(Debug)]
enum SessionState {
    Closed,
    Open {
        panel: SuggestionPanel,
        /// Flattened selection index; `None` means nothing highlighted.
        selected: Option<usize>,
    },
}

/// Panel state machine. Owns no collaborators; the map surface and recency
/// store are passed in at the call sites that need them so the session can
/// be unit tested without a rendering surface.
pub struct SuggestionSession {
    state: SessionState,
}

impl Default for SuggestionSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SuggestionSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Closed,
        }
    }

    /// Open (or refresh) the panel with a merged payload. Selection resets
    /// to nothing highlighted.
    pub fn show(&mut self, panel: SuggestionPanel) {
        self.state = SessionState::Open {
            panel,
            selected: None,
        };
    }

    /// Close the panel and reset the selection. Also the handler for
    /// pointer interaction outside the panel.
    pub fn dismiss(&mut self) {
        self.state = SessionState::Closed;
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, SessionState::Open { .. })
    }

    pub fn panel(&self) -> Option<&SuggestionPanel> {
        match &self.state {
            SessionState::Open { panel, .. } => Some(panel),
            SessionState::Closed => None,
        }
    }

    pub fn selected(&self) -> Option<usize> {
        match &self.state {
            SessionState::Open { selected, .. } => *selected,
            SessionState::Closed => None,
        }
    }

    /// Route a key press. Commit side effects (marker, view, recency) run
    /// against the passed-in collaborators before this returns.
    pub fn handle_key(
        &mut self,
        key: SessionKey,
        map: &mut dyn MapSurface,
        recency: &mut RecencyStore,
    ) -> KeyOutcome {
        let SessionState::Open { panel, selected } = &mut self.state else {
            return KeyOutcome::None;
        };
        let count = panel.selectable_len();

        match key {
            SessionKey::ArrowDown => {
                if count > 0 {
                    let next = match *selected {
                        Some(i) => (i + 1) % count,
                        None => 0,
                    };
                    *selected = Some(next);
                    if let Some(c) = panel.candidate_at(next) {
                        map.add_highlight(c.coords);
                    }
                }
                KeyOutcome::None
            }
            SessionKey::ArrowUp => {
                if count > 0 {
                    let next = match *selected {
                        Some(0) | None => count - 1,
                        Some(i) => i - 1,
                    };
                    *selected = Some(next);
                    if let Some(c) = panel.candidate_at(next) {
                        map.add_highlight(c.coords);
                    }
                }
                KeyOutcome::None
            }
            SessionKey::Enter => {
                if count == 0 {
                    return KeyOutcome::Reissue;
                }
                // Default Enter target: the first selectable candidate.
                let index = selected.unwrap_or(0);
                let Some(candidate) = panel.candidate_at(index).cloned() else {
                    return KeyOutcome::None;
                };
                self.commit(candidate, map, recency)
            }
            SessionKey::Escape => {
                map.remove_highlight();
                self.dismiss();
                KeyOutcome::None
            }
        }
    }

    /// Commit a candidate: marker, view, recency entry, close.
    ///
    /// A blocklisted candidate is a defensive no-op and the panel stays
    /// open.
    pub fn commit(
        &mut self,
        candidate: Candidate,
        map: &mut dyn MapSurface,
        recency: &mut RecencyStore,
    ) -> KeyOutcome {
        if candidate.is_blocked() {
            log::warn!(
                "Refusing to commit blocklisted candidate {:?}",
                candidate.external_id
            );
            return KeyOutcome::None;
        }

        log::debug!("Committing \"{}\" at {}", candidate.name, candidate.coords.display());
        map.remove_highlight();
        map.set_marker(candidate.coords);
        map.set_view(candidate.coords, COMMIT_ZOOM);
        recency.record(RecencyEntry::from_candidate(&candidate));
        self.dismiss();
        KeyOutcome::Committed(candidate)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;
