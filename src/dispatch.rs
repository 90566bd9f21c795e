//! Query dispatcher: debounces input, owns cancellation tokens, races the
//! geocoder against the overall timeout, and guarantees that only the most
//! recent query's result is ever rendered.

use std::future::Future;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::candidate::{Candidate, SourceKind};
use crate::coords::parse_latlng;
use crate::error::SearchError;
use crate::geocode::GeocodeClient;
use crate::merge::{merge, SuggestionPanel};
use crate::nearby::NearbyIndex;

/// Input shorter than this clears the panel without dispatching.
pub const MIN_QUERY_LEN: usize = 3;

/// Quiet window before a dispatched query.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

/// Upper bound on the combined search, regardless of network behavior.
pub const SEARCH_TIMEOUT: Duration = Duration::from_secs(5);

/// One query generation: a monotonically increasing id plus the token that
/// cancels the generation's outstanding calls. At most one token is live;
/// results carrying a superseded token are discarded unconditionally.
#[derive(Debug, Clone)]
pub struct SearchToken {
    id: u64,
    cancel: CancellationToken,
}

impl SearchToken {
    fn new(id: u64) -> Self {
        Self {
            id,
            cancel: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }
}

/// What the driver should do to the suggestion panel after a dispatcher
/// step. Cancelled/superseded branches produce no update at all.
#[derive(Debug)]
pub enum PanelUpdate {
    /// Input too short: close the panel.
    Clear,
    /// Render the merged sections (or the empty-state payload).
    Sections(SuggestionPanel),
    /// Show a transient error status.
    Error(SearchError),
}

/// Debounced request timing.
///
/// Tracks when the last input occurred and whether a dispatch is pending.
/// Rapid keystrokes each restart the window, coalescing a burst into a
/// single query once the configured delay has elapsed.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    last_input: Option<Instant>,
    pending: bool,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_input: None,
            pending: false,
        }
    }

    /// Record input and (re)start the quiet window.
    pub fn schedule(&mut self) {
        self.last_input = Some(Instant::now());
        self.pending = true;
    }

    /// Drop any pending dispatch.
    pub fn cancel(&mut self) {
        self.pending = false;
        self.last_input = None;
    }

    /// True when a dispatch is pending and the window has elapsed.
    pub fn is_ready(&self) -> bool {
        self.pending
            && self
                .last_input
                .is_some_and(|t| t.elapsed() >= self.delay)
    }

    /// Clear the pending dispatch after it has been taken.
    pub fn mark_complete(&mut self) {
        self.pending = false;
        self.last_input = None;
    }

    pub fn has_pending(&self) -> bool {
        self.pending
    }
}

/// Drives one query at a time from input change to rendered panel.
pub struct QueryDispatcher {
    debouncer: Debouncer,
    timeout: Duration,
    next_id: u64,
    live: Option<SearchToken>,
    pending_text: String,
}

impl QueryDispatcher {
    pub fn new(debounce: Duration, timeout: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(debounce),
            timeout,
            next_id: 0,
            live: None,
            pending_text: String::new(),
        }
    }

    /// Handle an input change.
    ///
    /// Short input cancels everything outstanding and clears the panel;
    /// otherwise the debounce window (re)starts and the text waits for
    /// [`QueryDispatcher::run_pending`].
    pub fn on_input(&mut self, text: &str) -> Option<PanelUpdate> {
        if text.chars().count() < MIN_QUERY_LEN {
            self.debouncer.cancel();
            self.invalidate_live();
            self.pending_text.clear();
            return Some(PanelUpdate::Clear);
        }
        self.pending_text = text.to_string();
        self.debouncer.schedule();
        None
    }

    /// True when the debounce window has elapsed and a query is waiting.
    pub fn poll_ready(&self) -> bool {
        self.debouncer.is_ready()
    }

    /// True when input has been scheduled and not yet dispatched.
    pub fn has_pending_query(&self) -> bool {
        self.debouncer.has_pending()
    }

    /// Dispatch the debounced query, if one is ready.
    pub async fn run_pending(
        &mut self,
        geocoder: &GeocodeClient,
        nearby: &NearbyIndex,
    ) -> Option<PanelUpdate> {
        if !self.debouncer.is_ready() {
            return None;
        }
        self.debouncer.mark_complete();
        let text = std::mem::take(&mut self.pending_text);
        self.execute(&text, geocoder, nearby).await
    }

    /// Immediate, non-debounced dispatch. Used when the user presses Enter
    /// on an empty result panel.
    pub async fn run_now(
        &mut self,
        text: &str,
        geocoder: &GeocodeClient,
        nearby: &NearbyIndex,
    ) -> Option<PanelUpdate> {
        if text.chars().count() < MIN_QUERY_LEN {
            return None;
        }
        self.debouncer.cancel();
        self.execute(text, geocoder, nearby).await
    }

    async fn execute(
        &mut self,
        text: &str,
        geocoder: &GeocodeClient,
        nearby: &NearbyIndex,
    ) -> Option<PanelUpdate> {
        let token = self.issue_token();

        // Typed coordinate pairs resolve instantly, no network involved.
        if let Some(coords) = parse_latlng(text) {
            log::debug!("Query {} resolved as direct coordinates", token.id());
            let direct = Candidate {
                name: coords.display(),
                coords,
                source: SourceKind::Geocoded,
                external_id: None,
                category: None,
                locality: None,
            };
            return self.finish(&token, Vec::new(), Ok(vec![direct]));
        }

        let local = nearby.match_loaded(text);
        log::debug!(
            "Query {} dispatched: {} resident match(es), geocoding \"{text}\"",
            token.id(),
            local.len()
        );

        let outcome = self
            .race_geocode(&token, geocoder.search(text, token.cancel_token()))
            .await;
        self.finish(&token, local, outcome)
    }

    /// Race the geocoder call against cancellation and the overall timeout.
    /// Deterministic priority: cancellation, then timeout, then data.
    async fn race_geocode<F>(
        &self,
        token: &SearchToken,
        search: F,
    ) -> Result<Vec<Candidate>, SearchError>
    where
        F: Future<Output = Result<Vec<Candidate>, SearchError>>,
    {
        tokio::select! {
            biased;

            _ = token.cancel_token().cancelled() => Err(SearchError::Cancelled),
            _ = tokio::time::sleep(self.timeout) => Err(SearchError::Timeout),
            result = search => result,
        }
    }

    /// Apply a finished query's outcome, discarding it when the token is no
    /// longer live. Cancellation is swallowed here and never surfaces.
    fn finish(
        &self,
        token: &SearchToken,
        local: Vec<Candidate>,
        outcome: Result<Vec<Candidate>, SearchError>,
    ) -> Option<PanelUpdate> {
        if !self.is_live(token) {
            log::debug!("Discarding result for superseded query {}", token.id());
            return None;
        }
        match outcome {
            Ok(geocoded) => Some(PanelUpdate::Sections(merge(local, geocoded))),
            Err(SearchError::Cancelled) => None,
            Err(e) => {
                log::warn!("Query {} failed: {e}", token.id());
                Some(PanelUpdate::Error(e))
            }
        }
    }

    /// True when this token is the most recently issued and uncancelled.
    pub fn is_live(&self, token: &SearchToken) -> bool {
        !token.cancel_token().is_cancelled()
            && self.live.as_ref().map(SearchToken::id) == Some(token.id())
    }

    /// Create a new live token, invalidating the previous generation.
    fn issue_token(&mut self) -> SearchToken {
        self.invalidate_live();
        self.next_id = self.next_id.wrapping_add(1);
        let token = SearchToken::new(self.next_id);
        self.live = Some(token.clone());
        token
    }

    fn invalidate_live(&mut self) {
        if let Some(prev) = self.live.take() {
            prev.cancel_token().cancel();
        }
    }
}

impl Default for QueryDispatcher {
    fn default() -> Self {
        Self::new(DEBOUNCE_DELAY, SEARCH_TIMEOUT)
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod dispatch_tests;
