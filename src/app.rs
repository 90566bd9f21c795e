//! Application facade: wires the dispatcher, session, stores, and the
//! injected map surface together and routes input, key, and map events.

use reqwest::Client;

use crate::candidate::Candidate;
use crate::config::Config;
use crate::coords::LatLng;
use crate::dispatch::{PanelUpdate, QueryDispatcher};
use crate::geocode::GeocodeClient;
use crate::kv::KeyValueStore;
use crate::map::{MapSurface, DEFAULT_CENTER, DEFAULT_ZOOM};
use crate::nearby::NearbyIndex;
use crate::recency::{RecencyEntry, RecencyStore};
use crate::session::{KeyOutcome, SessionKey, SuggestionSession};

/// Location-resolution engine with all collaborators wired in.
///
/// Single logical thread of control: callers drive it from one task, and
/// the only suspension points are the outbound network calls.
pub struct App {
    pub dispatcher: QueryDispatcher,
    pub session: SuggestionSession,
    pub nearby: NearbyIndex,
    pub geocoder: GeocodeClient,
    pub recency: RecencyStore,
    map: Box<dyn MapSurface>,

    /// Current text of the location input.
    input: String,
    /// Transient, dismissible status line for search failures.
    status: Option<&'static str>,
    /// Map position the nearby panel is centered on.
    position: LatLng,
    /// Features around `position`, for the "what's near here" panel.
    nearby_features: Vec<Candidate>,

    radius_m: u32,
    nearby_limit: usize,
}

impl App {
    pub fn new(config: &Config, map: Box<dyn MapSurface>, store: Box<dyn KeyValueStore>) -> Self {
        let client = Client::new();
        Self {
            dispatcher: QueryDispatcher::new(config.debounce(), config.search_timeout()),
            session: SuggestionSession::new(),
            nearby: NearbyIndex::new(client.clone(), config.nearby.endpoint.clone()),
            geocoder: GeocodeClient::new(client, config.geocoder.endpoint.clone()),
            recency: RecencyStore::new(store),
            map,
            input: String::new(),
            status: None,
            position: DEFAULT_CENTER,
            nearby_features: Vec::new(),
            radius_m: config.nearby.radius_m,
            nearby_limit: config.nearby.limit,
        }
    }

    /// Center the map on the default view. Called once at startup.
    pub fn init_map(&mut self) {
        self.map.set_view(DEFAULT_CENTER, DEFAULT_ZOOM);
        self.map.set_marker(DEFAULT_CENTER);
    }

    /// The location input gained focus. With no usable text yet, surface
    /// the previously chosen locations so they are one keystroke away.
    pub fn on_focus(&mut self) {
        if self.input.chars().count() >= crate::dispatch::MIN_QUERY_LEN {
            return;
        }
        let recent: Vec<Candidate> = self
            .recency
            .list()
            .iter()
            .map(|entry| entry.to_candidate())
            .collect();
        if !recent.is_empty() {
            self.session
                .show(crate::merge::SuggestionPanel::from_recent(recent));
        }
    }

    /// Handle a change of the location input text.
    pub fn on_input(&mut self, text: &str) {
        self.input = text.to_string();
        let update = self.dispatcher.on_input(text);
        self.apply(update);
    }

    /// Poll the debounce window; dispatch the pending query once it
    /// elapses. Drivers call this from their event loop.
    pub async fn tick(&mut self) {
        if !self.dispatcher.poll_ready() {
            return;
        }
        let update = self
            .dispatcher
            .run_pending(&self.geocoder, &self.nearby)
            .await;
        self.apply(update);
    }

    /// Immediate, non-debounced search for the current input.
    pub async fn search_now(&mut self) {
        let text = self.input.clone();
        let update = self
            .dispatcher
            .run_now(&text, &self.geocoder, &self.nearby)
            .await;
        self.apply(update);
    }

    /// Route a key press through the suggestion session.
    pub async fn on_key(&mut self, key: SessionKey) {
        let outcome = self
            .session
            .handle_key(key, self.map.as_mut(), &mut self.recency);
        match outcome {
            KeyOutcome::None => {}
            KeyOutcome::Reissue => self.search_now().await,
            KeyOutcome::Committed(candidate) => {
                self.input = candidate.name.clone();
                self.refresh_nearby(candidate.coords).await;
            }
        }
    }

    /// Pointer interaction outside the panel.
    pub fn on_outside_click(&mut self) {
        self.map.remove_highlight();
        self.session.dismiss();
    }

    /// A click directly on the map: move the marker there and mirror the
    /// coordinate into the location input.
    pub async fn on_map_click(&mut self, coords: LatLng) {
        self.map.set_marker(coords);
        self.input = coords.display();
        self.session.dismiss();
        self.refresh_nearby(coords).await;
    }

    /// The map view moved (pan/drag): refresh the resident nearby set so
    /// typed text can match against the new surroundings.
    pub async fn on_map_moved(&mut self, coords: LatLng) {
        self.refresh_nearby(coords).await;
    }

    async fn refresh_nearby(&mut self, coords: LatLng) {
        self.position = coords;
        match self
            .nearby
            .fetch(coords, self.radius_m, self.nearby_limit)
            .await
        {
            Ok(features) => {
                log::debug!("{} nearby feature(s) around {}", features.len(), coords.display());
                self.nearby_features = features;
            }
            Err(e) => {
                log::warn!("Nearby refresh failed: {e}");
                self.status = Some(e.status_message());
            }
        }
    }

    fn apply(&mut self, update: Option<PanelUpdate>) {
        match update {
            None => {}
            Some(PanelUpdate::Clear) => {
                self.session.dismiss();
                self.status = None;
            }
            Some(PanelUpdate::Sections(panel)) => {
                self.session.show(panel);
                self.status = None;
            }
            Some(PanelUpdate::Error(e)) => {
                self.session.dismiss();
                self.status = Some(e.status_message());
            }
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Transient status line, if a search recently failed.
    pub fn status(&self) -> Option<&'static str> {
        self.status
    }

    pub fn dismiss_status(&mut self) {
        self.status = None;
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    /// Features around the current map position.
    pub fn nearby_features(&self) -> &[Candidate] {
        &self.nearby_features
    }

    pub fn recent(&self) -> Vec<RecencyEntry> {
        self.recency.list()
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod app_tests;
