use thiserror::Error;

/// Failures that can terminate a location search.
///
/// `Cancelled` is a terminal state rather than a user-visible failure: it is
/// swallowed at the dispatcher boundary and never rendered.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The POI index upstream failed or returned a non-success response.
    #[error("Nearby feature lookup failed ({status}): {message}")]
    NearbyFetch { status: u16, message: String },

    /// The forward geocoder upstream failed or returned a non-success response.
    #[error("Geocoding failed ({status}): {message}")]
    Geocode { status: u16, message: String },

    /// The combined search exceeded the overall race timeout.
    #[error("Search timed out")]
    Timeout,

    /// The search token was superseded by a newer query.
    #[error("Search cancelled")]
    Cancelled,
}

impl SearchError {
    /// Transient status line for the suggestion panel. Timeouts read
    /// differently from upstream failures.
    pub fn status_message(&self) -> &'static str {
        match self {
            SearchError::Timeout => "Search timed out — please try again",
            SearchError::NearbyFetch { .. } | SearchError::Geocode { .. } => {
                "Search failed — check your connection"
            }
            SearchError::Cancelled => "",
        }
    }
}
