//! civiq library - location search and resolution engine
//!
//! Turns a stream of user input and map events into a deduplicated,
//! cancel-safe, cached, ranked suggestion list for the Bengaluru civic
//! issues map, plus the state machine that commits a selection.

pub mod app;
pub mod candidate;
pub mod config;
pub mod coords;
pub mod dispatch;
pub mod error;
pub mod geocode;
pub mod kv;
pub mod map;
pub mod merge;
pub mod nearby;
pub mod recency;
pub mod session;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types for convenience
pub use app::App;
pub use candidate::{Candidate, SourceKind};
pub use config::Config;
pub use coords::LatLng;
pub use error::SearchError;
pub use merge::SuggestionPanel;
pub use session::{KeyOutcome, SessionKey};
