//! Core logic for the Flash Story reader.
//!
//! Content (collections, topics, posts, reaction tallies) comes from the
//! remote API; engagement (saved, favorites, reactions, reading position)
//! is owned locally. This crate reconciles the two for the mobile shell.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod remote;
pub mod service;
pub mod store;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::collection::{Collection, Topic};
pub use model::engagement::UserEngagementState;
pub use model::post::Post;
pub use model::reaction::{ReactionDelta, ReactionKind, ReactionTally, UnknownReaction};
pub use remote::{HttpRemoteSource, RemoteError, RemoteResult, RemoteSource};
pub use service::catalog::{Catalog, LoadOutcome, TopicSection, HOT_TOPIC_LIMIT};
pub use service::collection_reader::CollectionReader;
pub use service::engagement_service::{
    execute_reaction_plan, EngagementError, EngagementResult, EngagementService, PostEngagement,
    ReactionOutcome, ReactionPhase, ReactionPlan, ReactionReceipt, ReactionStep,
};
pub use service::feed_sequencer::{FeedSequencer, FetchCompletion, FetchTicket};
pub use service::position_tracker::{LibraryEntry, LibraryShelf, PositionTracker, Progress};
pub use service::saved_posts::{fetch_saved_posts, load_saved_posts, SavedPosts};
pub use store::{
    MemoryPreferenceStore, PrefTable, PreferenceStore, SqlitePreferenceStore, StoreError,
    StoreResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
