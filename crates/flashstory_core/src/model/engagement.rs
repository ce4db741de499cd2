//! Locally persisted, user-specific overlay on remote content.
//!
//! # Invariants
//! - The four tables are independent; no table references another.
//! - Entries may point at collections/posts the API no longer returns.
//! - `reactions` holds at most one kind per post by construction.

use crate::model::reaction::ReactionKind;
use std::collections::{BTreeMap, BTreeSet};

/// collection id -> collection name.
pub type FavoriteCollections = BTreeMap<String, String>;
/// Saved post ids.
pub type SavedPostIds = BTreeSet<String>;
/// collection id -> 0-based index of the last visible post.
pub type LastViewedPositions = BTreeMap<String, usize>;
/// post id -> the reader's reaction.
pub type UserReactions = BTreeMap<String, ReactionKind>;

/// Snapshot of all engagement tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserEngagementState {
    pub favorite_collections: FavoriteCollections,
    pub saved_post_ids: SavedPostIds,
    pub last_viewed_positions: LastViewedPositions,
    pub reactions: UserReactions,
}
