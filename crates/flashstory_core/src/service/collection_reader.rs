//! Pager over the posts of one collection.
//!
//! # Invariants
//! - `current_index` stays within `[0, len - 1]` whenever posts are loaded.
//! - A failed load keeps the previously loaded posts.
//! - Each page change is recorded through the position tracker.

use crate::model::post::Post;
use crate::model::reaction::ReactionTally;
use crate::remote::{RemoteResult, RemoteSource};
use crate::service::position_tracker::PositionTracker;
use crate::store::{PreferenceStore, StoreResult};

pub struct CollectionReader {
    collection_id: String,
    posts: Vec<Post>,
    current_index: usize,
    has_loaded: bool,
}

impl CollectionReader {
    pub fn new(collection_id: impl Into<String>) -> Self {
        Self {
            collection_id: collection_id.into(),
            posts: Vec::new(),
            current_index: 0,
            has_loaded: false,
        }
    }

    pub fn collection_id(&self) -> &str {
        &self.collection_id
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn has_loaded(&self) -> bool {
        self.has_loaded
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_post(&self) -> Option<&Post> {
        self.posts.get(self.current_index)
    }

    /// Header label; taken from the first post since posts carry the name.
    pub fn collection_name(&self) -> &str {
        self.posts
            .first()
            .map_or("", |post| post.collection_name.as_str())
    }

    /// Fetches posts and resumes at the last recorded position.
    ///
    /// Returns the number of posts loaded.
    pub fn load<R, S>(&mut self, remote: &R, tracker: &PositionTracker<S>) -> RemoteResult<usize>
    where
        R: RemoteSource + ?Sized,
        S: PreferenceStore,
    {
        let posts = remote.fetch_posts_by_collection(&self.collection_id)?;
        Ok(self.install(posts, tracker.last_position(&self.collection_id)))
    }

    /// Replaces the posts with an already fetched batch and resumes at
    /// `last_position` (clamped).
    pub fn install(&mut self, posts: Vec<Post>, last_position: Option<usize>) -> usize {
        self.posts = posts;
        self.has_loaded = true;
        self.current_index = self.clamp(last_position.unwrap_or(0));
        self.posts.len()
    }

    /// Moves to `index` (capped to the loaded range) and records it.
    ///
    /// Does nothing while no posts are loaded.
    pub fn page_to<S: PreferenceStore>(
        &mut self,
        index: usize,
        tracker: &mut PositionTracker<S>,
    ) -> StoreResult<usize> {
        if self.posts.is_empty() {
            return Ok(0);
        }
        self.current_index = self.clamp(index);
        tracker.record_position(&self.collection_id, self.current_index)?;
        Ok(self.current_index)
    }

    pub fn next_page<S: PreferenceStore>(
        &mut self,
        tracker: &mut PositionTracker<S>,
    ) -> StoreResult<usize> {
        self.page_to(self.current_index.saturating_add(1), tracker)
    }

    pub fn previous_page<S: PreferenceStore>(
        &mut self,
        tracker: &mut PositionTracker<S>,
    ) -> StoreResult<usize> {
        self.page_to(self.current_index.saturating_sub(1), tracker)
    }

    /// Overwrites counts of a loaded post with a server tally.
    pub fn apply_tally(&mut self, post_id: &str, tally: ReactionTally) -> bool {
        match self.posts.iter_mut().find(|post| post.id == post_id) {
            Some(post) => {
                post.apply_tally(tally);
                true
            }
            None => false,
        }
    }

    fn clamp(&self, index: usize) -> usize {
        index.min(self.posts.len().saturating_sub(1))
    }
}
