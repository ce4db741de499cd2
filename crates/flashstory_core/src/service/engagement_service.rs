//! Engagement reconciler: saved posts, favorite collections and reactions.
//!
//! # Responsibility
//! - Answer "is this saved / favorited / which reaction is mine" from the
//!   persisted overlay.
//! - Apply user actions to the overlay and keep remote reaction counters in
//!   step with the reader's single reaction per post.
//!
//! # Invariants
//! - Every mutation persists the whole affected table before returning; a
//!   failed write rolls the in-memory table back.
//! - At most one reaction per post, and at most one in-flight reaction
//!   change per post.
//! - Displayed counts always come from the last server tally.
//! - Switching reactions is two remote calls (retract, then add) and is not
//!   atomic; a failed retraction is logged and the add still proceeds.

use crate::model::engagement::{FavoriteCollections, SavedPostIds, UserReactions};
use crate::model::post::Post;
use crate::model::reaction::{ReactionDelta, ReactionKind, ReactionTally};
use crate::remote::{RemoteError, RemoteResult, RemoteSource};
use crate::store::{load_table, save_table, PrefTable, PreferenceStore, StoreError};
use log::{info, warn};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum EngagementError {
    Store(StoreError),
    Remote(RemoteError),
    /// A reaction change for this post has not completed yet.
    ReactionInFlight(String),
}

impl Display for EngagementError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Remote(err) => write!(f, "{err}"),
            Self::ReactionInFlight(post_id) => {
                write!(f, "reaction change already in flight for post {post_id}")
            }
        }
    }
}

impl Error for EngagementError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Remote(err) => Some(err),
            Self::ReactionInFlight(_) => None,
        }
    }
}

impl From<StoreError> for EngagementError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<RemoteError> for EngagementError {
    fn from(value: RemoteError) -> Self {
        Self::Remote(value)
    }
}

pub type EngagementResult<T> = Result<T, EngagementError>;

/// Reaction state of one post as seen by the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionPhase {
    /// Matches what the server last acknowledged.
    Confirmed(Option<ReactionKind>),
    /// A change was requested and the server has not answered yet.
    Pending {
        previous: Option<ReactionKind>,
        target: Option<ReactionKind>,
    },
}

/// One remote call in a reaction change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactionStep {
    pub kind: ReactionKind,
    pub delta: ReactionDelta,
    /// Failure of a required step aborts the change.
    pub required: bool,
}

/// Calls needed to move a post from `previous` to `target`, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionPlan {
    pub post_id: String,
    pub previous: Option<ReactionKind>,
    pub target: Option<ReactionKind>,
    pub steps: Vec<ReactionStep>,
}

impl ReactionPlan {
    /// Plans the transition for a tap on `tapped` given the current reaction.
    ///
    /// - same kind again: retract it (un-react)
    /// - different kind: retract the old one best-effort, then add the new one
    /// - no reaction yet: add
    pub fn for_tap(
        post_id: impl Into<String>,
        current: Option<ReactionKind>,
        tapped: ReactionKind,
    ) -> Self {
        let (target, steps) = match current {
            Some(existing) if existing == tapped => (
                None,
                vec![ReactionStep {
                    kind: tapped,
                    delta: ReactionDelta::Decrement,
                    required: true,
                }],
            ),
            Some(existing) => (
                Some(tapped),
                vec![
                    ReactionStep {
                        kind: existing,
                        delta: ReactionDelta::Decrement,
                        required: false,
                    },
                    ReactionStep {
                        kind: tapped,
                        delta: ReactionDelta::Increment,
                        required: true,
                    },
                ],
            ),
            None => (
                Some(tapped),
                vec![ReactionStep {
                    kind: tapped,
                    delta: ReactionDelta::Increment,
                    required: true,
                }],
            ),
        };

        Self {
            post_id: post_id.into(),
            previous: current,
            target,
            steps,
        }
    }
}

/// Server response to an executed plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactionReceipt {
    /// Tally returned by the last required call.
    pub tally: ReactionTally,
    /// The best-effort retraction failed; the remote count may have drifted.
    pub retraction_failed: bool,
}

/// Committed result of a reaction change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionOutcome {
    pub post_id: String,
    pub reaction: Option<ReactionKind>,
    pub tally: ReactionTally,
    pub retraction_failed: bool,
}

/// Engagement flags for one post, ready for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostEngagement {
    pub is_saved: bool,
    pub is_collection_favorite: bool,
    pub my_reaction: Option<ReactionKind>,
    pub reaction_pending: bool,
}

/// Runs the remote calls of `plan` in order.
///
/// Takes no engagement state so callers can release locks while waiting on
/// the network.
pub fn execute_reaction_plan<R: RemoteSource + ?Sized>(
    remote: &R,
    plan: &ReactionPlan,
) -> RemoteResult<ReactionReceipt> {
    let mut tally = None;
    let mut retraction_failed = false;

    for step in &plan.steps {
        match remote.react(&plan.post_id, step.kind, step.delta) {
            Ok(updated) => {
                if step.required {
                    tally = Some(updated);
                }
            }
            Err(err) if !step.required => {
                retraction_failed = true;
                warn!(
                    "event=reaction_retract module=engagement status=error post_id={} reaction={} error_code={} drift=possible",
                    plan.post_id,
                    step.kind,
                    err.code()
                );
            }
            Err(err) => return Err(err),
        }
    }

    // Every plan ends with a required step.
    let tally =
        tally.ok_or_else(|| RemoteError::Decode("reaction plan had no steps".to_string()))?;
    Ok(ReactionReceipt {
        tally,
        retraction_failed,
    })
}

/// Reconciles persisted engagement tables with user actions.
pub struct EngagementService<S: PreferenceStore> {
    store: S,
    favorites: FavoriteCollections,
    saved: SavedPostIds,
    reactions: UserReactions,
    pending: HashMap<String, ReactionPlan>,
}

impl<S: PreferenceStore> EngagementService<S> {
    /// Loads the favorites, saved and reaction tables from `store`.
    pub fn new(store: S) -> EngagementResult<Self> {
        let favorites = load_table(&store, PrefTable::FavoriteCollections)?;
        let saved = load_table(&store, PrefTable::SavedPosts)?;
        let reactions = load_table(&store, PrefTable::UserReactions)?;
        Ok(Self {
            store,
            favorites,
            saved,
            reactions,
            pending: HashMap::new(),
        })
    }

    pub fn is_saved(&self, post_id: &str) -> bool {
        self.saved.contains(post_id)
    }

    pub fn is_favorite(&self, collection_id: &str) -> bool {
        self.favorites.contains_key(collection_id)
    }

    /// Last confirmed reaction for `post_id`.
    pub fn my_reaction(&self, post_id: &str) -> Option<ReactionKind> {
        self.reactions.get(post_id).copied()
    }

    pub fn reaction_phase(&self, post_id: &str) -> ReactionPhase {
        match self.pending.get(post_id) {
            Some(plan) => ReactionPhase::Pending {
                previous: plan.previous,
                target: plan.target,
            },
            None => ReactionPhase::Confirmed(self.my_reaction(post_id)),
        }
    }

    /// Reaction to highlight: the requested one while pending, else confirmed.
    pub fn displayed_reaction(&self, post_id: &str) -> Option<ReactionKind> {
        match self.reaction_phase(post_id) {
            ReactionPhase::Pending { target, .. } => target,
            ReactionPhase::Confirmed(current) => current,
        }
    }

    pub fn engagement_for(&self, post: &Post) -> PostEngagement {
        PostEngagement {
            is_saved: self.is_saved(&post.id),
            is_collection_favorite: self.is_favorite(&post.collection_id),
            my_reaction: self.displayed_reaction(&post.id),
            reaction_pending: self.pending.contains_key(&post.id),
        }
    }

    /// Saved post ids in stable order.
    pub fn saved_post_ids(&self) -> Vec<String> {
        self.saved.iter().cloned().collect()
    }

    /// Favorite collections as `(id, name)` pairs in stable order.
    pub fn favorite_collections(&self) -> Vec<(String, String)> {
        self.favorites
            .iter()
            .map(|(id, name)| (id.clone(), name.clone()))
            .collect()
    }

    /// Flips the saved flag of `post_id` and returns the new flag.
    pub fn toggle_saved(&mut self, post_id: &str) -> EngagementResult<bool> {
        let now_saved = !self.saved.remove(post_id);
        if now_saved {
            self.saved.insert(post_id.to_string());
        }

        if let Err(err) = save_table(&self.store, PrefTable::SavedPosts, &self.saved) {
            if now_saved {
                self.saved.remove(post_id);
            } else {
                self.saved.insert(post_id.to_string());
            }
            return Err(err.into());
        }

        info!("event=toggle_saved module=engagement status=ok post_id={post_id} saved={now_saved}");
        Ok(now_saved)
    }

    /// Removes every id in `post_ids` from the saved set.
    ///
    /// Returns how many were actually saved before.
    pub fn unsave_posts(&mut self, post_ids: &[String]) -> EngagementResult<usize> {
        let snapshot = self.saved.clone();
        let removed = post_ids.iter().filter(|id| self.saved.remove(*id)).count();
        if removed == 0 {
            return Ok(0);
        }

        if let Err(err) = save_table(&self.store, PrefTable::SavedPosts, &self.saved) {
            self.saved = snapshot;
            return Err(err.into());
        }
        Ok(removed)
    }

    /// Flips the favorite flag of a collection and returns the new flag.
    pub fn toggle_favorite(
        &mut self,
        collection_id: &str,
        collection_name: &str,
    ) -> EngagementResult<bool> {
        let previous = self.favorites.remove(collection_id);
        let now_favorite = previous.is_none();
        if now_favorite {
            self.favorites
                .insert(collection_id.to_string(), collection_name.to_string());
        }

        if let Err(err) = save_table(&self.store, PrefTable::FavoriteCollections, &self.favorites)
        {
            match previous {
                Some(name) => {
                    self.favorites.insert(collection_id.to_string(), name);
                }
                None => {
                    self.favorites.remove(collection_id);
                }
            }
            return Err(err.into());
        }

        info!(
            "event=toggle_favorite module=engagement status=ok collection_id={collection_id} favorite={now_favorite}"
        );
        Ok(now_favorite)
    }

    /// Favorites or unfavorites the collection `post` belongs to.
    pub fn toggle_favorite_for(&mut self, post: &Post) -> EngagementResult<bool> {
        self.toggle_favorite(&post.collection_id, &post.collection_name)
    }

    /// Removes every id in `collection_ids` from favorites.
    pub fn remove_favorites(&mut self, collection_ids: &[String]) -> EngagementResult<usize> {
        let snapshot = self.favorites.clone();
        let removed = collection_ids
            .iter()
            .filter(|id| self.favorites.remove(id.as_str()).is_some())
            .count();
        if removed == 0 {
            return Ok(0);
        }

        if let Err(err) = save_table(&self.store, PrefTable::FavoriteCollections, &self.favorites)
        {
            self.favorites = snapshot;
            return Err(err.into());
        }
        Ok(removed)
    }

    /// Plans a reaction change and marks the post pending.
    ///
    /// # Errors
    /// - `ReactionInFlight` when a change for this post has not completed.
    pub fn begin_reaction(
        &mut self,
        post_id: &str,
        tapped: ReactionKind,
    ) -> EngagementResult<ReactionPlan> {
        if self.pending.contains_key(post_id) {
            return Err(EngagementError::ReactionInFlight(post_id.to_string()));
        }

        let plan = ReactionPlan::for_tap(post_id, self.my_reaction(post_id), tapped);
        self.pending.insert(post_id.to_string(), plan.clone());
        Ok(plan)
    }

    /// Commits or abandons a planned change once the server has answered.
    ///
    /// On success the reaction table is updated and persisted. On failure
    /// the confirmed reaction is left as it was and the error is returned.
    pub fn complete_reaction(
        &mut self,
        plan: &ReactionPlan,
        result: RemoteResult<ReactionReceipt>,
    ) -> EngagementResult<ReactionOutcome> {
        self.pending.remove(&plan.post_id);

        let receipt = match result {
            Ok(receipt) => receipt,
            Err(err) => {
                warn!(
                    "event=set_reaction module=engagement status=error post_id={} error_code={}",
                    plan.post_id,
                    err.code()
                );
                return Err(err.into());
            }
        };

        let previous = match plan.target {
            Some(kind) => self.reactions.insert(plan.post_id.clone(), kind),
            None => self.reactions.remove(&plan.post_id),
        };
        if let Err(err) = save_table(&self.store, PrefTable::UserReactions, &self.reactions) {
            match previous {
                Some(kind) => {
                    self.reactions.insert(plan.post_id.clone(), kind);
                }
                None => {
                    self.reactions.remove(&plan.post_id);
                }
            }
            return Err(err.into());
        }

        info!(
            "event=set_reaction module=engagement status=ok post_id={} reaction={} retraction_failed={}",
            plan.post_id,
            plan.target.map_or("none", ReactionKind::as_str),
            receipt.retraction_failed
        );
        Ok(ReactionOutcome {
            post_id: plan.post_id.clone(),
            reaction: plan.target,
            tally: receipt.tally,
            retraction_failed: receipt.retraction_failed,
        })
    }

    /// Applies a reaction tap end to end.
    ///
    /// The caller overwrites the post's counts with `ReactionOutcome::tally`.
    pub fn set_reaction<R: RemoteSource + ?Sized>(
        &mut self,
        remote: &R,
        post_id: &str,
        tapped: ReactionKind,
    ) -> EngagementResult<ReactionOutcome> {
        let plan = self.begin_reaction(post_id, tapped)?;
        let result = execute_reaction_plan(remote, &plan);
        self.complete_reaction(&plan, result)
    }
}
