//! Saved posts listing.
//!
//! Saved ids may outlive the posts they reference; those are reported as
//! missing instead of failing the whole listing.

use crate::model::post::Post;
use crate::remote::{RemoteError, RemoteResult, RemoteSource};
use crate::service::engagement_service::EngagementService;
use crate::store::PreferenceStore;
use log::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedPosts {
    pub posts: Vec<Post>,
    /// Saved ids the API no longer knows.
    pub missing: Vec<String>,
}

impl SavedPosts {
    /// Drops a post from the displayed list.
    pub fn remove(&mut self, post_id: &str) -> bool {
        let before = self.posts.len();
        self.posts.retain(|post| post.id != post_id);
        self.posts.len() != before
    }
}

/// Fetches every saved post.
///
/// # Errors
/// - Any failure other than not-found (or an unusable id) aborts the listing.
pub fn load_saved_posts<R, S>(
    remote: &R,
    engagement: &EngagementService<S>,
) -> RemoteResult<SavedPosts>
where
    R: RemoteSource + ?Sized,
    S: PreferenceStore,
{
    fetch_saved_posts(remote, &engagement.saved_post_ids())
}

/// Fetches a snapshot of saved ids with the same missing-id policy.
pub fn fetch_saved_posts<R: RemoteSource + ?Sized>(
    remote: &R,
    post_ids: &[String],
) -> RemoteResult<SavedPosts> {
    let mut saved = SavedPosts::default();
    for post_id in post_ids {
        match remote.fetch_post(post_id) {
            Ok(post) => saved.posts.push(post),
            Err(RemoteError::NotFound(_) | RemoteError::InvalidId(_)) => {
                warn!("event=saved_posts_load module=saved status=missing post_id={post_id}");
                saved.missing.push(post_id.clone());
            }
            Err(err) => return Err(err),
        }
    }

    info!(
        "event=saved_posts_load module=saved status=ok loaded={} missing={}",
        saved.posts.len(),
        saved.missing.len()
    );
    Ok(saved)
}
