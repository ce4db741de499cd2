//! Content API contract.
//!
//! # Responsibility
//! - Describe the remote operations core logic depends on.
//! - Classify failures as transport, status, not-found or decode errors.
//!
//! # Invariants
//! - The remote service is the only source of collections, topics and posts.
//! - Reaction tallies returned by `react` are authoritative.

use crate::model::collection::{Collection, Topic};
use crate::model::post::Post;
use crate::model::reaction::{ReactionDelta, ReactionKind, ReactionTally};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod http;

pub use http::HttpRemoteSource;

static REMOTE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,128}$").expect("valid remote id regex"));

pub type RemoteResult<T> = Result<T, RemoteError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Id cannot be placed in a request path.
    InvalidId(String),
    /// Connection, DNS, TLS or timeout failure.
    Transport(String),
    /// Requested resource does not exist.
    NotFound(String),
    /// Non-success status on an endpoint without not-found semantics.
    Status { code: u16, url: String },
    /// Response body did not match the expected shape.
    Decode(String),
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(id) => write!(f, "invalid remote id: `{id}`"),
            Self::Transport(message) => write!(f, "network error: {message}"),
            Self::NotFound(resource) => write!(f, "not found: {resource}"),
            Self::Status { code, url } => write!(f, "unexpected status {code} from {url}"),
            Self::Decode(message) => write!(f, "malformed response: {message}"),
        }
    }
}

impl Error for RemoteError {}

impl RemoteError {
    /// Stable code used in log events and bridge envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidId(_) => "invalid_id",
            Self::Transport(_) => "transport",
            Self::NotFound(_) => "not_found",
            Self::Status { .. } => "status",
            Self::Decode(_) => "decode",
        }
    }
}

/// Checks that `id` is safe to embed in a URL path segment.
pub fn validate_remote_id(id: &str) -> RemoteResult<&str> {
    if REMOTE_ID_RE.is_match(id) {
        Ok(id)
    } else {
        Err(RemoteError::InvalidId(id.to_string()))
    }
}

/// Remote collection/post source.
pub trait RemoteSource {
    /// `GET /collections`
    fn fetch_collections(&self) -> RemoteResult<Vec<Collection>>;
    /// `GET /collections/topics`
    fn fetch_topics(&self) -> RemoteResult<Vec<Topic>>;
    /// `GET /posts/collection/{collection_id}`
    fn fetch_posts_by_collection(&self, collection_id: &str) -> RemoteResult<Vec<Post>>;
    /// `GET /posts/{post_id}`; any non-success status is `NotFound`.
    fn fetch_post(&self, post_id: &str) -> RemoteResult<Post>;
    /// `GET /posts/random?count=N`
    fn fetch_random_posts(&self, count: usize) -> RemoteResult<Vec<Post>>;
    /// `POST /posts/{post_id}/react`, returning the updated tally.
    fn react(
        &self,
        post_id: &str,
        kind: ReactionKind,
        delta: ReactionDelta,
    ) -> RemoteResult<ReactionTally>;
}

impl<R: RemoteSource + ?Sized> RemoteSource for &R {
    fn fetch_collections(&self) -> RemoteResult<Vec<Collection>> {
        (**self).fetch_collections()
    }

    fn fetch_topics(&self) -> RemoteResult<Vec<Topic>> {
        (**self).fetch_topics()
    }

    fn fetch_posts_by_collection(&self, collection_id: &str) -> RemoteResult<Vec<Post>> {
        (**self).fetch_posts_by_collection(collection_id)
    }

    fn fetch_post(&self, post_id: &str) -> RemoteResult<Post> {
        (**self).fetch_post(post_id)
    }

    fn fetch_random_posts(&self, count: usize) -> RemoteResult<Vec<Post>> {
        (**self).fetch_random_posts(count)
    }

    fn react(
        &self,
        post_id: &str,
        kind: ReactionKind,
        delta: ReactionDelta,
    ) -> RemoteResult<ReactionTally> {
        (**self).react(post_id, kind, delta)
    }
}
