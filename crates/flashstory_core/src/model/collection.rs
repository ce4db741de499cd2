//! Collection and topic records as returned by the content API.
//!
//! # Invariants
//! - Both are immutable once fetched; identity is the server id.
//! - `post_ids` keeps server order, which is also reading order.

use serde::{Deserialize, Serialize};

/// Named, ordered group of posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    /// Serialized as `avatar` to match the API payload.
    #[serde(rename = "avatar", alias = "avatar_url", alias = "avatarUrl", default)]
    pub avatar_url: String,
    /// Serialized as `posts`; ids only, content is fetched separately.
    #[serde(rename = "posts", default)]
    pub post_ids: Vec<String>,
}

impl Collection {
    /// Number of posts in reading order.
    pub fn post_count(&self) -> usize {
        self.post_ids.len()
    }
}

/// Display grouping of collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    /// Serialized as `collections`; may reference ids the API no longer returns.
    #[serde(rename = "collections", default)]
    pub collection_ids: Vec<String>,
}
