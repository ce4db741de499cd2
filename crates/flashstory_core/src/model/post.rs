//! Post record: one unit of paged text content.
//!
//! # Invariants
//! - A post belongs to exactly one collection; `collection_id` never changes.
//! - `collection_name` is the denormalized name at fetch time.
//! - `reaction_counts` is the last tally seen from the server.

use crate::model::reaction::ReactionTally;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(alias = "_id")]
    pub id: String,
    /// Text slides shown one page at a time.
    #[serde(default)]
    pub content: Vec<String>,
    #[serde(alias = "collection_id")]
    pub collection_id: String,
    #[serde(alias = "collection_name", default)]
    pub collection_name: String,
    /// Serialized as `reactions` to match the API payload.
    #[serde(rename = "reactions", alias = "reactionCounts", default)]
    pub reaction_counts: ReactionTally,
}

impl Post {
    /// Replaces reaction counts with a server-returned tally.
    ///
    /// Tallies are overwritten, never merged.
    pub fn apply_tally(&mut self, tally: ReactionTally) {
        self.reaction_counts = tally;
    }

    pub fn page_count(&self) -> usize {
        self.content.len()
    }
}

#[cfg(test)]
mod tests {
    use super::Post;
    use crate::model::reaction::{ReactionKind, ReactionTally};

    #[test]
    fn post_decodes_camel_case_payload() {
        let post: Post = serde_json::from_str(
            r#"{
                "_id": "p1",
                "content": ["a", "b"],
                "collectionId": "c1",
                "collectionName": "Space Oddities",
                "reactions": {"like": 4, "interesting": 1}
            }"#,
        )
        .unwrap();
        assert_eq!(post.id, "p1");
        assert_eq!(post.page_count(), 2);
        assert_eq!(post.collection_id, "c1");
        assert_eq!(post.reaction_counts.get(ReactionKind::Like), 4);
    }

    #[test]
    fn post_decodes_snake_case_payload() {
        let post: Post = serde_json::from_str(
            r#"{"id": "p2", "content": [], "collection_id": "c9", "collection_name": "Tech"}"#,
        )
        .unwrap();
        assert_eq!(post.collection_id, "c9");
        assert_eq!(post.collection_name, "Tech");
        assert_eq!(post.reaction_counts, ReactionTally::default());
    }

    #[test]
    fn apply_tally_overwrites_counts() {
        let mut post: Post =
            serde_json::from_str(r#"{"id": "p", "collectionId": "c", "reactions": {"like": 9}}"#)
                .unwrap();
        post.apply_tally(ReactionTally {
            interesting: 2,
            ..ReactionTally::default()
        });
        assert_eq!(post.reaction_counts.like, 0);
        assert_eq!(post.reaction_counts.interesting, 2);
    }
}
