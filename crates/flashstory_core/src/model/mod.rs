//! Remote content model and local engagement overlay.
//!
//! # Responsibility
//! - Define the shapes returned by the content API (collections, topics,
//!   posts, reaction tallies).
//! - Define the locally persisted engagement state layered on top of them.
//!
//! # Invariants
//! - Remote entities are identified by server-issued string ids.
//! - Only `Post::reaction_counts` is ever mutated locally, and only by
//!   overwriting it with a server-returned tally.

pub mod collection;
pub mod engagement;
pub mod post;
pub mod reaction;
