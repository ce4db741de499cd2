//! Reaction kinds and server-authoritative reaction tallies.
//!
//! # Invariants
//! - The set of reaction kinds is closed; unknown kinds fail to decode.
//! - Tally counts are non-negative.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One of the fixed reactions a reader can attach to a post.
///
/// Serialized in camelCase (`mindBlowing`), which is also the wire value
/// accepted by `POST /posts/{id}/react`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReactionKind {
    Like,
    MindBlowing,
    AlreadyKnew,
    HardToBelieve,
    Interesting,
}

impl ReactionKind {
    /// All kinds in display order.
    pub const ALL: [ReactionKind; 5] = [
        ReactionKind::Like,
        ReactionKind::MindBlowing,
        ReactionKind::AlreadyKnew,
        ReactionKind::HardToBelieve,
        ReactionKind::Interesting,
    ];

    /// Stable wire/storage name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::MindBlowing => "mindBlowing",
            Self::AlreadyKnew => "alreadyKnew",
            Self::HardToBelieve => "hardToBelieve",
            Self::Interesting => "interesting",
        }
    }

    /// Button glyph shown next to the count.
    pub fn emoji(self) -> &'static str {
        match self {
            Self::Like => "👍",
            Self::MindBlowing => "🤯",
            Self::AlreadyKnew => "🤓",
            Self::HardToBelieve => "🤨",
            Self::Interesting => "🤔",
        }
    }
}

impl Display for ReactionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown reaction name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownReaction(pub String);

impl Display for UnknownReaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown reaction `{}`; expected like|mindBlowing|alreadyKnew|hardToBelieve|interesting",
            self.0
        )
    }
}

impl Error for UnknownReaction {}

impl FromStr for ReactionKind {
    type Err = UnknownReaction;

    /// Accepts the camelCase wire name and its snake_case spelling.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "like" => Ok(Self::Like),
            "mindBlowing" | "mind_blowing" => Ok(Self::MindBlowing),
            "alreadyKnew" | "already_knew" => Ok(Self::AlreadyKnew),
            "hardToBelieve" | "hard_to_believe" => Ok(Self::HardToBelieve),
            "interesting" => Ok(Self::Interesting),
            other => Err(UnknownReaction(other.to_string())),
        }
    }
}

/// Server-authoritative reaction counts for one post.
///
/// Kinds missing from a payload decode as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReactionTally {
    pub like: u32,
    #[serde(alias = "mind_blowing")]
    pub mind_blowing: u32,
    #[serde(alias = "already_knew")]
    pub already_knew: u32,
    #[serde(alias = "hard_to_believe")]
    pub hard_to_believe: u32,
    pub interesting: u32,
}

impl ReactionTally {
    /// Returns the count for one kind.
    pub fn get(&self, kind: ReactionKind) -> u32 {
        match kind {
            ReactionKind::Like => self.like,
            ReactionKind::MindBlowing => self.mind_blowing,
            ReactionKind::AlreadyKnew => self.already_knew,
            ReactionKind::HardToBelieve => self.hard_to_believe,
            ReactionKind::Interesting => self.interesting,
        }
    }

    /// Sum over all kinds.
    pub fn total(&self) -> u64 {
        ReactionKind::ALL
            .iter()
            .map(|kind| u64::from(self.get(*kind)))
            .sum()
    }
}

/// Signed change submitted to the reaction endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionDelta {
    Increment,
    Decrement,
}

impl ReactionDelta {
    pub fn amount(self) -> i32 {
        match self {
            Self::Increment => 1,
            Self::Decrement => -1,
        }
    }
}
