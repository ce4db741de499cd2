//! Local preference store: whole-table get/set of engagement state.
//!
//! # Responsibility
//! - Name the four engagement tables with fixed storage keys.
//! - Encode/decode table payloads as versioned JSON.
//! - Isolate the backing storage (SQLite, memory) behind one trait.
//!
//! # Invariants
//! - A missing table reads as its `Default` value.
//! - Payloads written by a newer binary are rejected, never truncated.
//! - Writes replace the whole table; there is no partial update.

use crate::db::DbError;
use crate::model::engagement::UserEngagementState;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryPreferenceStore;
pub use sqlite::SqlitePreferenceStore;

/// Payload format version written by this binary.
pub const PAYLOAD_VERSION: u32 = 1;

pub type StoreResult<T> = Result<T, StoreError>;

/// Persisted engagement table names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrefTable {
    FavoriteCollections,
    SavedPosts,
    LastViewedPositions,
    UserReactions,
}

impl PrefTable {
    pub const ALL: [PrefTable; 4] = [
        PrefTable::FavoriteCollections,
        PrefTable::SavedPosts,
        PrefTable::LastViewedPositions,
        PrefTable::UserReactions,
    ];

    /// Fixed storage key; never rename without a migration.
    pub fn key(self) -> &'static str {
        match self {
            Self::FavoriteCollections => "favoriteCollections",
            Self::SavedPosts => "savedPosts",
            Self::LastViewedPositions => "lastViewedCollectionPositions",
            Self::UserReactions => "userReactions",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|table| table.key() == key)
    }
}

impl Display for PrefTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Raw stored form of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPayload {
    pub version: u32,
    pub json: String,
}

#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Encode(PrefTable, serde_json::Error),
    InvalidData(PrefTable, String),
    UnsupportedPayloadVersion {
        table: PrefTable,
        found: u32,
        supported: u32,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode(table, err) => write!(f, "failed to encode `{table}`: {err}"),
            Self::InvalidData(table, message) => {
                write!(f, "invalid persisted `{table}` data: {message}")
            }
            Self::UnsupportedPayloadVersion {
                table,
                found,
                supported,
            } => write!(
                f,
                "`{table}` payload version {found} is newer than supported {supported}"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(_, err) => Some(err),
            Self::InvalidData(..) | Self::UnsupportedPayloadVersion { .. } => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Whole-table key-value persistence.
///
/// Implementations assume a single writer per table; callers that share a
/// store across sessions must serialize their read-modify-write cycles.
pub trait PreferenceStore {
    fn load_raw(&self, table: PrefTable) -> StoreResult<Option<StoredPayload>>;
    fn save_raw(&self, table: PrefTable, payload: &StoredPayload) -> StoreResult<()>;
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for &S {
    fn load_raw(&self, table: PrefTable) -> StoreResult<Option<StoredPayload>> {
        (**self).load_raw(table)
    }

    fn save_raw(&self, table: PrefTable, payload: &StoredPayload) -> StoreResult<()> {
        (**self).save_raw(table, payload)
    }
}

/// Reads one table, returning `T::default()` when it was never written.
pub fn load_table<T, S>(store: &S, table: PrefTable) -> StoreResult<T>
where
    T: DeserializeOwned + Default,
    S: PreferenceStore + ?Sized,
{
    let Some(payload) = store.load_raw(table)? else {
        return Ok(T::default());
    };
    if payload.version > PAYLOAD_VERSION {
        return Err(StoreError::UnsupportedPayloadVersion {
            table,
            found: payload.version,
            supported: PAYLOAD_VERSION,
        });
    }
    serde_json::from_str(&payload.json)
        .map_err(|err| StoreError::InvalidData(table, err.to_string()))
}

/// Replaces one table with the encoded `value`.
pub fn save_table<T, S>(store: &S, table: PrefTable, value: &T) -> StoreResult<()>
where
    T: Serialize + ?Sized,
    S: PreferenceStore + ?Sized,
{
    let json = serde_json::to_string(value).map_err(|err| StoreError::Encode(table, err))?;
    store.save_raw(
        table,
        &StoredPayload {
            version: PAYLOAD_VERSION,
            json,
        },
    )
}

impl UserEngagementState {
    /// Reads all four tables from `store`.
    pub fn load<S: PreferenceStore + ?Sized>(store: &S) -> StoreResult<Self> {
        Ok(Self {
            favorite_collections: load_table(store, PrefTable::FavoriteCollections)?,
            saved_post_ids: load_table(store, PrefTable::SavedPosts)?,
            last_viewed_positions: load_table(store, PrefTable::LastViewedPositions)?,
            reactions: load_table(store, PrefTable::UserReactions)?,
        })
    }
}
