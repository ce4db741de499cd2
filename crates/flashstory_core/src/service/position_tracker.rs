//! Reading position tracker and library shelf.
//!
//! # Responsibility
//! - Persist the last visible post index per collection.
//! - Derive 1-based progress and in-progress/finished classification.
//! - Build the library: collections the reader has started.
//!
//! # Invariants
//! - Each recorded position is an independent durable write (last write
//!   wins per collection).
//! - Progress clamps stored positions into `[0, total - 1]`.
//! - A collection without a recorded position is not in the library.

use crate::model::collection::Collection;
use crate::model::engagement::LastViewedPositions;
use crate::store::{load_table, save_table, PrefTable, PreferenceStore, StoreResult};
use log::debug;

/// 1-based reading progress through a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

impl Progress {
    /// Progress for a stored 0-based `position` in a collection of `total` posts.
    pub fn from_position(position: Option<usize>, total: usize) -> Self {
        if total == 0 {
            return Self {
                current: 0,
                total: 0,
            };
        }
        let index = position.unwrap_or(0).min(total - 1);
        Self {
            current: index + 1,
            total,
        }
    }

    /// Reader is on the last post. Empty collections are never finished.
    pub fn is_finished(&self) -> bool {
        self.total > 0 && self.current == self.total
    }

    pub fn is_in_progress(&self) -> bool {
        self.current < self.total
    }
}

/// Library row: a started collection with its progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    pub collection: Collection,
    pub progress: Progress,
}

/// Started collections in fetch order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryShelf {
    entries: Vec<LibraryEntry>,
}

impl LibraryShelf {
    pub fn entries(&self) -> &[LibraryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn in_progress(&self) -> Vec<&LibraryEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.progress.is_in_progress())
            .collect()
    }

    pub fn finished(&self) -> Vec<&LibraryEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.progress.is_finished())
            .collect()
    }

    /// Drops a collection from the displayed shelf without refetching.
    pub fn remove(&mut self, collection_id: &str) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|entry| entry.collection.id != collection_id);
        self.entries.len() != before
    }
}

/// Owns the persisted last-viewed-position table.
pub struct PositionTracker<S: PreferenceStore> {
    store: S,
    positions: LastViewedPositions,
}

impl<S: PreferenceStore> PositionTracker<S> {
    pub fn new(store: S) -> StoreResult<Self> {
        let positions = load_table(&store, PrefTable::LastViewedPositions)?;
        Ok(Self { store, positions })
    }

    /// Re-reads the table, picking up writes made through other handles.
    pub fn reload(&mut self) -> StoreResult<()> {
        self.positions = load_table(&self.store, PrefTable::LastViewedPositions)?;
        Ok(())
    }

    pub fn last_position(&self, collection_id: &str) -> Option<usize> {
        self.positions.get(collection_id).copied()
    }

    /// Persists `index` as the visible post of `collection_id`.
    pub fn record_position(&mut self, collection_id: &str, index: usize) -> StoreResult<()> {
        let previous = self.positions.insert(collection_id.to_string(), index);
        if let Err(err) = self.persist() {
            self.restore(collection_id, previous);
            return Err(err);
        }
        debug!("event=record_position module=library status=ok collection_id={collection_id} index={index}");
        Ok(())
    }

    pub fn progress(&self, collection_id: &str, total_posts: usize) -> Progress {
        Progress::from_position(self.last_position(collection_id), total_posts)
    }

    pub fn is_finished(&self, collection_id: &str, total_posts: usize) -> bool {
        self.progress(collection_id, total_posts).is_finished()
    }

    pub fn is_in_progress(&self, collection_id: &str, total_posts: usize) -> bool {
        self.progress(collection_id, total_posts).is_in_progress()
    }

    /// Moves the reader back to the first post.
    pub fn restart(&mut self, collection_id: &str) -> StoreResult<()> {
        self.record_position(collection_id, 0)
    }

    /// Forgets the position, dropping the collection from the library.
    ///
    /// Returns whether a position was recorded.
    pub fn remove_from_library(&mut self, collection_id: &str) -> StoreResult<bool> {
        let Some(previous) = self.positions.remove(collection_id) else {
            return Ok(false);
        };
        if let Err(err) = self.persist() {
            self.positions.insert(collection_id.to_string(), previous);
            return Err(err);
        }
        Ok(true)
    }

    /// Library view over freshly fetched `collections`.
    pub fn library(&self, collections: &[Collection]) -> LibraryShelf {
        let entries = collections
            .iter()
            .filter_map(|collection| {
                let position = self.last_position(&collection.id)?;
                Some(LibraryEntry {
                    collection: collection.clone(),
                    progress: Progress::from_position(Some(position), collection.post_count()),
                })
            })
            .collect();
        LibraryShelf { entries }
    }

    fn persist(&self) -> StoreResult<()> {
        save_table(&self.store, PrefTable::LastViewedPositions, &self.positions)
    }

    fn restore(&mut self, collection_id: &str, previous: Option<usize>) {
        match previous {
            Some(index) => {
                self.positions.insert(collection_id.to_string(), index);
            }
            None => {
                self.positions.remove(collection_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Progress;

    #[test]
    fn progress_defaults_to_first_post() {
        assert_eq!(
            Progress::from_position(None, 5),
            Progress {
                current: 1,
                total: 5
            }
        );
    }

    #[test]
    fn progress_clamps_positions_past_the_end() {
        let progress = Progress::from_position(Some(42), 3);
        assert_eq!(progress.current, 3);
        assert!(progress.is_finished());
        assert!(!progress.is_in_progress());
    }

    #[test]
    fn empty_collection_is_neither_finished_nor_in_progress() {
        let progress = Progress::from_position(Some(0), 0);
        assert_eq!(
            progress,
            Progress {
                current: 0,
                total: 0
            }
        );
        assert!(!progress.is_finished());
        assert!(!progress.is_in_progress());
    }
}
