//! In-process preference store for tests and previews.

use super::{PrefTable, PreferenceStore, StoreResult, StoredPayload};
use std::cell::RefCell;
use std::collections::HashMap;

/// Disposable store; every instance starts empty and shares nothing.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    tables: RefCell<HashMap<PrefTable, StoredPayload>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw JSON currently stored for `table`.
    pub fn raw_json(&self, table: PrefTable) -> Option<String> {
        self.tables
            .borrow()
            .get(&table)
            .map(|payload| payload.json.clone())
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load_raw(&self, table: PrefTable) -> StoreResult<Option<StoredPayload>> {
        Ok(self.tables.borrow().get(&table).cloned())
    }

    fn save_raw(&self, table: PrefTable, payload: &StoredPayload) -> StoreResult<()> {
        self.tables.borrow_mut().insert(table, payload.clone());
        Ok(())
    }
}
