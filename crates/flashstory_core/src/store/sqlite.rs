//! SQLite-backed preference store.
//!
//! # Invariants
//! - One row per table key; saves upsert the whole payload.
//! - The connection must come from `db::open_db*` so the schema is current.

use super::{PrefTable, PreferenceStore, StoreError, StoreResult, StoredPayload};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

pub struct SqlitePreferenceStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePreferenceStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PreferenceStore for SqlitePreferenceStore<'_> {
    fn load_raw(&self, table: PrefTable) -> StoreResult<Option<StoredPayload>> {
        let row = self
            .conn
            .query_row(
                "SELECT payload_version, payload FROM preferences WHERE table_key = ?1;",
                [table.key()],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        let Some((version, json)) = row else {
            return Ok(None);
        };
        let version = u32::try_from(version).map_err(|_| {
            StoreError::InvalidData(table, format!("invalid payload_version `{version}`"))
        })?;
        Ok(Some(StoredPayload { version, json }))
    }

    fn save_raw(&self, table: PrefTable, payload: &StoredPayload) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO preferences (table_key, payload_version, payload)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(table_key) DO UPDATE SET
                payload_version = excluded.payload_version,
                payload = excluded.payload,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![table.key(), i64::from(payload.version), payload.json.as_str()],
        )?;
        debug!(
            "event=pref_save module=store status=ok table={} bytes={}",
            table.key(),
            payload.json.len()
        );
        Ok(())
    }
}
