//! Preference database schema steps.
//!
//! Each step runs in its own transaction and bumps `PRAGMA user_version`,
//! so a failed step names itself and leaves earlier steps committed.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    name: "preferences",
    sql: include_str!("0001_preferences.sql"),
}];

/// Schema version written by this binary.
pub const SCHEMA_VERSION: u32 = STEPS[STEPS.len() - 1].version;

/// What `migrate` did to a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaReport {
    pub from_version: u32,
    pub to_version: u32,
    /// Names of the steps applied by this call, in order.
    pub applied: Vec<&'static str>,
}

/// Brings the preference schema up to `SCHEMA_VERSION`.
///
/// # Errors
/// - `SchemaTooNew` when the file was written by a newer build.
/// - `SchemaStep` naming the step whose SQL failed.
/// - `MissingPreferencesTable` when the version claims a schema that is absent.
pub fn migrate(conn: &mut Connection) -> DbResult<SchemaReport> {
    let from_version = user_version(conn)?;
    if from_version > SCHEMA_VERSION {
        return Err(DbError::SchemaTooNew {
            found: from_version,
            supported: SCHEMA_VERSION,
        });
    }

    let mut applied = Vec::new();
    for step in STEPS.iter().filter(|step| step.version > from_version) {
        let tx = conn.transaction()?;
        tx.execute_batch(step.sql)
            .and_then(|()| tx.pragma_update(None, "user_version", step.version))
            .map_err(|source| DbError::SchemaStep {
                version: step.version,
                name: step.name,
                source,
            })?;
        tx.commit()?;
        info!(
            "event=schema_step module=db status=ok version={} name={}",
            step.version, step.name
        );
        applied.push(step.name);
    }

    ensure_preferences_table(conn)?;
    Ok(SchemaReport {
        from_version,
        to_version: SCHEMA_VERSION,
        applied,
    })
}

fn user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}

fn ensure_preferences_table(conn: &Connection) -> DbResult<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'preferences');",
        [],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(DbError::MissingPreferencesTable)
    }
}

#[cfg(test)]
mod tests {
    use super::{migrate, SCHEMA_VERSION};
    use rusqlite::Connection;

    #[test]
    fn fresh_database_applies_every_step_once() {
        let mut conn = Connection::open_in_memory().unwrap();

        let first = migrate(&mut conn).unwrap();
        assert_eq!(first.from_version, 0);
        assert_eq!(first.to_version, SCHEMA_VERSION);
        assert_eq!(first.applied, vec!["preferences"]);

        let second = migrate(&mut conn).unwrap();
        assert_eq!(second.from_version, SCHEMA_VERSION);
        assert!(second.applied.is_empty());
    }
}
