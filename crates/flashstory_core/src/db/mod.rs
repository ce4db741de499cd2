//! Preference database: connection bootstrap and schema steps.
//!
//! # Invariants
//! - Preference rows are never read or written before `schema::migrate`
//!   succeeds on the connection.
//! - Schema errors carry the step or table they concern.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};
pub use schema::{SchemaReport, SCHEMA_VERSION};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// A schema step failed; earlier steps stay applied.
    SchemaStep {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
    /// The file was written by a newer build.
    SchemaTooNew { found: u32, supported: u32 },
    /// `user_version` is current but the `preferences` table is absent.
    MissingPreferencesTable,
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::SchemaStep {
                version,
                name,
                source,
            } => write!(f, "schema step {version} `{name}` failed: {source}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "preference schema version {found} is newer than supported {supported}"
            ),
            Self::MissingPreferencesTable => {
                f.write_str("preference schema is current but table `preferences` is missing")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::SchemaStep { source: err, .. } => Some(err),
            Self::SchemaTooNew { .. } | Self::MissingPreferencesTable => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
