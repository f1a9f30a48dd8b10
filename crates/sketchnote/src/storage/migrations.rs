//! Schema versioning for the note database.
//!
//! The base schema in [`super::schema`] is always created idempotently.
//! Later changes are listed in [`MIGRATIONS`] and applied in order, each in
//! its own transaction, recording the reached version in the `metadata`
//! table.

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::schema::{CREATE_USER_TABLES, SCHEMA_STATEMENTS};

/// A single forward-only schema change.
struct Migration {
    version: i32,
    description: &'static str,
    sql: &'static str,
}

/// Ordered list of migrations. Version 1 is the base schema.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "base schema",
        sql: "",
    },
    Migration {
        version: 2,
        description: "index notes by modification time",
        sql: "CREATE INDEX IF NOT EXISTS idx_notes_modified ON notes(notebook_id, last_modified)",
    },
    Migration {
        version: 3,
        description: "users and friendships",
        sql: CREATE_USER_TABLES,
    },
];

/// The schema version a fully migrated database reports.
pub const CURRENT_VERSION: i32 = 3;

const VERSION_KEY: &str = "schema_version";

/// Create the base schema and bring it up to [`CURRENT_VERSION`].
///
/// # Errors
///
/// Returns an error if a statement fails, the stored version cannot be read,
/// or the database was written by a newer release.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }

    let version = schema_version(conn)?;
    if version > CURRENT_VERSION {
        return Err(Error::DatabaseMigration {
            message: format!(
                "database schema version {version} is newer than supported version {CURRENT_VERSION}"
            ),
        });
    }

    for migration in MIGRATIONS.iter().filter(|m| m.version > version) {
        apply(conn, migration)?;
    }

    Ok(())
}

/// Read the recorded schema version; 0 for a fresh database.
fn schema_version(conn: &Connection) -> Result<i32> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    match value {
        None => Ok(0),
        Some(value) => value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        }),
    }
}

fn record_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}

fn apply(conn: &Connection, migration: &Migration) -> Result<()> {
    debug!(
        "Applying migration {}: {}",
        migration.version, migration.description
    );
    let tx = conn.unchecked_transaction()?;
    if !migration.sql.is_empty() {
        tx.execute_batch(migration.sql)?;
    }
    record_version(&tx, migration.version)?;
    tx.commit()?;
    info!("Database schema at version {}", migration.version);
    Ok(())
}
