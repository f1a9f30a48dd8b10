//! `SQLite` schema definitions for sketchnote.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the notebooks table.
pub const CREATE_NOTEBOOKS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS notebooks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    created_by TEXT NOT NULL,
    created_at TEXT NOT NULL,
    last_modified TEXT NOT NULL
)
";

/// SQL statement to create the table of emails a notebook is shared with.
pub const CREATE_SHARES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS notebook_shares (
    notebook_id INTEGER NOT NULL REFERENCES notebooks(id) ON DELETE CASCADE,
    email TEXT NOT NULL,
    PRIMARY KEY (notebook_id, email)
)
";

/// SQL statement to create the notes table.
pub const CREATE_NOTES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    notebook_id INTEGER NOT NULL REFERENCES notebooks(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    drawing TEXT NOT NULL DEFAULT '',
    drawing_hash TEXT NOT NULL,
    created_at TEXT NOT NULL,
    last_modified TEXT NOT NULL
)
";

/// SQL statement to create an index on `created_by` for listing owned notebooks.
pub const CREATE_OWNER_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_notebooks_owner ON notebooks(created_by)
";

/// SQL statement to create an index on share email for listing shared notebooks.
pub const CREATE_SHARE_EMAIL_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_shares_email ON notebook_shares(email)
";

/// SQL statement to create an index on `notebook_id` for loading notes.
pub const CREATE_NOTE_NOTEBOOK_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_notes_notebook ON notes(notebook_id)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// SQL statements that add registered users and mutual friendships.
///
/// Applied as a migration rather than part of the base schema.
pub const CREATE_USER_TABLES: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    display_name TEXT NOT NULL DEFAULT '',
    username TEXT UNIQUE,
    created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS friendships (
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    friend_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    PRIMARY KEY (user_id, friend_id),
    CHECK (user_id <> friend_id)
);
CREATE INDEX IF NOT EXISTS idx_friendships_friend ON friendships(friend_id);
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_NOTEBOOKS_TABLE,
    CREATE_SHARES_TABLE,
    CREATE_NOTES_TABLE,
    CREATE_OWNER_INDEX,
    CREATE_SHARE_EMAIL_INDEX,
    CREATE_NOTE_NOTEBOOK_INDEX,
    CREATE_METADATA_TABLE,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.is_empty());
        }
    }

    #[test]
    fn test_create_notes_table_contains_required_columns() {
        assert!(CREATE_NOTES_TABLE.contains("id INTEGER PRIMARY KEY"));
        assert!(CREATE_NOTES_TABLE.contains("notebook_id INTEGER NOT NULL"));
        assert!(CREATE_NOTES_TABLE.contains("drawing TEXT NOT NULL"));
        assert!(CREATE_NOTES_TABLE.contains("drawing_hash TEXT NOT NULL"));
    }

    #[test]
    fn test_shares_cascade_with_notebook() {
        assert!(CREATE_SHARES_TABLE.contains("ON DELETE CASCADE"));
        assert!(CREATE_NOTES_TABLE.contains("ON DELETE CASCADE"));
    }

    #[test]
    fn test_user_tables_enforce_uniqueness() {
        assert!(CREATE_USER_TABLES.contains("email TEXT NOT NULL UNIQUE"));
        assert!(CREATE_USER_TABLES.contains("username TEXT UNIQUE"));
        assert!(CREATE_USER_TABLES.contains("PRIMARY KEY (user_id, friend_id)"));
    }

    #[test]
    fn test_create_metadata_table_structure() {
        assert!(CREATE_METADATA_TABLE.contains("key TEXT PRIMARY KEY"));
        assert!(CREATE_METADATA_TABLE.contains("value TEXT NOT NULL"));
    }
}
