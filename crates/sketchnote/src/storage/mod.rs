//! Storage layer for sketchnote.
//!
//! This module provides `SQLite`-based persistent storage for notebooks and
//! their notes, including sharing by email and the serialized drawing kept
//! with each note.

pub mod migrations;
pub mod schema;
mod users;

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::notebook::{
    is_valid_email, normalize_email, Note, Notebook, DEFAULT_NOTEBOOK_DESCRIPTION,
    DEFAULT_NOTEBOOK_TITLE, DEFAULT_NOTE_CONTENT, DEFAULT_NOTE_TITLE,
};

const NOTEBOOK_COLUMNS: &str = "id, title, description, created_by, created_at, last_modified";
const NOTE_COLUMNS: &str =
    "id, notebook_id, title, content, drawing, drawing_hash, created_at, last_modified";

/// Storage engine for notebooks and notes.
///
/// Provides persistent storage using `SQLite` with support for:
/// - Notebooks owned by a user and shared with others by email
/// - Notes nested in a notebook, each with an optional drawing
/// - Change detection on drawings by content hash
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;",
        )?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let path = PathBuf::from(":memory:");
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        migrations::initialize_schema(&conn)?;

        Ok(Self { path, conn })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    // === Notebooks ===

    /// Create a notebook owned by `created_by`.
    ///
    /// A missing or blank title falls back to the default title.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn create_notebook(&self, created_by: &str, title: Option<&str>) -> Result<Notebook> {
        let created_by = created_by.trim();
        if created_by.is_empty() {
            return Err(Error::invalid_input("notebook owner must not be empty"));
        }
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_NOTEBOOK_TITLE);
        let stamp = now();

        self.conn.execute(
            r"
            INSERT INTO notebooks (title, description, created_by, created_at, last_modified)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ",
            params![title, DEFAULT_NOTEBOOK_DESCRIPTION, created_by, stamp],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Created notebook {} for {}", id, created_by);
        self.require_notebook(id)
    }

    /// Get a notebook with its shares and notes.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_notebook(&self, id: i64) -> Result<Option<Notebook>> {
        let sql = format!("SELECT {NOTEBOOK_COLUMNS} FROM notebooks WHERE id = ?1");
        let notebook = self
            .conn
            .query_row(&sql, [id], Self::row_to_notebook)
            .optional()?;

        match notebook {
            Some(notebook) => Ok(Some(self.hydrate(notebook)?)),
            None => Ok(None),
        }
    }

    fn require_notebook(&self, id: i64) -> Result<Notebook> {
        self.get_notebook(id)?
            .ok_or_else(|| Error::notebook_not_found(id))
    }

    /// List notebooks created by `user_id`, most recently modified first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_owned(&self, user_id: &str) -> Result<Vec<Notebook>> {
        let sql = format!(
            "SELECT {NOTEBOOK_COLUMNS} FROM notebooks WHERE created_by = ?1 \
             ORDER BY last_modified DESC, id DESC"
        );
        self.query_notebooks(&sql, user_id.trim())
    }

    /// List notebooks shared with `email` (case-insensitive), most recently
    /// modified first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_shared_with(&self, email: &str) -> Result<Vec<Notebook>> {
        let sql = format!(
            "SELECT {NOTEBOOK_COLUMNS} FROM notebooks WHERE id IN \
             (SELECT notebook_id FROM notebook_shares WHERE email = ?1) \
             ORDER BY last_modified DESC, id DESC"
        );
        self.query_notebooks(&sql, &normalize_email(email))
    }

    fn query_notebooks(&self, sql: &str, param: &str) -> Result<Vec<Notebook>> {
        let mut stmt = self.conn.prepare(sql)?;
        let notebooks = stmt
            .query_map([param], Self::row_to_notebook)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        notebooks.into_iter().map(|nb| self.hydrate(nb)).collect()
    }

    /// Rename a notebook.
    ///
    /// # Errors
    ///
    /// Returns an error if the title is blank, the notebook does not exist,
    /// or the database operation fails.
    pub fn rename_notebook(&self, id: i64, title: &str) -> Result<()> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::invalid_input("notebook title must not be empty"));
        }
        self.update_notebook_field(id, "title", title)
    }

    /// Replace a notebook's description.
    ///
    /// # Errors
    ///
    /// Returns an error if the notebook does not exist or the database
    /// operation fails.
    pub fn describe_notebook(&self, id: i64, description: &str) -> Result<()> {
        self.update_notebook_field(id, "description", description.trim())
    }

    fn update_notebook_field(&self, id: i64, column: &str, value: &str) -> Result<()> {
        let sql = format!("UPDATE notebooks SET {column} = ?1, last_modified = ?2 WHERE id = ?3");
        let affected = self
            .conn
            .execute(&sql, params![value, now(), id])?;
        if affected == 0 {
            return Err(Error::notebook_not_found(id));
        }
        Ok(())
    }

    /// Delete a notebook together with its notes and shares.
    ///
    /// Only the notebook's creator may delete it; collaborators it is shared
    /// with may not. Returns `true` if a notebook was deleted, `false` if not
    /// found.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotOwner`] if `owner` did not create the notebook, or
    /// an error if the database operation fails.
    pub fn delete_notebook(&self, id: i64, owner: &str) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let created_by: Option<String> = tx
            .query_row("SELECT created_by FROM notebooks WHERE id = ?1", [id], |row| {
                row.get(0)
            })
            .optional()?;
        let Some(created_by) = created_by else {
            return Ok(false);
        };
        if created_by != owner.trim() {
            warn!("Refusing to delete notebook {} for {}", id, owner.trim());
            return Err(Error::not_owner(id));
        }

        let notes = tx.execute("DELETE FROM notes WHERE notebook_id = ?1", [id])?;
        tx.execute("DELETE FROM notebook_shares WHERE notebook_id = ?1", [id])?;
        tx.execute("DELETE FROM notebooks WHERE id = ?1", [id])?;
        tx.commit()?;

        info!("Deleted notebook {} and {} notes", id, notes);
        Ok(true)
    }

    /// Share a notebook with an email address.
    ///
    /// The address is lowercased. Returns `true` if the share is new,
    /// `false` if the notebook was already shared with that address.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is malformed, the notebook does not
    /// exist, or the database operation fails.
    pub fn share_notebook(&self, id: i64, email: &str) -> Result<bool> {
        if !is_valid_email(email) {
            return Err(Error::invalid_input(format!(
                "not a valid email address: {}",
                email.trim()
            )));
        }
        self.ensure_notebook_exists(id)?;

        let email = normalize_email(email);
        let tx = self.conn.unchecked_transaction()?;
        let affected = tx.execute(
            "INSERT OR IGNORE INTO notebook_shares (notebook_id, email) VALUES (?1, ?2)",
            params![id, email],
        )?;
        if affected > 0 {
            Self::touch_notebook(&tx, id, &now())?;
        }
        tx.commit()?;

        if affected > 0 {
            debug!("Shared notebook {} with {}", id, email);
        }
        Ok(affected > 0)
    }

    /// Stop sharing a notebook with an email address.
    ///
    /// Returns `true` if a share was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the notebook does not exist or the database
    /// operation fails.
    pub fn unshare_notebook(&self, id: i64, email: &str) -> Result<bool> {
        self.ensure_notebook_exists(id)?;
        let tx = self.conn.unchecked_transaction()?;
        let affected = tx.execute(
            "DELETE FROM notebook_shares WHERE notebook_id = ?1 AND email = ?2",
            params![id, normalize_email(email)],
        )?;
        if affected > 0 {
            Self::touch_notebook(&tx, id, &now())?;
        }
        tx.commit()?;
        Ok(affected > 0)
    }

    fn ensure_notebook_exists(&self, id: i64) -> Result<()> {
        let exists: Option<i64> = self
            .conn
            .query_row("SELECT id FROM notebooks WHERE id = ?1", [id], |row| {
                row.get(0)
            })
            .optional()?;
        exists.map(|_| ()).ok_or_else(|| Error::notebook_not_found(id))
    }

    /// Bump a notebook's modification time. Callers run this inside the
    /// transaction that made the change.
    fn touch_notebook(conn: &Connection, id: i64, stamp: &str) -> Result<()> {
        conn.execute(
            "UPDATE notebooks SET last_modified = ?1 WHERE id = ?2",
            params![stamp, id],
        )?;
        Ok(())
    }

    // === Notes ===

    /// Add a note with default title and content to a notebook.
    ///
    /// # Errors
    ///
    /// Returns an error if the notebook does not exist or the database
    /// operation fails.
    pub fn add_note(&self, notebook_id: i64) -> Result<Note> {
        self.ensure_notebook_exists(notebook_id)?;
        let stamp = now();

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            r"
            INSERT INTO notes (notebook_id, title, content, drawing, drawing_hash, created_at, last_modified)
            VALUES (?1, ?2, ?3, '', ?4, ?5, ?5)
            ",
            params![
                notebook_id,
                DEFAULT_NOTE_TITLE,
                DEFAULT_NOTE_CONTENT,
                Note::compute_drawing_hash(""),
                stamp
            ],
        )?;
        let note_id = tx.last_insert_rowid();
        Self::touch_notebook(&tx, notebook_id, &stamp)?;
        tx.commit()?;
        debug!("Added note {} to notebook {}", note_id, notebook_id);

        self.get_note(notebook_id, note_id)?
            .ok_or_else(|| Error::note_not_found(notebook_id, note_id))
    }

    /// Get a note by notebook and note id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_note(&self, notebook_id: i64, note_id: i64) -> Result<Option<Note>> {
        let sql = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE notebook_id = ?1 AND id = ?2");
        let note = self
            .conn
            .query_row(&sql, [notebook_id, note_id], Self::row_to_note)
            .optional()?;
        Ok(note)
    }

    /// List the notes of a notebook in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_notes(&self, notebook_id: i64) -> Result<Vec<Note>> {
        let sql = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE notebook_id = ?1 ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let notes = stmt
            .query_map([notebook_id], Self::row_to_note)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(notes)
    }

    /// Replace a note's title and content.
    ///
    /// # Errors
    ///
    /// Returns an error if the note does not exist or the database operation
    /// fails.
    pub fn update_note_text(
        &self,
        notebook_id: i64,
        note_id: i64,
        title: &str,
        content: &str,
    ) -> Result<()> {
        let stamp = now();
        let tx = self.conn.unchecked_transaction()?;
        let affected = tx.execute(
            r"
            UPDATE notes SET title = ?1, content = ?2, last_modified = ?3
            WHERE notebook_id = ?4 AND id = ?5
            ",
            params![title, content, stamp, notebook_id, note_id],
        )?;
        if affected == 0 {
            return Err(Error::note_not_found(notebook_id, note_id));
        }
        Self::touch_notebook(&tx, notebook_id, &stamp)?;
        tx.commit()?;
        Ok(())
    }

    /// Read a note's serialized drawing.
    ///
    /// # Errors
    ///
    /// Returns an error if the note does not exist or the database operation
    /// fails.
    pub fn read_drawing(&self, notebook_id: i64, note_id: i64) -> Result<String> {
        let drawing: Option<String> = self
            .conn
            .query_row(
                "SELECT drawing FROM notes WHERE notebook_id = ?1 AND id = ?2",
                [notebook_id, note_id],
                |row| row.get(0),
            )
            .optional()?;
        drawing.ok_or_else(|| Error::note_not_found(notebook_id, note_id))
    }

    /// Write a note's serialized drawing.
    ///
    /// Returns `true` if the stored value changed. Every write bumps the
    /// note's and the notebook's modification time.
    ///
    /// # Errors
    ///
    /// Returns an error if the note does not exist or the database operation
    /// fails.
    pub fn write_drawing(&self, notebook_id: i64, note_id: i64, drawing: &str) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let previous: Option<String> = tx
            .query_row(
                "SELECT drawing_hash FROM notes WHERE notebook_id = ?1 AND id = ?2",
                [notebook_id, note_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(previous) = previous else {
            return Err(Error::note_not_found(notebook_id, note_id));
        };

        let hash = Note::compute_drawing_hash(drawing);
        let changed = previous != hash;

        let stamp = now();
        tx.execute(
            r"
            UPDATE notes SET drawing = ?1, drawing_hash = ?2, last_modified = ?3
            WHERE notebook_id = ?4 AND id = ?5
            ",
            params![drawing, hash, stamp, notebook_id, note_id],
        )?;
        Self::touch_notebook(&tx, notebook_id, &stamp)?;
        tx.commit()?;

        if changed {
            debug!(
                "Stored drawing for note {}/{} ({} bytes)",
                notebook_id,
                note_id,
                drawing.len()
            );
        }
        Ok(changed)
    }

    /// Delete a note.
    ///
    /// Returns `true` if a note was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_note(&self, notebook_id: i64, note_id: i64) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let affected = tx.execute(
            "DELETE FROM notes WHERE notebook_id = ?1 AND id = ?2",
            [notebook_id, note_id],
        )?;
        if affected > 0 {
            Self::touch_notebook(&tx, notebook_id, &now())?;
        }
        tx.commit()?;
        Ok(affected > 0)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let count = |sql: &str| -> Result<i64> {
            Ok(self.conn.query_row(sql, [], |row| row.get(0))?)
        };

        let notebooks = count("SELECT COUNT(*) FROM notebooks")?;
        let notes = count("SELECT COUNT(*) FROM notes")?;
        let notes_with_drawings = count("SELECT COUNT(*) FROM notes WHERE TRIM(drawing) <> ''")?;
        let shares = count("SELECT COUNT(*) FROM notebook_shares")?;

        let newest: Option<String> = self
            .conn
            .query_row(
                "SELECT last_modified FROM notebooks ORDER BY last_modified DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        let last_modified = newest.map(|s| parse_timestamp(&s));

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            notebooks,
            notes,
            notes_with_drawings,
            shares,
            last_modified,
            db_size_bytes,
        })
    }

    /// Attach shares and notes to a notebook row.
    fn hydrate(&self, mut notebook: Notebook) -> Result<Notebook> {
        let mut stmt = self
            .conn
            .prepare("SELECT email FROM notebook_shares WHERE notebook_id = ?1 ORDER BY email")?;
        notebook.shared_with = stmt
            .query_map([notebook.id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        notebook.notes = self.list_notes(notebook.id)?;
        Ok(notebook)
    }

    fn row_to_notebook(row: &rusqlite::Row) -> rusqlite::Result<Notebook> {
        let created_at: String = row.get(4)?;
        let last_modified: String = row.get(5)?;
        Ok(Notebook {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            created_by: row.get(3)?,
            shared_with: Vec::new(),
            created_at: parse_timestamp(&created_at),
            last_modified: parse_timestamp(&last_modified),
            notes: Vec::new(),
        })
    }

    fn row_to_note(row: &rusqlite::Row) -> rusqlite::Result<Note> {
        let created_at: String = row.get(6)?;
        let last_modified: String = row.get(7)?;
        Ok(Note {
            id: row.get(0)?,
            notebook_id: row.get(1)?,
            title: row.get(2)?,
            content: row.get(3)?,
            drawing: row.get(4)?,
            drawing_hash: row.get(5)?,
            created_at: parse_timestamp(&created_at),
            last_modified: parse_timestamp(&last_modified),
        })
    }
}

/// Fixed-width UTC timestamp so stored values sort chronologically as text.
fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value).map_or_else(
        |_| {
            warn!("Unreadable timestamp in database: {}", value);
            DateTime::<Utc>::default()
        },
        |dt| dt.with_timezone(&Utc),
    )
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    /// Number of notebooks.
    pub notebooks: i64,
    /// Number of notes across all notebooks.
    pub notes: i64,
    /// Number of notes carrying a non-empty drawing.
    pub notes_with_drawings: i64,
    /// Number of (notebook, email) shares.
    pub shares: i64,
    /// Most recent notebook modification.
    pub last_modified: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_storage() -> Storage {
        Storage::open_in_memory().expect("failed to create test storage")
    }

    #[test]
    fn test_open_in_memory() {
        let storage = Storage::open_in_memory();
        assert!(storage.is_ok());
    }

    #[test]
    fn test_path() {
        let storage = create_test_storage();
        assert_eq!(storage.path().to_string_lossy(), ":memory:");
    }

    #[test]
    fn test_create_notebook_defaults() {
        let storage = create_test_storage();
        let notebook = storage.create_notebook("ada", None).unwrap();

        assert_eq!(notebook.title, DEFAULT_NOTEBOOK_TITLE);
        assert_eq!(notebook.description, DEFAULT_NOTEBOOK_DESCRIPTION);
        assert_eq!(notebook.created_by, "ada");
        assert!(notebook.shared_with.is_empty());
        assert!(notebook.notes.is_empty());
    }

    #[test]
    fn test_create_notebook_with_title() {
        let storage = create_test_storage();
        let notebook = storage.create_notebook("ada", Some("  Sketches ")).unwrap();
        assert_eq!(notebook.title, "Sketches");

        let blank = storage.create_notebook("ada", Some("   ")).unwrap();
        assert_eq!(blank.title, DEFAULT_NOTEBOOK_TITLE);
    }

    #[test]
    fn test_create_notebook_requires_owner() {
        let storage = create_test_storage();
        let err = storage.create_notebook("  ", None).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_get_nonexistent_notebook() {
        let storage = create_test_storage();
        assert!(storage.get_notebook(99999).unwrap().is_none());
    }

    #[test]
    fn test_list_owned() {
        let storage = create_test_storage();
        let first = storage.create_notebook("ada", Some("First")).unwrap();
        let second = storage.create_notebook("ada", Some("Second")).unwrap();
        storage.create_notebook("grace", Some("Other")).unwrap();

        let owned = storage.list_owned("ada").unwrap();
        assert_eq!(owned.len(), 2);
        let ids: Vec<i64> = owned.iter().map(|n| n.id).collect();
        assert!(ids.contains(&first.id));
        assert!(ids.contains(&second.id));

        assert!(storage.list_owned("nobody").unwrap().is_empty());
    }

    #[test]
    fn test_list_owned_most_recent_first() {
        let storage = create_test_storage();
        let first = storage.create_notebook("ada", Some("First")).unwrap();
        let second = storage.create_notebook("ada", Some("Second")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        storage.add_note(first.id).unwrap();

        let owned = storage.list_owned("ada").unwrap();
        assert_eq!(owned[0].id, first.id);
        assert_eq!(owned[1].id, second.id);
    }

    #[test]
    fn test_share_and_list_shared() {
        let storage = create_test_storage();
        let notebook = storage.create_notebook("ada", None).unwrap();

        assert!(storage
            .share_notebook(notebook.id, " Grace@Example.com ")
            .unwrap());
        let shared = storage.list_shared_with("GRACE@example.com").unwrap();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].id, notebook.id);
        assert_eq!(shared[0].shared_with, vec!["grace@example.com".to_string()]);

        assert!(storage.list_shared_with("other@example.com").unwrap().is_empty());
    }

    #[test]
    fn test_share_is_idempotent() {
        let storage = create_test_storage();
        let notebook = storage.create_notebook("ada", None).unwrap();

        assert!(storage.share_notebook(notebook.id, "grace@example.com").unwrap());
        assert!(!storage.share_notebook(notebook.id, "GRACE@example.com").unwrap());

        let notebook = storage.get_notebook(notebook.id).unwrap().unwrap();
        assert_eq!(notebook.shared_with.len(), 1);
    }

    #[test]
    fn test_share_rejects_bad_email() {
        let storage = create_test_storage();
        let notebook = storage.create_notebook("ada", None).unwrap();
        let err = storage.share_notebook(notebook.id, "not-an-email").unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_share_missing_notebook() {
        let storage = create_test_storage();
        let err = storage.share_notebook(42, "grace@example.com").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_unshare() {
        let storage = create_test_storage();
        let notebook = storage.create_notebook("ada", None).unwrap();
        storage.share_notebook(notebook.id, "grace@example.com").unwrap();

        assert!(storage.unshare_notebook(notebook.id, "Grace@example.com").unwrap());
        assert!(!storage.unshare_notebook(notebook.id, "grace@example.com").unwrap());
        assert!(storage.list_shared_with("grace@example.com").unwrap().is_empty());
    }

    #[test]
    fn test_rename_and_describe() {
        let storage = create_test_storage();
        let notebook = storage.create_notebook("ada", None).unwrap();

        storage.rename_notebook(notebook.id, "Trips").unwrap();
        storage.describe_notebook(notebook.id, "Places I went").unwrap();

        let notebook = storage.get_notebook(notebook.id).unwrap().unwrap();
        assert_eq!(notebook.title, "Trips");
        assert_eq!(notebook.description, "Places I went");
    }

    #[test]
    fn test_rename_rejects_blank_title() {
        let storage = create_test_storage();
        let notebook = storage.create_notebook("ada", None).unwrap();
        assert!(storage.rename_notebook(notebook.id, " ").unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_rename_missing_notebook() {
        let storage = create_test_storage();
        assert!(storage.rename_notebook(5, "x").unwrap_err().is_not_found());
        assert!(storage.describe_notebook(5, "x").unwrap_err().is_not_found());
    }

    #[test]
    fn test_add_note_defaults() {
        let storage = create_test_storage();
        let notebook = storage.create_notebook("ada", None).unwrap();
        let note = storage.add_note(notebook.id).unwrap();

        assert_eq!(note.notebook_id, notebook.id);
        assert_eq!(note.title, DEFAULT_NOTE_TITLE);
        assert_eq!(note.content, DEFAULT_NOTE_CONTENT);
        assert_eq!(note.drawing, "");
        assert_eq!(note.drawing_hash, Note::compute_drawing_hash(""));
    }

    #[test]
    fn test_add_note_missing_notebook() {
        let storage = create_test_storage();
        assert!(storage.add_note(7).unwrap_err().is_not_found());
    }

    #[test]
    fn test_notes_nested_in_notebook() {
        let storage = create_test_storage();
        let notebook = storage.create_notebook("ada", None).unwrap();
        let a = storage.add_note(notebook.id).unwrap();
        let b = storage.add_note(notebook.id).unwrap();

        let notebook = storage.get_notebook(notebook.id).unwrap().unwrap();
        let ids: Vec<i64> = notebook.notes.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[test]
    fn test_get_note_scoped_to_notebook() {
        let storage = create_test_storage();
        let first = storage.create_notebook("ada", None).unwrap();
        let second = storage.create_notebook("ada", None).unwrap();
        let note = storage.add_note(first.id).unwrap();

        assert!(storage.get_note(first.id, note.id).unwrap().is_some());
        assert!(storage.get_note(second.id, note.id).unwrap().is_none());
    }

    #[test]
    fn test_update_note_text() {
        let storage = create_test_storage();
        let notebook = storage.create_notebook("ada", None).unwrap();
        let note = storage.add_note(notebook.id).unwrap();

        storage
            .update_note_text(notebook.id, note.id, "Groceries", "eggs, milk")
            .unwrap();
        let note = storage.get_note(notebook.id, note.id).unwrap().unwrap();
        assert_eq!(note.title, "Groceries");
        assert_eq!(note.content, "eggs, milk");
    }

    #[test]
    fn test_update_missing_note() {
        let storage = create_test_storage();
        let notebook = storage.create_notebook("ada", None).unwrap();
        let err = storage
            .update_note_text(notebook.id, 99, "t", "c")
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_write_and_read_drawing() {
        let storage = create_test_storage();
        let notebook = storage.create_notebook("ada", None).unwrap();
        let note = storage.add_note(notebook.id).unwrap();

        assert_eq!(storage.read_drawing(notebook.id, note.id).unwrap(), "");
        assert!(storage
            .write_drawing(notebook.id, note.id, "M10,10 L20,10")
            .unwrap());
        assert_eq!(
            storage.read_drawing(notebook.id, note.id).unwrap(),
            "M10,10 L20,10"
        );

        let note = storage.get_note(notebook.id, note.id).unwrap().unwrap();
        assert_eq!(note.drawing_hash, Note::compute_drawing_hash("M10,10 L20,10"));
    }

    #[test]
    fn test_write_same_drawing_reports_unchanged() {
        let storage = create_test_storage();
        let notebook = storage.create_notebook("ada", None).unwrap();
        let note = storage.add_note(notebook.id).unwrap();

        assert!(storage.write_drawing(notebook.id, note.id, "M1,1").unwrap());
        assert!(!storage.write_drawing(notebook.id, note.id, "M1,1").unwrap());
        assert!(storage.write_drawing(notebook.id, note.id, "").unwrap());
    }

    #[test]
    fn test_write_drawing_bumps_modification_time() {
        let storage = create_test_storage();
        let notebook = storage.create_notebook("ada", None).unwrap();
        let note = storage.add_note(notebook.id).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));

        storage.write_drawing(notebook.id, note.id, "M1,1").unwrap();

        let after = storage.get_note(notebook.id, note.id).unwrap().unwrap();
        assert!(after.last_modified > note.last_modified);
        let nb = storage.get_notebook(notebook.id).unwrap().unwrap();
        assert!(nb.last_modified >= after.last_modified);
    }

    #[test]
    fn test_note_and_notebook_share_one_stamp() {
        let storage = create_test_storage();
        let notebook = storage.create_notebook("ada", None).unwrap();
        let note = storage.add_note(notebook.id).unwrap();

        storage.write_drawing(notebook.id, note.id, "M1,1").unwrap();
        let drawn = storage.get_note(notebook.id, note.id).unwrap().unwrap();
        let nb = storage.get_notebook(notebook.id).unwrap().unwrap();
        assert_eq!(nb.last_modified, drawn.last_modified);

        storage
            .update_note_text(notebook.id, note.id, "Title", "Body")
            .unwrap();
        let edited = storage.get_note(notebook.id, note.id).unwrap().unwrap();
        let nb = storage.get_notebook(notebook.id).unwrap().unwrap();
        assert_eq!(nb.last_modified, edited.last_modified);
    }

    #[test]
    fn test_failed_touch_rolls_back_note_update() {
        let storage = create_test_storage();
        let notebook = storage.create_notebook("ada", None).unwrap();
        let note = storage.add_note(notebook.id).unwrap();
        storage.write_drawing(notebook.id, note.id, "M1,1").unwrap();

        storage
            .conn
            .execute_batch(
                "CREATE TRIGGER fail_touch BEFORE UPDATE ON notebooks \
                 BEGIN SELECT RAISE(ABORT, 'locked'); END;",
            )
            .unwrap();

        assert!(storage.write_drawing(notebook.id, note.id, "M2,2").is_err());
        assert!(storage
            .update_note_text(notebook.id, note.id, "Lost", "Lost")
            .is_err());

        let note = storage.get_note(notebook.id, note.id).unwrap().unwrap();
        assert_eq!(note.drawing, "M1,1");
        assert_eq!(note.drawing_hash, Note::compute_drawing_hash("M1,1"));
        assert_eq!(note.title, DEFAULT_NOTE_TITLE);
    }

    #[test]
    fn test_drawing_missing_note() {
        let storage = create_test_storage();
        let notebook = storage.create_notebook("ada", None).unwrap();
        assert!(storage.read_drawing(notebook.id, 3).unwrap_err().is_not_found());
        assert!(storage
            .write_drawing(notebook.id, 3, "M0,0")
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_delete_note() {
        let storage = create_test_storage();
        let notebook = storage.create_notebook("ada", None).unwrap();
        let note = storage.add_note(notebook.id).unwrap();

        assert!(storage.delete_note(notebook.id, note.id).unwrap());
        assert!(!storage.delete_note(notebook.id, note.id).unwrap());
        assert!(storage.list_notes(notebook.id).unwrap().is_empty());
    }

    #[test]
    fn test_delete_notebook_cascades() {
        let storage = create_test_storage();
        let notebook = storage.create_notebook("ada", None).unwrap();
        let note = storage.add_note(notebook.id).unwrap();
        storage.share_notebook(notebook.id, "grace@example.com").unwrap();

        assert!(storage.delete_notebook(notebook.id, "ada").unwrap());
        assert!(storage.get_notebook(notebook.id).unwrap().is_none());
        assert!(storage.get_note(notebook.id, note.id).unwrap().is_none());
        assert!(storage.list_shared_with("grace@example.com").unwrap().is_empty());

        let stats = storage.stats().unwrap();
        assert_eq!(stats.notes, 0);
        assert_eq!(stats.shares, 0);
    }

    #[test]
    fn test_delete_nonexistent_notebook() {
        let storage = create_test_storage();
        assert!(!storage.delete_notebook(99999, "ada").unwrap());
    }

    #[test]
    fn test_only_owner_deletes_shared_notebook() {
        let storage = create_test_storage();
        let notebook = storage.create_notebook("ada", Some("Shared")).unwrap();
        storage.add_note(notebook.id).unwrap();
        storage.share_notebook(notebook.id, "grace@example.com").unwrap();

        let err = storage.delete_notebook(notebook.id, "grace").unwrap_err();
        assert!(err.is_not_owner());

        let kept = storage.get_notebook(notebook.id).unwrap().unwrap();
        assert_eq!(kept.notes.len(), 1);
        assert_eq!(kept.shared_with, vec!["grace@example.com".to_string()]);
        assert_eq!(storage.list_shared_with("grace@example.com").unwrap().len(), 1);

        assert!(storage.delete_notebook(notebook.id, " ada ").unwrap());
    }

    #[test]
    fn test_stats_empty() {
        let storage = create_test_storage();
        let stats = storage.stats().unwrap();

        assert_eq!(stats.notebooks, 0);
        assert_eq!(stats.notes, 0);
        assert_eq!(stats.notes_with_drawings, 0);
        assert!(stats.last_modified.is_none());
        assert_eq!(stats.db_size_bytes, 0);
    }

    #[test]
    fn test_stats_with_data() {
        let storage = create_test_storage();
        let notebook = storage.create_notebook("ada", None).unwrap();
        let a = storage.add_note(notebook.id).unwrap();
        storage.add_note(notebook.id).unwrap();
        storage.write_drawing(notebook.id, a.id, "M0,0 L1,1").unwrap();

        let stats = storage.stats().unwrap();
        assert_eq!(stats.notebooks, 1);
        assert_eq!(stats.notes, 2);
        assert_eq!(stats.notes_with_drawings, 1);
        assert!(stats.last_modified.is_some());
    }

    #[test]
    fn test_unicode_content() {
        let storage = create_test_storage();
        let notebook = storage.create_notebook("ada", Some("Carnet ✏️")).unwrap();
        let note = storage.add_note(notebook.id).unwrap();
        storage
            .update_note_text(notebook.id, note.id, "日記", "Привет")
            .unwrap();

        let note = storage.get_note(notebook.id, note.id).unwrap().unwrap();
        assert_eq!(note.title, "日記");
        assert_eq!(note.content, "Привет");
        assert_eq!(
            storage.get_notebook(notebook.id).unwrap().unwrap().title,
            "Carnet ✏️"
        );
    }

    #[test]
    fn test_large_drawing() {
        let storage = create_test_storage();
        let notebook = storage.create_notebook("ada", None).unwrap();
        let note = storage.add_note(notebook.id).unwrap();
        let drawing = std::iter::once("M0,0".to_string())
            .chain((1..5000).map(|i| format!("L{i},{i}")))
            .collect::<Vec<_>>()
            .join(" ");

        storage.write_drawing(notebook.id, note.id, &drawing).unwrap();
        assert_eq!(storage.read_drawing(notebook.id, note.id).unwrap(), drawing);
    }

    #[test]
    fn test_open_file_based() {
        let db_path = std::env::temp_dir().join(format!("sketchnote_test_{}.db", std::process::id()));

        let storage = Storage::open(&db_path).unwrap();
        let notebook = storage.create_notebook("ada", None).unwrap();
        assert_eq!(storage.path(), db_path);
        drop(storage);

        let reopened = Storage::open(&db_path).unwrap();
        assert!(reopened.get_notebook(notebook.id).unwrap().is_some());
        assert!(reopened.stats().unwrap().db_size_bytes > 0);

        drop(reopened);
        let _ = std::fs::remove_file(&db_path);
        let _ = std::fs::remove_file(db_path.with_extension("db-wal"));
        let _ = std::fs::remove_file(db_path.with_extension("db-shm"));
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let root = std::env::temp_dir().join(format!("sketchnote_test_{}", std::process::id()));
        let nested_path = root.join("nested/notes.db");
        let _ = std::fs::remove_dir_all(&root);

        let storage = Storage::open(&nested_path).unwrap();
        assert!(nested_path.exists());

        drop(storage);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_storage_stats_serialize() {
        let stats = StorageStats {
            notebooks: 2,
            notes: 5,
            notes_with_drawings: 1,
            shares: 0,
            last_modified: None,
            db_size_bytes: 1024,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"notes_with_drawings\":1"));
    }
}
