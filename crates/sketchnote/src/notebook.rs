//! Core notebook types for sketchnote.
//!
//! This module defines the records kept in the note store: notebooks, the
//! notes nested inside them, and the helpers used to validate the email
//! addresses notebooks are shared with.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Title given to a freshly created notebook.
pub const DEFAULT_NOTEBOOK_TITLE: &str = "New Notebook";

/// Description given to a freshly created notebook.
pub const DEFAULT_NOTEBOOK_DESCRIPTION: &str = "Tap to add description";

/// Title given to a freshly created note.
pub const DEFAULT_NOTE_TITLE: &str = "New Note";

/// Content given to a freshly created note.
pub const DEFAULT_NOTE_CONTENT: &str = "Start writing...";

/// A notebook and its notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notebook {
    /// Identifier assigned by the store.
    pub id: i64,
    /// Display title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Identifier of the user who created the notebook.
    pub created_by: String,
    /// Lowercased email addresses the notebook is shared with.
    pub shared_with: Vec<String>,
    /// When the notebook was created.
    pub created_at: DateTime<Utc>,
    /// When the notebook or any of its notes last changed.
    pub last_modified: DateTime<Utc>,
    /// Notes in creation order.
    pub notes: Vec<Note>,
}

impl Notebook {
    /// Check whether the notebook is shared with `email` (case-insensitive).
    #[must_use]
    pub fn is_shared_with(&self, email: &str) -> bool {
        let email = normalize_email(email);
        self.shared_with.iter().any(|e| *e == email)
    }

    /// Find a note by id.
    #[must_use]
    pub fn note(&self, note_id: i64) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == note_id)
    }
}

/// A note inside a notebook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Identifier assigned by the store.
    pub id: i64,
    /// The notebook this note belongs to.
    pub notebook_id: i64,
    /// Display title.
    pub title: String,
    /// Text body.
    pub content: String,
    /// Serialized freehand drawing; empty when the note has none.
    pub drawing: String,
    /// BLAKE3 hash of `drawing`.
    pub drawing_hash: String,
    /// When the note was created.
    pub created_at: DateTime<Utc>,
    /// When the note last changed.
    pub last_modified: DateTime<Utc>,
}

impl Note {
    /// Compute the BLAKE3 hash of a serialized drawing.
    #[must_use]
    pub fn compute_drawing_hash(drawing: &str) -> String {
        blake3::hash(drawing.as_bytes()).to_hex().to_string()
    }

    /// Check whether the note carries a drawing.
    #[must_use]
    pub fn has_drawing(&self) -> bool {
        !self.drawing.trim().is_empty()
    }
}

/// Canonical form of an email address: trimmed and lowercased.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Loose syntactic check of an email address.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex pattern"));
    re.is_match(email.trim())
}
