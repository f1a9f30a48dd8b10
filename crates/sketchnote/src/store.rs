//! The asynchronous note store boundary.
//!
//! Host components (the note editor, the library loader) talk to storage
//! through [`NoteStore`] so that they can run on the tokio runtime and be
//! tested against any backing implementation. [`SharedStorage`] is the
//! implementation over the local `SQLite` [`Storage`].

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::notebook::{Note, Notebook};
use crate::storage::Storage;

/// Operations the host needs from a note store.
#[async_trait::async_trait]
pub trait NoteStore: Send + Sync {
    /// Load a note.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the note does not exist.
    async fn load_note(&self, notebook_id: i64, note_id: i64) -> Result<Note>;

    /// Persist a note's title and content.
    ///
    /// # Errors
    ///
    /// Returns an error if the note does not exist or the write fails.
    async fn save_text(
        &self,
        notebook_id: i64,
        note_id: i64,
        title: &str,
        content: &str,
    ) -> Result<()>;

    /// Persist a note's serialized drawing, returning whether it changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the note does not exist or the write fails.
    async fn save_drawing(&self, notebook_id: i64, note_id: i64, drawing: &str) -> Result<bool>;

    /// List the notebooks a user created.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    async fn list_owned(&self, user_id: &str) -> Result<Vec<Notebook>>;

    /// List the notebooks shared with an email address.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    async fn list_shared_with(&self, email: &str) -> Result<Vec<Notebook>>;
}

/// A cloneable, task-safe handle to a [`Storage`].
#[derive(Debug, Clone)]
pub struct SharedStorage {
    inner: Arc<Mutex<Storage>>,
}

impl SharedStorage {
    /// Wrap a storage instance.
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self {
            inner: Arc::new(Mutex::new(storage)),
        }
    }

    /// Lock the underlying storage for direct access.
    pub async fn lock(&self) -> tokio::sync::MutexGuard<'_, Storage> {
        self.inner.lock().await
    }
}

#[async_trait::async_trait]
impl NoteStore for SharedStorage {
    async fn load_note(&self, notebook_id: i64, note_id: i64) -> Result<Note> {
        self.inner
            .lock()
            .await
            .get_note(notebook_id, note_id)?
            .ok_or_else(|| Error::note_not_found(notebook_id, note_id))
    }

    async fn save_text(
        &self,
        notebook_id: i64,
        note_id: i64,
        title: &str,
        content: &str,
    ) -> Result<()> {
        debug!("Saving text of note {}/{}", notebook_id, note_id);
        self.inner
            .lock()
            .await
            .update_note_text(notebook_id, note_id, title, content)
    }

    async fn save_drawing(&self, notebook_id: i64, note_id: i64, drawing: &str) -> Result<bool> {
        self.inner
            .lock()
            .await
            .write_drawing(notebook_id, note_id, drawing)
    }

    async fn list_owned(&self, user_id: &str) -> Result<Vec<Notebook>> {
        self.inner.lock().await.list_owned(user_id)
    }

    async fn list_shared_with(&self, email: &str) -> Result<Vec<Notebook>> {
        self.inner.lock().await.list_shared_with(email)
    }
}
