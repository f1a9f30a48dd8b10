//! Editing session for a single note.
//!
//! A [`NoteEditor`] holds the editable title and content, a
//! [`StrokeCanvas`] seeded from the stored drawing, and a [`Debouncer`] that
//! writes text edits back to the store once typing pauses. The drawing is
//! never autosaved: canvas changes land in a pending buffer and reach the
//! store only through [`NoteEditor::save_drawing`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::autosave::{Debouncer, DEFAULT_DEBOUNCE};
use crate::canvas::{CanvasOptions, StrokeCanvas};
use crate::error::Result;
use crate::store::NoteStore;

/// Settings for an editing session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorOptions {
    /// Canvas construction settings.
    pub canvas: CanvasOptions,
    /// Quiet period before a text edit is saved.
    pub debounce: Duration,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            canvas: CanvasOptions::default(),
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// Title and content as last known to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TextSnapshot {
    title: String,
    content: String,
}

/// An open note.
pub struct NoteEditor {
    store: Arc<dyn NoteStore>,
    notebook_id: i64,
    note_id: i64,
    title: String,
    content: String,
    saved_text: Arc<watch::Sender<TextSnapshot>>,
    canvas: StrokeCanvas,
    pending_drawing: watch::Receiver<String>,
    saved_drawing: String,
    autosave: Debouncer,
}

impl std::fmt::Debug for NoteEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteEditor")
            .field("notebook_id", &self.notebook_id)
            .field("note_id", &self.note_id)
            .field("title", &self.title)
            .field("canvas", &self.canvas)
            .field("autosave", &self.autosave)
            .finish_non_exhaustive()
    }
}

impl NoteEditor {
    /// Load a note and open it for editing.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the note does not exist, or any error
    /// from the store.
    pub async fn open(
        store: Arc<dyn NoteStore>,
        notebook_id: i64,
        note_id: i64,
        options: EditorOptions,
    ) -> Result<Self> {
        let note = store.load_note(notebook_id, note_id).await?;
        debug!("Opened note {}/{}", notebook_id, note_id);

        let (drawing_tx, pending_drawing) = watch::channel(note.drawing.clone());
        let canvas = StrokeCanvas::new(&note.drawing, options.canvas).with_change_callback(
            move |serialized| {
                drawing_tx.send_replace(serialized.to_string());
            },
        );

        let (saved_text, _) = watch::channel(TextSnapshot {
            title: note.title.clone(),
            content: note.content.clone(),
        });

        Ok(Self {
            store,
            notebook_id,
            note_id,
            title: note.title,
            content: note.content,
            saved_text: Arc::new(saved_text),
            canvas,
            pending_drawing,
            saved_drawing: note.drawing,
            autosave: Debouncer::new(options.debounce),
        })
    }

    /// The note's notebook id.
    #[must_use]
    pub fn notebook_id(&self) -> i64 {
        self.notebook_id
    }

    /// The note id.
    #[must_use]
    pub fn note_id(&self) -> i64 {
        self.note_id
    }

    /// Current title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Current content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Edit the title and schedule an autosave.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.text_changed();
    }

    /// Edit the content and schedule an autosave.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.text_changed();
    }

    /// Check whether an autosave is waiting to run.
    #[must_use]
    pub fn is_autosave_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    /// Check whether the title or content differ from the stored note.
    #[must_use]
    pub fn has_unsaved_text(&self) -> bool {
        let saved = self.saved_text.borrow();
        saved.title != self.title || saved.content != self.content
    }

    /// Run any pending autosave immediately and wait for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the autosave task panicked. Store failures
    /// inside the autosave are logged.
    pub async fn flush_autosave(&mut self) -> Result<()> {
        self.autosave.flush().await
    }

    fn text_changed(&mut self) {
        if !self.has_unsaved_text() {
            if self.autosave.cancel() {
                debug!("Text back to stored value; autosave cancelled");
            }
            return;
        }

        let store = Arc::clone(&self.store);
        let saved_text = Arc::clone(&self.saved_text);
        let (notebook_id, note_id) = (self.notebook_id, self.note_id);
        let snapshot = TextSnapshot {
            title: self.title.clone(),
            content: self.content.clone(),
        };

        self.autosave.schedule(async move {
            match store
                .save_text(notebook_id, note_id, &snapshot.title, &snapshot.content)
                .await
            {
                Ok(()) => {
                    debug!("Autosaved note {}/{}", notebook_id, note_id);
                    saved_text.send_replace(snapshot);
                }
                Err(e) => error!("Autosave of note {}/{} failed: {}", notebook_id, note_id, e),
            }
        });
    }

    /// The canvas, for reading state and rendering.
    #[must_use]
    pub fn canvas(&self) -> &StrokeCanvas {
        &self.canvas
    }

    /// The canvas, for feeding pointer events and palette changes.
    pub fn canvas_mut(&mut self) -> &mut StrokeCanvas {
        &mut self.canvas
    }

    /// The latest serialized drawing reported by the canvas.
    #[must_use]
    pub fn pending_drawing(&self) -> String {
        self.pending_drawing.borrow().clone()
    }

    /// Check whether the canvas holds changes not yet saved.
    #[must_use]
    pub fn has_unsaved_drawing(&self) -> bool {
        *self.pending_drawing.borrow() != self.saved_drawing
    }

    /// Write the pending drawing to the store.
    ///
    /// Returns whether the stored value changed.
    ///
    /// # Errors
    ///
    /// Returns any error from the store; the pending drawing is kept so the
    /// save can be retried.
    pub async fn save_drawing(&mut self) -> Result<bool> {
        let snapshot = self.pending_drawing();
        let changed = self
            .store
            .save_drawing(self.notebook_id, self.note_id, &snapshot)
            .await?;
        info!(
            "Saved drawing for note {}/{} ({} strokes)",
            self.notebook_id,
            self.note_id,
            self.canvas.drawing().len()
        );
        self.saved_drawing = snapshot;
        Ok(changed)
    }

    /// End the session. A pending autosave is cancelled, not run.
    ///
    /// Returns `true` if an autosave was cancelled.
    pub fn close(mut self) -> bool {
        let cancelled = self.autosave.cancel();
        if cancelled {
            debug!(
                "Closed note {}/{} with an autosave pending",
                self.notebook_id, self.note_id
            );
        }
        cancelled
    }
}
