//! `sketchnote` - notebooks of notes with freehand drawings
//!
//! The heart of the crate is the [`canvas`] module, which turns pointer events
//! into vector strokes with undo and a flat serialized form that is stored
//! alongside each note. Around it sit a local `SQLite` note store, the
//! asynchronous host pieces that edit and load notes, and the `sknote` CLI.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod autosave;
pub mod canvas;
pub mod cli;
pub mod config;
pub mod editor;
pub mod error;
pub mod library;
pub mod loading;
pub mod logging;
pub mod notebook;
pub mod script;
pub mod storage;
pub mod store;
pub mod user;

pub use autosave::Debouncer;
pub use canvas::{CanvasOptions, StrokeCanvas};
pub use config::Config;
pub use editor::{EditorOptions, NoteEditor};
pub use error::{Error, Result};
pub use library::{Library, LibraryLoader};
pub use loading::LoadBarrier;
pub use logging::init_logging;
pub use notebook::{Note, Notebook};
pub use storage::{Storage, StorageStats};
pub use store::{NoteStore, SharedStorage};
pub use user::User;
