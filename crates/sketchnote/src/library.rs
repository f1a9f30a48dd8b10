//! Loading a user's library: the notebooks they own and the notebooks
//! shared with them.
//!
//! Both lists are fetched concurrently. Each fetch reports to a
//! [`LoadBarrier`], so one failing source never holds back the other.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::loading::{LoadBarrier, LoadSummary};
use crate::notebook::Notebook;
use crate::store::NoteStore;

/// Barrier source index for the user's own notebooks.
pub const OWNED_SOURCE: usize = 0;

/// Barrier source index for notebooks shared with the user.
pub const SHARED_SOURCE: usize = 1;

const SOURCES: usize = 2;

/// The notebooks visible to a user.
#[derive(Debug, Clone)]
pub struct Library {
    /// Notebooks the user created. Empty if that source failed.
    pub owned: Vec<Notebook>,
    /// Notebooks shared with the user's email. Empty if that source failed
    /// or the user has no email.
    pub shared: Vec<Notebook>,
    /// Per-source outcomes.
    pub summary: LoadSummary,
}

impl Library {
    /// Total number of notebooks loaded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.owned.len() + self.shared.len()
    }

    /// Check if no notebooks were loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Loads a [`Library`] from a [`NoteStore`].
///
/// Every load reports to its own [`LoadBarrier`], so reloading reflects the
/// outcomes of that load only.
#[derive(Clone)]
pub struct LibraryLoader {
    store: Arc<dyn NoteStore>,
    user_id: String,
    email: Option<String>,
}

impl std::fmt::Debug for LibraryLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryLoader")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl LibraryLoader {
    /// Create a loader for `user_id`, optionally including notebooks shared
    /// with `email`.
    #[must_use]
    pub fn new(store: Arc<dyn NoteStore>, user_id: impl Into<String>, email: Option<String>) -> Self {
        Self {
            store,
            user_id: user_id.into(),
            email,
        }
    }

    /// A fresh barrier shaped for one load, for callers that want to observe
    /// progress through [`LibraryLoader::load_with`].
    #[must_use]
    pub fn barrier() -> LoadBarrier {
        LoadBarrier::new(SOURCES)
    }

    /// Fetch both sources concurrently and wait for both to report.
    ///
    /// # Errors
    ///
    /// Source failures are recorded in [`Library::summary`], not returned.
    /// An error is returned only if the barrier itself fails.
    pub async fn load(&self) -> Result<Library> {
        self.load_with(Self::barrier()).await
    }

    /// Like [`LibraryLoader::load`], reporting to a caller-supplied barrier.
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error if `barrier` does not have exactly one
    /// slot per source or already holds reports, and otherwise fails only if
    /// the barrier itself fails.
    pub async fn load_with(&self, barrier: LoadBarrier) -> Result<Library> {
        if barrier.sources() != SOURCES || barrier.remaining() != SOURCES {
            return Err(Error::invalid_input(format!(
                "library load needs an unused barrier with {SOURCES} sources"
            )));
        }
        debug!("Loading library for {}", self.user_id);

        let owned_task = {
            let store = Arc::clone(&self.store);
            let barrier = barrier.clone();
            let user_id = self.user_id.clone();
            tokio::spawn(async move {
                let result = store.list_owned(&user_id).await;
                barrier.report_result(OWNED_SOURCE, &result);
                result
            })
        };

        let shared_task = {
            let store = Arc::clone(&self.store);
            let barrier = barrier.clone();
            let email = self.email.clone();
            tokio::spawn(async move {
                let result = match email {
                    Some(email) => store.list_shared_with(&email).await,
                    None => Ok(Vec::new()),
                };
                barrier.report_result(SHARED_SOURCE, &result);
                result
            })
        };

        let owned = collect(&barrier, OWNED_SOURCE, owned_task.await);
        let shared = collect(&barrier, SHARED_SOURCE, shared_task.await);
        let summary = barrier.wait().await?;

        info!(
            "Loaded {} owned and {} shared notebooks",
            owned.len(),
            shared.len()
        );
        Ok(Library {
            owned,
            shared,
            summary,
        })
    }
}

/// Unwrap a finished source task, reporting a panicked task as failed.
fn collect(
    barrier: &LoadBarrier,
    source: usize,
    joined: std::result::Result<Result<Vec<Notebook>>, tokio::task::JoinError>,
) -> Vec<Notebook> {
    match joined {
        Ok(Ok(notebooks)) => notebooks,
        Ok(Err(_)) => Vec::new(),
        Err(join_err) => {
            barrier.failed(source, join_err.to_string());
            Vec::new()
        }
    }
}
