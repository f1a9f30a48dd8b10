//! Debounced autosave.
//!
//! A [`Debouncer`] holds at most one pending delayed task. Scheduling a new
//! task aborts the pending one and restarts the delay, so a burst of edits
//! produces a single save once the edits pause. Dropping the debouncer
//! cancels whatever is pending.

use std::future::Future;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::error::Result;

/// Default delay between the last edit and the save it triggers.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(700);

#[derive(Debug)]
struct Pending {
    handle: JoinHandle<()>,
    fire_now: oneshot::Sender<()>,
}

/// A cancellable, restartable delayed task.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<Pending>,
}

impl Debouncer {
    /// Create a debouncer with the given delay.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// The configured delay.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `task` after the delay, replacing any task still pending.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.cancel() {
            trace!("Debounce restarted");
        }

        let delay = self.delay;
        let (fire_now, fire_rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = fire_rx => {}
                () = tokio::time::sleep(delay) => {}
            }
            task.await;
        });

        self.pending = Some(Pending { handle, fire_now });
    }

    /// Abort the pending task, if any. Returns `true` if one was pending.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) if !pending.handle.is_finished() => {
                pending.handle.abort();
                true
            }
            _ => false,
        }
    }

    /// Check whether a task is scheduled and has not completed.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| !p.handle.is_finished())
    }

    /// Run the pending task now, without waiting out the delay, and wait for
    /// it to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the task panicked.
    pub async fn flush(&mut self) -> Result<()> {
        if let Some(pending) = self.pending.take() {
            // The task may already be past the delay; a closed channel is fine.
            let _ = pending.fire_now.send(());
            pending.handle.await?;
        }
        Ok(())
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
        }
    }
}
