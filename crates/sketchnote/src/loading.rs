//! A completion barrier over a fixed set of independent loaders.
//!
//! Each source reports exactly once, either ready or failed. The barrier
//! completes when every source has reported, regardless of how many failed.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// How a source finished loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    /// The source loaded successfully.
    Ready,
    /// The source failed with the given message.
    Failed(String),
}

impl SourceOutcome {
    /// Check if this outcome is a failure.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[derive(Debug)]
struct BarrierState {
    outcomes: Vec<Option<SourceOutcome>>,
}

impl BarrierState {
    fn remaining(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_none()).count()
    }
}

/// Outcomes of every source, indexed by source number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    outcomes: Vec<SourceOutcome>,
}

impl LoadSummary {
    /// Outcome of a single source.
    #[must_use]
    pub fn outcome(&self, source: usize) -> Option<&SourceOutcome> {
        self.outcomes.get(source)
    }

    /// Failed sources with their messages.
    #[must_use]
    pub fn failures(&self) -> Vec<(usize, &str)> {
        self.outcomes
            .iter()
            .enumerate()
            .filter_map(|(i, o)| match o {
                SourceOutcome::Failed(msg) => Some((i, msg.as_str())),
                SourceOutcome::Ready => None,
            })
            .collect()
    }

    /// Check if every source loaded successfully.
    #[must_use]
    pub fn all_ready(&self) -> bool {
        self.outcomes.iter().all(|o| !o.is_failed())
    }
}

/// Cloneable handle to a shared load barrier.
#[derive(Debug, Clone)]
pub struct LoadBarrier {
    state: Arc<watch::Sender<BarrierState>>,
}

impl LoadBarrier {
    /// Create a barrier waiting on `sources` loaders.
    #[must_use]
    pub fn new(sources: usize) -> Self {
        let (tx, _rx) = watch::channel(BarrierState {
            outcomes: vec![None; sources],
        });
        Self {
            state: Arc::new(tx),
        }
    }

    /// Number of sources the barrier waits on.
    #[must_use]
    pub fn sources(&self) -> usize {
        self.state.borrow().outcomes.len()
    }

    /// Number of sources that have not reported yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.state.borrow().remaining()
    }

    /// Check whether every source has reported.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    /// Report that `source` loaded. Returns `false` if it had already
    /// reported or does not exist.
    pub fn ready(&self, source: usize) -> bool {
        self.report(source, SourceOutcome::Ready)
    }

    /// Report that `source` failed. Returns `false` if it had already
    /// reported or does not exist.
    pub fn failed(&self, source: usize, message: impl Into<String>) -> bool {
        self.report(source, SourceOutcome::Failed(message.into()))
    }

    /// Report the result of a load for `source`.
    pub fn report_result<T>(&self, source: usize, result: &Result<T>) -> bool {
        match result {
            Ok(_) => self.ready(source),
            Err(err) => self.failed(source, err.to_string()),
        }
    }

    fn report(&self, source: usize, outcome: SourceOutcome) -> bool {
        let accepted = self.state.send_if_modified(|state| match state.outcomes.get_mut(source) {
            Some(slot @ None) => {
                if let SourceOutcome::Failed(msg) = &outcome {
                    warn!("Load source {} failed: {}", source, msg);
                }
                *slot = Some(outcome);
                true
            }
            _ => false,
        });

        if accepted {
            debug!("Load source {} reported, {} remaining", source, self.remaining());
        } else {
            debug!("Ignoring repeat or unknown report from source {}", source);
        }
        accepted
    }

    /// Wait until every source has reported.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the barrier state is torn down while
    /// waiting.
    pub async fn wait(&self) -> Result<LoadSummary> {
        let mut rx = self.state.subscribe();
        let state = rx
            .wait_for(|state| state.remaining() == 0)
            .await
            .map_err(|_| Error::internal("load barrier closed"))?;

        Ok(LoadSummary {
            outcomes: state.outcomes.iter().flatten().cloned().collect(),
        })
    }
}
