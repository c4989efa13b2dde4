//! Bookkeeping of resources created during a scenario.

use std::future::Future;

use indexmap::IndexSet;
use serde::Serialize;
use tracing::{debug, warn};

use crate::client::{HarnessError, NormalizedResponse};

/// Identifiers of resources created by one scenario.
///
/// Ids are kept in insertion order and duplicates are coalesced. [`cleanup`](Self::cleanup)
/// deletes every tracked id, best effort, and always leaves the tracker empty.
#[derive(Debug, Default)]
pub struct ResourceTracker {
    ids: IndexSet<String>,
}

impl ResourceTracker {
    /// An empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an id; returns `false` if it was already tracked.
    pub fn track(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        debug!(%id, "tracking resource");
        self.ids.insert(id)
    }

    /// Forgets an id, e.g. after the scenario deleted the resource itself.
    pub fn untrack(&mut self, id: &str) -> bool {
        self.ids.shift_remove(id)
    }

    /// Returns `true` if the id is tracked.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Number of tracked ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` when nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Tracked ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Calls `delete` once for every tracked id.
    ///
    /// A non-2xx response or an error is logged as a warning and reported, never
    /// propagated. The tracker is empty afterwards, even if the returned future is
    /// dropped before completion.
    pub async fn cleanup<F, Fut>(&mut self, mut delete: F) -> CleanupReport
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<NormalizedResponse, HarnessError>>,
    {
        let ids = std::mem::take(&mut self.ids);
        let mut report = CleanupReport::default();

        for id in ids {
            match delete(id.clone()).await {
                Ok(response) if response.is_success() => {
                    debug!(%id, "resource deleted");
                    report.deleted.push(id);
                }
                Ok(response) => {
                    let status = response.status();
                    warn!(%id, %status, "cleanup did not delete resource");
                    report.failures.push(CleanupFailure {
                        id,
                        reason: format!("status {status}"),
                    });
                }
                Err(error) => {
                    warn!(%id, %error, "cleanup failed");
                    report.failures.push(CleanupFailure {
                        id,
                        reason: error.to_string(),
                    });
                }
            }
        }

        report
    }
}

impl Drop for ResourceTracker {
    fn drop(&mut self) {
        if !self.ids.is_empty() {
            warn!(ids = ?self.ids, "resource tracker dropped without cleanup, resources leaked");
        }
    }
}

/// What [`ResourceTracker::cleanup`] did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    /// Ids deleted, in deletion order.
    pub deleted: Vec<String>,
    /// Ids the cleanup could not delete.
    pub failures: Vec<CleanupFailure>,
}

impl CleanupReport {
    /// Returns `true` when every tracked resource was deleted.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A resource the cleanup could not delete.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupFailure {
    /// Id of the resource left behind.
    pub id: String,
    /// Transport error or unexpected status.
    pub reason: String,
}
