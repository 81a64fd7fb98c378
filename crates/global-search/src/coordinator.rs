//! Query coordinator.
//!
//! Debounces query input, runs the bulk index query and the priority-path
//! query side by side, then merges them into one ranked result list. Only the
//! newest execution may write results; older ones are cancelled through their
//! [`CancellationToken`].

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::backend::IndexBackend;
use crate::cancel::QueryVersions;
use crate::constants::QUERY_DEBOUNCE;
use crate::error::ErrorSlot;
use crate::events::{EventBus, SearchEvent};
use crate::priority::PriorityPathSource;
use crate::session::SharedSession;
use crate::settings::SharedSettings;
use crate::timer::Timer;
use crate::types::ScoredEntry;

#[derive(Debug, Default)]
struct QueryState {
    results: Vec<ScoredEntry>,
    is_searching: bool,
}

struct CoordinatorInner {
    backend: Arc<dyn IndexBackend>,
    priority: Arc<dyn PriorityPathSource>,
    settings: SharedSettings,
    session: SharedSession,
    errors: ErrorSlot,
    bus: EventBus,
    debounce: Timer,
    versions: QueryVersions,
    state: Mutex<QueryState>,
}

#[derive(Clone)]
pub struct QueryCoordinator {
    inner: Arc<CoordinatorInner>,
}

impl QueryCoordinator {
    pub fn new(
        backend: Arc<dyn IndexBackend>,
        priority: Arc<dyn PriorityPathSource>,
        settings: SharedSettings,
        session: SharedSession,
        errors: ErrorSlot,
        bus: EventBus,
    ) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                backend,
                priority,
                settings,
                session,
                errors,
                bus,
                debounce: Timer::new(),
                versions: QueryVersions::new(),
                state: Mutex::new(QueryState::default()),
            }),
        }
    }

    /// Schedules `query` to run after the debounce period, cancelling any
    /// pending or running execution.
    pub fn submit(&self, query: impl Into<String>) {
        let query = query.into();
        self.cancel_pending();

        let this = self.clone();
        self.inner.debounce.arm(QUERY_DEBOUNCE, async move {
            this.execute(&query).await;
        });
    }

    /// Runs `query` now.
    pub async fn execute(&self, query: &str) {
        let text = query.trim();
        if text.is_empty() {
            self.publish_results(text, Vec::new());
            return;
        }

        let token = self.inner.versions.next_token();
        let skip_bulk = self.inner.session.read().status.indexed_item_count == 0;
        let paths = self.inner.priority.priority_paths();
        let options = self.inner.settings.read().query_options();
        self.inner.state.lock().is_searching = true;

        tracing::debug!(
            "global search query version={} priority_paths={} skip_bulk={}",
            token.version(),
            paths.len(),
            skip_bulk,
        );

        let backend = &self.inner.backend;
        let bulk = async {
            if skip_bulk {
                Ok(Vec::new())
            } else {
                backend.query(text, &options, &token).await
            }
        };
        let priority = async {
            if paths.is_empty() {
                Ok(Vec::new())
            } else {
                backend.query_paths(&paths, text, &options, &token).await
            }
        };
        let (bulk, priority) = tokio::join!(bulk, priority);

        if token.is_cancelled() {
            tracing::debug!("global search query superseded version={}", token.version());
            return;
        }
        self.inner.state.lock().is_searching = false;

        match (priority, bulk) {
            (Ok(priority), Ok(bulk)) => {
                let merged = merge_results(priority, bulk);
                self.inner.errors.clear();
                self.publish_results(text, merged);
            }
            (Err(error), _) | (_, Err(error)) => {
                if error.is_superseded() {
                    return;
                }
                tracing::warn!("global search query failed: {}", error);
                self.inner.errors.record(&error);
                let _ = self.inner.bus.publish(SearchEvent::ErrorRecorded {
                    message: error.to_string(),
                });
                self.publish_results(text, Vec::new());
            }
        }
    }

    /// Drops the pending debounce and supersedes any running execution.
    pub fn cancel_pending(&self) {
        self.inner.debounce.cancel();
        self.inner.versions.cancel_all();
        self.inner.state.lock().is_searching = false;
    }

    /// Cancels pending work and empties the results.
    pub fn clear(&self) {
        self.cancel_pending();
        self.publish_results("", Vec::new());
    }

    pub fn results(&self) -> Vec<ScoredEntry> {
        self.inner.state.lock().results.clone()
    }

    pub fn is_searching(&self) -> bool {
        self.inner.state.lock().is_searching
    }

    /// Whether a debounced query is waiting or running.
    pub fn has_pending(&self) -> bool {
        self.inner.debounce.is_armed()
    }

    fn publish_results(&self, query: &str, results: Vec<ScoredEntry>) {
        self.inner.state.lock().results = results.clone();
        let _ = self.inner.bus.publish(SearchEvent::ResultsUpdated {
            query: query.to_string(),
            results,
        });
    }
}

/// Merges priority and bulk results.
///
/// Priority entries win on case-insensitive path collisions. The merged list is
/// stably sorted by descending score, with missing scores ranked as zero.
pub fn merge_results(priority: Vec<ScoredEntry>, bulk: Vec<ScoredEntry>) -> Vec<ScoredEntry> {
    let mut seen = HashSet::with_capacity(priority.len() + bulk.len());
    let mut merged: Vec<ScoredEntry> = priority
        .into_iter()
        .chain(bulk)
        .filter(|entry| seen.insert(entry.path.to_lowercase()))
        .collect();
    merged.sort_by(|a, b| b.rank().total_cmp(&a.rank()));
    merged
}
