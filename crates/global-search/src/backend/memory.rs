//! In-process index backend over a fixed list of entries.
//!
//! Scans complete only when [`MemoryIndexBackend::finish_scan`] is called, which
//! lets callers observe every scan state.

use async_trait::async_trait;
use fuzzy::{MatchEngine, MatchOptions};
use parking_lot::{Mutex, RwLock};

use super::IndexBackend;
use crate::cancel::CancellationToken;
use crate::error::{Result, SearchError};
use crate::session::unix_now_ms;
use crate::types::{QueryOptions, ScanSettings, ScoredEntry, SessionStatus};

#[derive(Debug, Default)]
pub struct MemoryIndexBackend {
    entries: RwLock<Vec<ScoredEntry>>,
    status: Mutex<SessionStatus>,
    last_scan: Mutex<Option<ScanSettings>>,
}

impl MemoryIndexBackend {
    /// Creates a backend whose index already holds `entries`.
    pub fn new(entries: Vec<ScoredEntry>) -> Self {
        let status = SessionStatus {
            indexed_item_count: entries.len() as u64,
            is_index_valid: !entries.is_empty(),
            last_scan_time: (!entries.is_empty()).then(unix_now_ms),
            ..SessionStatus::default()
        };
        Self {
            entries: RwLock::new(entries),
            status: Mutex::new(status),
            last_scan: Mutex::new(None),
        }
    }

    /// Replaces the indexed entries. Takes effect for status on the next
    /// finished scan.
    pub fn set_entries(&self, entries: Vec<ScoredEntry>) {
        *self.entries.write() = entries;
    }

    /// Settings of the most recent scan request.
    pub fn last_scan(&self) -> Option<ScanSettings> {
        self.last_scan.lock().clone()
    }

    /// Completes the running scan and publishes the new index size.
    pub fn finish_scan(&self) {
        let count = self.entries.read().len() as u64;
        let mut status = self.status.lock();
        status.is_scan_in_progress = false;
        status.is_committing = false;
        status.current_drive_root = None;
        status.scanned_drive_count = status.total_drive_count;
        status.indexed_item_count = count;
        status.is_index_valid = true;
        status.last_scan_time = Some(unix_now_ms());
    }

    fn search(
        &self,
        text: &str,
        options: &QueryOptions,
        token: &CancellationToken,
        within: Option<&[String]>,
    ) -> Result<Vec<ScoredEntry>> {
        token.check()?;

        let entries = self.entries.read();
        let candidates: Vec<&ScoredEntry> = entries
            .iter()
            .filter(|entry| {
                (entry.is_dir && options.include_directories)
                    || (!entry.is_dir && options.include_files)
            })
            .filter(|entry| within.is_none_or(|roots| is_within_any(&entry.path, roots)))
            .collect();
        let paths: Vec<&str> = candidates.iter().map(|entry| entry.path.as_str()).collect();

        let engine = MatchEngine::new(MatchOptions {
            exact_match: options.exact_match,
            increased_typo_tolerance: options.typo_tolerance,
            ..MatchOptions::default()
        });
        let matches = engine.search(&paths, text);
        token.check()?;

        // Matches come back in candidate order, so walk both lists together.
        let mut results = Vec::with_capacity(matches.len());
        let mut remaining = candidates.iter();
        for scored in matches {
            let Some(entry) = remaining.find(|entry| entry.path == scored.path) else {
                return Err(SearchError::Query(format!(
                    "match for unknown path {}",
                    scored.path
                )));
            };
            if options
                .min_score_threshold
                .is_some_and(|threshold| scored.score < threshold)
            {
                continue;
            }
            results.push((*entry).clone().with_score(scored.score));
        }

        results.sort_by(|a, b| b.rank().total_cmp(&a.rank()));
        results.truncate(options.limit);
        Ok(results)
    }
}

#[async_trait]
impl IndexBackend for MemoryIndexBackend {
    async fn init(&self) -> Result<SessionStatus> {
        Ok(self.status.lock().clone())
    }

    async fn status(&self) -> Result<SessionStatus> {
        Ok(self.status.lock().clone())
    }

    async fn start_scan(&self, settings: ScanSettings) -> Result<()> {
        if settings.drive_roots.is_empty() {
            return Err(SearchError::NoDrivesAvailable);
        }

        let mut status = self.status.lock();
        if status.is_scan_in_progress {
            return Err(SearchError::Backend("scan already in progress".to_string()));
        }
        status.is_scan_in_progress = true;
        status.is_parallel_scan = settings.parallel_scan;
        status.current_drive_root = settings.drive_roots.first().cloned();
        status.total_drive_count = settings.drive_roots.len() as u32;
        status.scanned_drive_count = 0;
        status.drive_scan_errors.clear();
        drop(status);

        *self.last_scan.lock() = Some(settings);
        Ok(())
    }

    async fn cancel_scan(&self) -> Result<()> {
        let mut status = self.status.lock();
        status.is_scan_in_progress = false;
        status.current_drive_root = None;
        Ok(())
    }

    async fn query(
        &self,
        text: &str,
        options: &QueryOptions,
        token: &CancellationToken,
    ) -> Result<Vec<ScoredEntry>> {
        self.search(text, options, token, None)
    }

    async fn query_paths(
        &self,
        paths: &[String],
        text: &str,
        options: &QueryOptions,
        token: &CancellationToken,
    ) -> Result<Vec<ScoredEntry>> {
        self.search(text, options, token, Some(paths))
    }
}

/// Case-insensitive check that `path` equals or lies below one of `roots`.
fn is_within_any(path: &str, roots: &[String]) -> bool {
    let path = path.to_lowercase();
    roots.iter().any(|root| {
        let root = root.trim_end_matches(['/', '\\']).to_lowercase();
        match path.strip_prefix(root.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with(['/', '\\']),
            None => false,
        }
    })
}
