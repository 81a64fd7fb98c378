//! Scripted boundary fakes shared by the controller, coordinator and service
//! tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::backend::{DriveSource, IndexBackend};
use crate::cancel::CancellationToken;
use crate::error::{Result, SearchError};
use crate::priority::PriorityPathSource;
use crate::types::{DriveInfo, QueryOptions, ScanSettings, ScoredEntry, SessionStatus};

#[derive(Debug, Default)]
pub(crate) struct Calls {
    pub init: usize,
    pub status: usize,
    pub start_scan: Vec<ScanSettings>,
    pub cancel_scan: usize,
    pub queries: Vec<String>,
    pub path_queries: Vec<(Vec<String>, String)>,
}

/// Backend whose answers are set by the test.
#[derive(Debug, Default)]
pub(crate) struct ScriptedBackend {
    pub status: Mutex<SessionStatus>,
    pub calls: Mutex<Calls>,
    pub results: Mutex<Vec<ScoredEntry>>,
    pub path_results: Mutex<Vec<ScoredEntry>>,
    pub query_delay: Mutex<Duration>,
    /// How long `start_scan` takes before the scan shows as running.
    pub start_delay: Mutex<Duration>,
    pub fail_init: AtomicBool,
    pub fail_start: AtomicBool,
    pub fail_queries: AtomicBool,
    /// Scans keep running after a cancel request.
    pub ignore_cancel: AtomicBool,
}

impl ScriptedBackend {
    /// A backend with a valid, freshly scanned index.
    pub fn ready() -> Self {
        let backend = Self::default();
        *backend.status.lock() = SessionStatus {
            last_scan_time: Some(crate::session::unix_now_ms()),
            indexed_item_count: 100,
            index_size_bytes: 4096,
            is_index_valid: true,
            ..SessionStatus::default()
        };
        backend
    }

    /// A backend whose index was never built.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn set_scanning(&self, scanning: bool) {
        self.status.lock().is_scan_in_progress = scanning;
    }

    pub fn start_count(&self) -> usize {
        self.calls.lock().start_scan.len()
    }

    pub fn status_count(&self) -> usize {
        self.calls.lock().status
    }

    pub fn cancel_count(&self) -> usize {
        self.calls.lock().cancel_scan
    }

    pub fn last_scan(&self) -> Option<ScanSettings> {
        self.calls.lock().start_scan.last().cloned()
    }

    pub fn queries(&self) -> Vec<String> {
        self.calls.lock().queries.clone()
    }

    pub fn path_queries(&self) -> Vec<(Vec<String>, String)> {
        self.calls.lock().path_queries.clone()
    }

    fn failure(flag: &AtomicBool, message: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            Err(SearchError::Backend(message.to_string()))
        } else {
            Ok(())
        }
    }

    async fn delay(&self, token: &CancellationToken) -> Result<()> {
        let delay = *self.query_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        token.check()
    }
}

#[async_trait]
impl IndexBackend for ScriptedBackend {
    async fn init(&self) -> Result<SessionStatus> {
        self.calls.lock().init += 1;
        Self::failure(&self.fail_init, "index process unavailable")?;
        Ok(self.status.lock().clone())
    }

    async fn status(&self) -> Result<SessionStatus> {
        self.calls.lock().status += 1;
        Ok(self.status.lock().clone())
    }

    async fn start_scan(&self, settings: ScanSettings) -> Result<()> {
        self.calls.lock().start_scan.push(settings.clone());
        let delay = *self.start_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Self::failure(&self.fail_start, "scan rejected")?;
        let mut status = self.status.lock();
        status.is_scan_in_progress = true;
        status.total_drive_count = settings.drive_roots.len() as u32;
        status.scanned_drive_count = 0;
        Ok(())
    }

    async fn cancel_scan(&self) -> Result<()> {
        self.calls.lock().cancel_scan += 1;
        if !self.ignore_cancel.load(Ordering::SeqCst) {
            self.set_scanning(false);
        }
        Ok(())
    }

    async fn query(
        &self,
        text: &str,
        _options: &QueryOptions,
        token: &CancellationToken,
    ) -> Result<Vec<ScoredEntry>> {
        self.calls.lock().queries.push(text.to_string());
        self.delay(token).await?;
        Self::failure(&self.fail_queries, "query failed")?;
        Ok(self.results.lock().clone())
    }

    async fn query_paths(
        &self,
        paths: &[String],
        text: &str,
        _options: &QueryOptions,
        token: &CancellationToken,
    ) -> Result<Vec<ScoredEntry>> {
        self.calls
            .lock()
            .path_queries
            .push((paths.to_vec(), text.to_string()));
        self.delay(token).await?;
        Self::failure(&self.fail_queries, "query failed")?;
        Ok(self.path_results.lock().clone())
    }
}

/// Drive list the test can change.
#[derive(Debug, Default)]
pub(crate) struct StaticDrives {
    pub drives: Mutex<Vec<DriveInfo>>,
}

impl StaticDrives {
    pub fn new(paths: &[&str]) -> Self {
        let drives = Self::default();
        drives.set(paths);
        drives
    }

    pub fn set(&self, paths: &[&str]) {
        *self.drives.lock() = paths.iter().map(|path| DriveInfo::new(*path)).collect();
    }
}

#[async_trait]
impl DriveSource for StaticDrives {
    async fn system_drives(&self) -> Result<Vec<DriveInfo>> {
        Ok(self.drives.lock().clone())
    }
}

/// Fixed priority path list.
#[derive(Debug, Default)]
pub(crate) struct FixedPaths(pub Vec<String>);

impl PriorityPathSource for FixedPaths {
    fn priority_paths(&self) -> Vec<String> {
        self.0.clone()
    }
}

pub(crate) fn drives(paths: &[&str]) -> Vec<DriveInfo> {
    paths.iter().map(|path| DriveInfo::new(*path)).collect()
}
