//! Scan session controller.
//!
//! Drives the external index through its lifecycle: one-shot init, manual and
//! automatic scans, cancellation, drive-list changes and adaptive status
//! polling. Every backend failure is recorded in the shared [`ErrorSlot`]
//! instead of being returned.
//!
//! Background work runs on one [`Timer`] per kind:
//! - status polling (300 ms while scanning or committing, 5 s otherwise)
//! - idle rescan check (every 10 s)
//! - drive-change debounce (2 s)
//! - drive-list watch (every 1 s)

use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::activity::{ActivityKind, ActivityTracker};
use crate::backend::{DriveSource, IndexBackend};
use crate::constants::{
    CANCEL_POLL_STEP, CANCEL_WAIT, DRIVE_CHANGE_DEBOUNCE, DRIVE_POLL_INTERVAL,
    IDLE_CHECK_INTERVAL, POLL_INTERVAL_ACTIVE, POLL_INTERVAL_IDLE,
};
use crate::error::{ErrorSlot, Result, SearchError};
use crate::events::{EventBus, SearchEvent};
use crate::session::{unix_now_ms, SearchSession, SharedSession};
use crate::settings::{GlobalSearchSettings, SharedSettings};
use crate::timer::Timer;
use crate::types::{DriveInfo, SessionStatus};

/// Controller state derived from the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerState {
    Uninitialized,
    Initializing,
    Idle,
    Scanning,
    Committing,
    Error,
}

impl ControllerState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Idle => "idle",
            Self::Scanning => "scanning",
            Self::Committing => "committing",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Default)]
struct DriveState {
    known_count: usize,
    present: Vec<DriveInfo>,
}

struct ControllerInner {
    backend: Arc<dyn IndexBackend>,
    drives: Arc<dyn DriveSource>,
    settings: SharedSettings,
    session: SharedSession,
    errors: ErrorSlot,
    bus: EventBus,
    activity: ActivityTracker,
    drive_state: Mutex<DriveState>,
    ui_open: AtomicBool,
    scan_requested: AtomicBool,
    polling: Timer,
    idle_check: Timer,
    drive_change: Timer,
    drive_watch: Timer,
}

/// Clears the pending-scan flag when a scan request finishes or is dropped.
struct PendingScan<'a>(&'a AtomicBool);

impl Drop for PendingScan<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Cheap to clone; clones share all state and timers.
#[derive(Clone)]
pub struct SearchSessionController {
    inner: Arc<ControllerInner>,
}

impl SearchSessionController {
    pub fn new(
        backend: Arc<dyn IndexBackend>,
        drives: Arc<dyn DriveSource>,
        settings: SharedSettings,
        session: SharedSession,
        errors: ErrorSlot,
        bus: EventBus,
    ) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                backend,
                drives,
                settings,
                session,
                errors,
                bus,
                activity: ActivityTracker::new(),
                drive_state: Mutex::new(DriveState::default()),
                ui_open: AtomicBool::new(false),
                scan_requested: AtomicBool::new(false),
                polling: Timer::new(),
                idle_check: Timer::new(),
                drive_change: Timer::new(),
                drive_watch: Timer::new(),
            }),
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Loads the initial status and starts idle detection. Runs once.
    ///
    /// Starts a scan when the index is unusable, or when it is stale and idle
    /// reindexing is enabled.
    pub async fn init(&self) {
        {
            let mut session = self.inner.session.write();
            if session.is_initialized || session.is_initializing {
                return;
            }
            session.is_initializing = true;
        }

        match self.inner.backend.init().await {
            Ok(status) => {
                tracing::info!(
                    "global search init indexed_items={} index_valid={} scanning={}",
                    status.indexed_item_count,
                    status.is_index_valid,
                    status.is_scan_in_progress,
                );
                self.apply_status(status);
                self.mark_initialized();
                self.inner.errors.clear();
                self.observe_initial_drives().await;
                self.start_idle_detection();

                if self.should_scan_on_init() {
                    self.start_scan().await;
                }
            }
            Err(error) => {
                self.mark_initialized();
                self.record_failure("init", &error);
                self.start_idle_detection();
            }
        }
    }

    /// Stops every background task.
    pub fn shutdown(&self) {
        self.inner.polling.cancel();
        self.inner.idle_check.cancel();
        self.inner.drive_change.cancel();
        self.inner.drive_watch.cancel();
        tracing::info!("global search controller shut down");
    }

    fn mark_initialized(&self) {
        let mut session = self.inner.session.write();
        session.is_initialized = true;
        session.is_initializing = false;
    }

    fn should_scan_on_init(&self) -> bool {
        let auto_reindex = self.inner.settings.read().auto_reindex_when_idle;
        self.needs_scan() || (auto_reindex && self.is_index_stale())
    }

    // ------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------

    pub async fn refresh_status(&self) {
        match self.inner.backend.status().await {
            Ok(status) => {
                self.apply_status(status);
                self.inner.errors.clear();
            }
            Err(error) => self.record_failure("status refresh", &error),
        }
    }

    fn apply_status(&self, status: SessionStatus) {
        self.inner.session.write().status = status.clone();
        let _ = self.inner.bus.publish(SearchEvent::StatusUpdated { status });
    }

    fn record_failure(&self, operation: &str, error: &dyn Display) {
        let message = error.to_string();
        tracing::warn!("global search {} failed: {}", operation, message);
        self.inner.errors.record(&message);
        let _ = self.inner.bus.publish(SearchEvent::ErrorRecorded { message });
    }

    pub fn state(&self) -> ControllerState {
        let session = self.inner.session.read();
        if session.is_initializing {
            ControllerState::Initializing
        } else if !session.is_initialized {
            ControllerState::Uninitialized
        } else if session.status.is_scan_in_progress {
            ControllerState::Scanning
        } else if session.status.is_committing {
            ControllerState::Committing
        } else if self.inner.errors.is_set() {
            ControllerState::Error
        } else {
            ControllerState::Idle
        }
    }

    pub fn session(&self) -> SearchSession {
        self.inner.session.read().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.inner.session.read().status.clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.session.read().is_initialized
    }

    pub fn is_scanning(&self) -> bool {
        self.inner.session.read().is_scanning()
    }

    /// Whether a scan or commit is running.
    pub fn is_active(&self) -> bool {
        self.inner.session.read().is_active()
    }

    pub fn needs_scan(&self) -> bool {
        self.inner.session.read().needs_scan()
    }

    pub fn scan_progress(&self) -> u32 {
        self.inner.session.read().scan_progress()
    }

    pub fn is_index_stale(&self) -> bool {
        let period = self.inner.settings.read().auto_scan_period_minutes;
        self.inner.session.read().is_stale(unix_now_ms(), period)
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.errors.get()
    }

    pub fn settings(&self) -> GlobalSearchSettings {
        self.inner.settings.read().clone()
    }

    // ------------------------------------------------------------------
    // Scans
    // ------------------------------------------------------------------

    /// Starts a scan of the selected drive roots, or of every system drive.
    ///
    /// Does nothing while a scan is running or being requested.
    pub async fn start_scan(&self) {
        self.run_scan_request(None, "start scan").await;
    }

    /// Issues one scan request unless a scan is running or already being
    /// requested. `roots` of `None` resolves them from settings and drives.
    async fn run_scan_request(&self, roots: Option<Vec<String>>, operation: &str) {
        if self.is_scanning() {
            tracing::debug!("global search {} skipped, scan already in progress", operation);
            return;
        }
        if self.inner.scan_requested.swap(true, Ordering::SeqCst) {
            tracing::debug!("global search {} skipped, scan request already pending", operation);
            return;
        }
        let pending = PendingScan(&self.inner.scan_requested);

        let result = self.request_scan(roots).await;
        drop(pending);

        if let Err(error) = result {
            self.inner.session.write().status.is_scan_in_progress = false;
            self.record_failure(operation, &error);
        }
    }

    async fn request_scan(&self, roots: Option<Vec<String>>) -> Result<()> {
        let roots = match roots {
            Some(roots) => roots,
            None => self.resolve_drive_roots().await?,
        };
        if roots.is_empty() {
            return Err(SearchError::NoDrivesAvailable);
        }

        let request = self.inner.settings.read().scan_settings(roots);
        tracing::info!(
            "global search scan start roots={:?} depth={} ignored={} parallel={}",
            request.drive_roots,
            request.scan_depth,
            request.ignored_paths.len(),
            request.parallel_scan,
        );

        // Poll first so the transition is observed even if the backend is slow
        // to acknowledge.
        self.restart_status_polling();
        self.inner.backend.start_scan(request).await?;
        self.refresh_status().await;
        self.inner.errors.clear();
        Ok(())
    }

    async fn resolve_drive_roots(&self) -> Result<Vec<String>> {
        let selected = self.inner.settings.read().selected_drive_roots.clone();
        if !selected.is_empty() {
            return Ok(selected);
        }
        let drives = self.inner.drives.system_drives().await?;
        Ok(drives.into_iter().map(|drive| drive.path).collect())
    }

    /// Requests cancellation, then waits up to 5 s for the scan to stop.
    pub async fn cancel_scan(&self) {
        if !self.is_scanning() {
            return;
        }

        tracing::info!("global search scan cancel requested");
        if let Err(error) = self.inner.backend.cancel_scan().await {
            self.record_failure("cancel scan", &error);
            return;
        }

        let mut waited = Duration::ZERO;
        while waited < CANCEL_WAIT {
            self.refresh_status().await;
            if !self.is_scanning() {
                tracing::info!("global search scan cancelled waited_ms={}", waited.as_millis());
                return;
            }
            tokio::time::sleep(CANCEL_POLL_STEP).await;
            waited += CANCEL_POLL_STEP;
        }
        tracing::warn!(
            "global search scan still running after cancel wait_ms={}",
            CANCEL_WAIT.as_millis()
        );
    }

    /// Applies new settings. A changed ignore list restarts the scan.
    pub async fn update_settings(&self, settings: GlobalSearchSettings) {
        let ignored_changed = {
            let mut current = self.inner.settings.write();
            let changed = current.ignored_paths != settings.ignored_paths;
            *current = settings;
            changed
        };

        if !ignored_changed || !self.is_initialized() {
            return;
        }

        tracing::info!("global search ignored paths changed, rescanning");
        if self.is_scanning() {
            self.cancel_scan().await;
        }
        self.start_scan().await;
    }

    // ------------------------------------------------------------------
    // Status polling
    // ------------------------------------------------------------------

    /// Starts the self-rescheduling status poll unless it is already running.
    ///
    /// Polling ends on its own once the UI is closed and nothing is running.
    pub fn start_status_polling(&self) {
        if !self.inner.polling.is_armed() {
            self.restart_status_polling();
        }
    }

    /// Starts a fresh polling chain, replacing one that may be sleeping on the
    /// idle interval.
    fn restart_status_polling(&self) {
        let this = self.clone();
        self.inner
            .polling
            .arm(Duration::ZERO, async move { this.poll_status().await });
    }

    pub fn stop_status_polling(&self) {
        self.inner.polling.cancel();
    }

    pub fn is_status_polling(&self) -> bool {
        self.inner.polling.is_armed()
    }

    /// Tells the controller whether search UI is showing.
    pub fn set_ui_open(&self, open: bool) {
        self.inner.ui_open.store(open, Ordering::SeqCst);
    }

    async fn poll_status(&self) {
        loop {
            self.refresh_status().await;

            let active = self.is_active();
            if !active
                && !self.inner.ui_open.load(Ordering::SeqCst)
                && !self.inner.scan_requested.load(Ordering::SeqCst)
            {
                tracing::debug!("global search status polling stopped");
                return;
            }

            // A request the backend has not acknowledged yet polls at the
            // active rate.
            let interval = if active || self.inner.scan_requested.load(Ordering::SeqCst) {
                POLL_INTERVAL_ACTIVE
            } else {
                POLL_INTERVAL_IDLE
            };
            tokio::time::sleep(interval).await;
        }
    }

    // ------------------------------------------------------------------
    // Idle detection
    // ------------------------------------------------------------------

    pub fn activity(&self) -> &ActivityTracker {
        &self.inner.activity
    }

    pub fn record_activity(&self, kind: ActivityKind) {
        self.inner.activity.record(kind);
    }

    pub fn is_user_idle(&self) -> bool {
        self.inner.activity.is_idle()
    }

    pub fn start_idle_detection(&self) {
        if self.inner.idle_check.is_armed() {
            return;
        }
        let this = self.clone();
        self.inner.idle_check.arm(IDLE_CHECK_INTERVAL, async move {
            loop {
                this.check_idle_reindex().await;
                tokio::time::sleep(IDLE_CHECK_INTERVAL).await;
            }
        });
    }

    pub fn stop_idle_detection(&self) {
        self.inner.idle_check.cancel();
    }

    pub fn is_idle_detection_running(&self) -> bool {
        self.inner.idle_check.is_armed()
    }

    /// Starts a rescan if reindexing is enabled, nothing is running, the index
    /// is stale and the user is idle. Returns whether a scan was requested.
    pub async fn check_idle_reindex(&self) -> bool {
        if !self.inner.settings.read().auto_reindex_when_idle {
            return false;
        }
        if self.is_scanning() || !self.is_initialized() {
            return false;
        }
        if !self.is_index_stale() || !self.is_user_idle() {
            return false;
        }

        tracing::info!(
            "global search idle rescan idle_secs={}",
            self.inner.activity.idle_for().as_secs()
        );
        self.start_scan().await;
        true
    }

    // ------------------------------------------------------------------
    // Drive changes
    // ------------------------------------------------------------------

    async fn observe_initial_drives(&self) {
        match self.inner.drives.system_drives().await {
            Ok(drives) => {
                let mut state = self.inner.drive_state.lock();
                state.known_count = drives.len();
                state.present = drives;
            }
            Err(error) => {
                tracing::warn!("global search drive list unavailable: {}", error);
            }
        }
    }

    /// Reacts to a new drive list observation.
    ///
    /// A changed count cancels any running scan and schedules a rescan of the
    /// present drives after a 2 s quiet period. The first observation after a
    /// zero count only records it.
    pub async fn handle_drive_list_change(&self, drives: &[DriveInfo]) {
        if !self.is_initialized() {
            return;
        }

        let count = drives.len();
        let previous = {
            let mut state = self.inner.drive_state.lock();
            let previous = state.known_count;
            state.known_count = count;
            state.present = drives.to_vec();
            previous
        };

        if previous == 0 {
            tracing::debug!("global search drive count recorded count={}", count);
            return;
        }
        if previous == count {
            return;
        }

        tracing::info!(
            "global search drive list changed previous={} current={}",
            previous,
            count
        );
        self.inner.drive_change.cancel();
        if self.is_scanning() {
            self.cancel_scan().await;
        }

        let this = self.clone();
        self.inner.drive_change.arm(DRIVE_CHANGE_DEBOUNCE, async move {
            this.start_scan_with_current_drives().await;
        });
    }

    /// Scans the drives seen in the latest observation, restricted to the
    /// selected roots when any are configured. Skipped while another scan is
    /// running or being requested.
    pub async fn start_scan_with_current_drives(&self) {
        if !self.is_initialized() {
            return;
        }

        let present = self.inner.drive_state.lock().present.clone();
        let roots: Vec<String> = {
            let settings = self.inner.settings.read();
            if settings.selected_drive_roots.is_empty() {
                present.iter().map(|drive| drive.path.clone()).collect()
            } else {
                settings
                    .selected_drive_roots
                    .iter()
                    .filter(|root| present.iter().any(|drive| &drive.path == *root))
                    .cloned()
                    .collect()
            }
        };

        if roots.is_empty() {
            tracing::debug!("global search drive rescan skipped, no present roots");
            return;
        }

        tracing::info!("global search drive rescan roots={:?}", roots);
        self.run_scan_request(Some(roots), "drive rescan").await;
    }

    /// Polls the drive source every second and feeds changes into
    /// [`Self::handle_drive_list_change`].
    pub fn start_drive_watch(&self) {
        if self.inner.drive_watch.is_armed() {
            return;
        }
        let this = self.clone();
        self.inner.drive_watch.arm(DRIVE_POLL_INTERVAL, async move {
            loop {
                match this.inner.drives.system_drives().await {
                    Ok(drives) => this.handle_drive_list_change(&drives).await,
                    Err(error) => {
                        tracing::warn!("global search drive list refresh failed: {}", error)
                    }
                }
                tokio::time::sleep(DRIVE_POLL_INTERVAL).await;
            }
        });
    }

    pub fn stop_drive_watch(&self) {
        self.inner.drive_watch.cancel();
    }
}
