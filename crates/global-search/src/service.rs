//! Search facade.
//!
//! [`GlobalSearch`] owns one controller and one coordinator over shared
//! settings, session and error state, and tracks whether the search UI is
//! open.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::activity::ActivityKind;
use crate::backend::{DriveSource, IndexBackend};
use crate::constants::EVENT_BUS_CAPACITY;
use crate::controller::{ControllerState, SearchSessionController};
use crate::coordinator::QueryCoordinator;
use crate::error::ErrorSlot;
use crate::events::{EventBus, SearchEvent};
use crate::priority::PriorityPathSource;
use crate::session::SearchSession;
use crate::settings::GlobalSearchSettings;
use crate::types::{ScoredEntry, SessionStatus};

pub struct GlobalSearch {
    controller: SearchSessionController,
    coordinator: QueryCoordinator,
    errors: ErrorSlot,
    bus: EventBus,
    query: Mutex<String>,
    is_open: AtomicBool,
}

impl GlobalSearch {
    pub fn new(
        backend: Arc<dyn IndexBackend>,
        drives: Arc<dyn DriveSource>,
        priority: Arc<dyn PriorityPathSource>,
        settings: GlobalSearchSettings,
    ) -> Self {
        let settings = settings.into_shared();
        let session = SearchSession::shared();
        let errors = ErrorSlot::new();
        let bus = EventBus::new(EVENT_BUS_CAPACITY);

        let controller = SearchSessionController::new(
            Arc::clone(&backend),
            drives,
            Arc::clone(&settings),
            Arc::clone(&session),
            errors.clone(),
            bus.clone(),
        );
        let coordinator = QueryCoordinator::new(
            backend,
            priority,
            settings,
            session,
            errors.clone(),
            bus.clone(),
        );

        Self {
            controller,
            coordinator,
            errors,
            bus,
            query: Mutex::new(String::new()),
            is_open: AtomicBool::new(false),
        }
    }

    /// Initializes the session and starts watching the drive list.
    pub async fn init(&self) {
        self.controller.init().await;
        self.controller.start_drive_watch();
    }

    pub fn shutdown(&self) {
        self.coordinator.cancel_pending();
        self.controller.shutdown();
    }

    pub async fn open(&self) {
        self.is_open.store(true, Ordering::SeqCst);
        self.controller.set_ui_open(true);
        self.controller.refresh_status().await;
        self.controller.start_status_polling();
    }

    /// Cancels the pending search. Polling keeps running while a scan or
    /// commit is in progress.
    pub fn close(&self) {
        self.is_open.store(false, Ordering::SeqCst);
        self.controller.set_ui_open(false);
        self.coordinator.cancel_pending();
        if !self.controller.is_active() {
            self.controller.stop_status_polling();
        }
    }

    pub async fn toggle(&self) {
        if self.is_open() {
            self.close();
        } else {
            self.open().await;
        }
    }

    pub fn is_open(&self) -> bool {
        self.is_open.load(Ordering::SeqCst)
    }

    /// Stores the query and schedules a search for it.
    pub fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        *self.query.lock() = query.clone();
        self.coordinator.submit(query);
    }

    pub fn query(&self) -> String {
        self.query.lock().clone()
    }

    pub fn clear_query(&self) {
        self.query.lock().clear();
        self.coordinator.clear();
    }

    pub fn results(&self) -> Vec<ScoredEntry> {
        self.coordinator.results()
    }

    pub fn is_searching(&self) -> bool {
        self.coordinator.is_searching()
    }

    pub fn record_activity(&self, kind: ActivityKind) {
        self.controller.record_activity(kind);
    }

    pub fn last_error(&self) -> Option<String> {
        self.errors.get()
    }

    pub fn state(&self) -> ControllerState {
        self.controller.state()
    }

    pub fn status(&self) -> SessionStatus {
        self.controller.status()
    }

    pub async fn update_settings(&self, settings: GlobalSearchSettings) {
        self.controller.update_settings(settings).await;
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SearchEvent> {
        self.bus.subscribe()
    }

    pub fn controller(&self) -> &SearchSessionController {
        &self.controller
    }

    pub fn coordinator(&self) -> &QueryCoordinator {
        &self.coordinator
    }
}
