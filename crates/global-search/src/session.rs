//! Controller-owned mirror of the backend's index status.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;

use crate::types::SessionStatus;

pub type SharedSession = Arc<RwLock<SearchSession>>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSession {
    pub status: SessionStatus,
    pub is_initialized: bool,
    pub is_initializing: bool,
}

impl SearchSession {
    pub fn shared() -> SharedSession {
        Arc::new(RwLock::new(Self::default()))
    }

    pub fn is_scanning(&self) -> bool {
        self.status.is_scan_in_progress
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Share of drives scanned so far, as a whole percentage.
    pub fn scan_progress(&self) -> u32 {
        let total = self.status.total_drive_count;
        if total == 0 {
            return 0;
        }
        let scanned = self.status.scanned_drive_count.min(total);
        (f64::from(scanned) / f64::from(total) * 100.0).round() as u32
    }

    /// Whether the index has to be built before queries are useful.
    pub fn needs_scan(&self) -> bool {
        if self.status.is_scan_in_progress {
            return false;
        }
        !self.status.is_index_valid || self.status.indexed_item_count == 0
    }

    /// Whether the index is older than `period_minutes` at `now_ms`, or has
    /// never produced a usable result.
    pub fn is_stale(&self, now_ms: u64, period_minutes: u64) -> bool {
        let Some(last_scan_time) = self.status.last_scan_time else {
            return true;
        };
        if !self.status.is_index_valid || self.status.indexed_item_count == 0 {
            return true;
        }
        let threshold_ms = period_minutes.saturating_mul(60 * 1000);
        now_ms.saturating_sub(last_scan_time) > threshold_ms
    }
}

pub(crate) fn unix_now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
