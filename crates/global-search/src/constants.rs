//! Timing constants for polling, debouncing and idle detection.

use std::time::Duration;

/// Quiet period after the last query change before a query executes.
pub const QUERY_DEBOUNCE: Duration = Duration::from_millis(200);

/// Status poll interval while a scan or commit is running.
pub const POLL_INTERVAL_ACTIVE: Duration = Duration::from_millis(300);

/// Status poll interval otherwise.
pub const POLL_INTERVAL_IDLE: Duration = Duration::from_secs(5);

/// Inactivity after which the user counts as idle.
pub const IDLE_THRESHOLD: Duration = Duration::from_secs(60);

/// How often the idle rescan condition is evaluated.
pub const IDLE_CHECK_INTERVAL: Duration = Duration::from_secs(10);

/// Window that coalesces bursts of drive add/remove events.
pub const DRIVE_CHANGE_DEBOUNCE: Duration = Duration::from_secs(2);

/// How often the drive list is observed.
pub const DRIVE_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Upper bound on waiting for a cancelled scan to stop.
pub const CANCEL_WAIT: Duration = Duration::from_secs(5);

/// Status refresh interval while waiting for a cancelled scan.
pub const CANCEL_POLL_STEP: Duration = Duration::from_millis(100);

/// Default auto-scan period before an index counts as stale.
pub const DEFAULT_AUTO_SCAN_PERIOD_MINUTES: u64 = 60;

/// Default number of results requested per query.
pub const DEFAULT_RESULT_LIMIT: usize = 50;

/// Capacity of the event broadcast channel.
pub const EVENT_BUS_CAPACITY: usize = 64;
