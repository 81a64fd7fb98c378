//! User activity tracking for idle detection.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::constants::IDLE_THRESHOLD;

/// Input events that count as user activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    PointerMove,
    PointerDown,
    KeyDown,
    TouchStart,
    Scroll,
    Wheel,
}

impl ActivityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PointerMove => "pointer_move",
            Self::PointerDown => "pointer_down",
            Self::KeyDown => "key_down",
            Self::TouchStart => "touch_start",
            Self::Scroll => "scroll",
            Self::Wheel => "wheel",
        }
    }
}

/// Last-activity timestamp shared between the input layer and the controller.
#[derive(Debug, Clone)]
pub struct ActivityTracker {
    last_activity: Arc<Mutex<Instant>>,
    threshold: Duration,
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self::with_threshold(IDLE_THRESHOLD)
    }

    pub fn with_threshold(threshold: Duration) -> Self {
        Self {
            last_activity: Arc::new(Mutex::new(Instant::now())),
            threshold,
        }
    }

    pub fn record(&self, kind: ActivityKind) {
        tracing::trace!("user activity kind={}", kind.as_str());
        *self.last_activity.lock() = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_activity.lock().elapsed()
    }

    /// Idle once strictly more than the threshold has passed.
    pub fn is_idle(&self) -> bool {
        self.idle_for() > self.threshold
    }
}

impl Default for ActivityTracker {
    fn default() -> Self {
        Self::new()
    }
}
