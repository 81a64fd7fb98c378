use std::sync::Arc;

use parking_lot::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("No drives available for scanning")]
    NoDrivesAvailable,

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Query superseded")]
    Superseded,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings error: {0}")]
    Settings(String),
}

impl SearchError {
    /// Whether the failure only means a newer query took over.
    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded)
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(error: serde_json::Error) -> Self {
        Self::Settings(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;

/// Last recorded failure, shared by the controller and the coordinator.
#[derive(Debug, Clone, Default)]
pub struct ErrorSlot {
    last: Arc<Mutex<Option<String>>>,
}

impl ErrorSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, error: impl ToString) {
        *self.last.lock() = Some(error.to_string());
    }

    pub fn clear(&self) {
        *self.last.lock() = None;
    }

    pub fn get(&self) -> Option<String> {
        self.last.lock().clone()
    }

    pub fn is_set(&self) -> bool {
        self.last.lock().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_is_shared_between_clones() {
        let slot = ErrorSlot::new();
        let other = slot.clone();
        slot.record(SearchError::NoDrivesAvailable);
        assert_eq!(other.get().as_deref(), Some("No drives available for scanning"));
        other.clear();
        assert!(!slot.is_set());
    }

    #[test]
    fn json_errors_become_settings_errors() {
        let error: SearchError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(error, SearchError::Settings(_)));
        assert!(!error.is_superseded());
        assert!(SearchError::Superseded.is_superseded());
    }
}
