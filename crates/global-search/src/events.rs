use serde::Serialize;
use tokio::sync::broadcast;

use crate::types::{ScoredEntry, SessionStatus};

/// Notifications for whoever renders search state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchEvent {
    ResultsUpdated {
        query: String,
        results: Vec<ScoredEntry>,
    },
    StatusUpdated {
        status: SessionStatus,
    },
    ErrorRecorded {
        message: String,
    },
}

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SearchEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SearchEvent> {
        self.sender.subscribe()
    }

    pub fn publish(
        &self,
        event: SearchEvent,
    ) -> Result<usize, broadcast::error::SendError<SearchEvent>> {
        self.sender.send(event)
    }
}
