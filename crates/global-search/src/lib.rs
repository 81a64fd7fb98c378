//! Global search session control.
//!
//! This crate drives an external filesystem index and turns it into live
//! search results:
//! - Scan lifecycle (init, start, cancel, drive changes, idle rescans)
//! - Adaptive status polling
//! - Debounced, cancellable queries merged with priority paths
//!
//! Scoring lives in the `fuzzy` crate. The index itself sits behind the
//! [`IndexBackend`] trait.

pub mod activity;
pub mod backend;
pub mod cancel;
pub mod constants;
pub mod controller;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod priority;
pub mod service;
pub mod session;
pub mod settings;
pub mod timer;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types
pub use activity::{ActivityKind, ActivityTracker};
pub use backend::memory::MemoryIndexBackend;
pub use backend::{DriveSource, IndexBackend};
pub use cancel::{CancellationToken, QueryVersions};
pub use controller::{ControllerState, SearchSessionController};
pub use coordinator::{merge_results, QueryCoordinator};
pub use error::{ErrorSlot, Result, SearchError};
pub use events::{EventBus, SearchEvent};
pub use priority::{PriorityPathSource, UserPaths};
pub use service::GlobalSearch;
pub use session::{SearchSession, SharedSession};
pub use settings::{GlobalSearchSettings, SharedSettings};
pub use timer::Timer;
pub use types::{DriveInfo, DriveScanError, QueryOptions, ScanSettings, ScoredEntry, SessionStatus};
