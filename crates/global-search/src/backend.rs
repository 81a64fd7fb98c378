//! Boundary traits for the index process and the drive list.

pub mod memory;

use async_trait::async_trait;

use crate::cancel::CancellationToken;
use crate::error::Result;
use crate::types::{DriveInfo, QueryOptions, ScanSettings, ScoredEntry, SessionStatus};

/// Request/response boundary to the process that builds and holds the index.
#[async_trait]
pub trait IndexBackend: Send + Sync {
    async fn init(&self) -> Result<SessionStatus>;

    async fn status(&self) -> Result<SessionStatus>;

    async fn start_scan(&self, settings: ScanSettings) -> Result<()>;

    async fn cancel_scan(&self) -> Result<()>;

    /// Queries the whole index.
    ///
    /// Implementations should stop early with `SearchError::Superseded` once
    /// `token` is cancelled.
    async fn query(
        &self,
        text: &str,
        options: &QueryOptions,
        token: &CancellationToken,
    ) -> Result<Vec<ScoredEntry>>;

    /// Queries only entries at or below `paths`.
    async fn query_paths(
        &self,
        paths: &[String],
        text: &str,
        options: &QueryOptions,
        token: &CancellationToken,
    ) -> Result<Vec<ScoredEntry>>;
}

/// Source of the currently mounted drives.
#[async_trait]
pub trait DriveSource: Send + Sync {
    async fn system_drives(&self) -> Result<Vec<DriveInfo>>;
}
