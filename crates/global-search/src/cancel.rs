//! Cancellation tokens for query executions.
//!
//! Every query execution takes a token from [`QueryVersions`]. Issuing a new
//! version supersedes all older tokens, so backends only need to check their
//! token between awaits.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{Result, SearchError};

/// Tracks the active query version.
#[derive(Debug, Clone, Default)]
pub struct QueryVersions {
    active_version: Arc<AtomicU64>,
}

impl QueryVersions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the active version and returns it.
    ///
    /// Tokens for older versions report as cancelled from now on.
    pub fn next_version(&self) -> u64 {
        self.active_version.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current_version(&self) -> u64 {
        self.active_version.load(Ordering::SeqCst)
    }

    pub fn token_for_version(&self, version: u64) -> CancellationToken {
        CancellationToken {
            active_version: Arc::clone(&self.active_version),
            version,
        }
    }

    /// Starts a new version and returns its token.
    pub fn next_token(&self) -> CancellationToken {
        let version = self.next_version();
        self.token_for_version(version)
    }

    /// Supersedes every outstanding token.
    pub fn cancel_all(&self) {
        self.next_version();
    }
}

/// A cancellation token handed to query boundary calls.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    active_version: Arc<AtomicU64>,
    version: u64,
}

impl CancellationToken {
    /// A token that is never cancelled.
    pub fn noop() -> Self {
        Self {
            active_version: Arc::new(AtomicU64::new(0)),
            version: 0,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.version != self.active_version.load(Ordering::SeqCst)
    }

    /// Returns `SearchError::Superseded` once cancelled, for use with `?`.
    #[inline]
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(SearchError::Superseded)
        } else {
            Ok(())
        }
    }
}

impl Default for CancellationToken {
    /// Default creates a noop token that is never cancelled.
    fn default() -> Self {
        Self::noop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_token_is_never_cancelled() {
        let token = CancellationToken::noop();
        assert!(!token.is_cancelled());
        assert!(token.check().is_ok());
        assert!(!CancellationToken::default().is_cancelled());
    }

    #[test]
    fn newer_version_cancels_older_tokens() {
        let versions = QueryVersions::new();
        let first = versions.next_token();
        assert!(!first.is_cancelled());

        let second = versions.next_token();
        assert!(first.is_cancelled());
        assert!(matches!(first.check(), Err(SearchError::Superseded)));
        assert!(!second.is_cancelled());

        versions.cancel_all();
        assert!(second.is_cancelled());
        assert_eq!(versions.current_version(), 3);
    }

    #[test]
    fn cloned_tokens_observe_cancellation() {
        let versions = QueryVersions::new();
        let token = versions.next_token();
        let clone = token.clone();
        versions.cancel_all();
        assert!(clone.is_cancelled());
        assert_eq!(clone.version(), token.version());
    }
}
