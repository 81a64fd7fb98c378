//! Payload types exchanged with the index backend.
//!
//! Field names are snake_case on the wire.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_RESULT_LIMIT;

/// A per-drive failure reported inside an otherwise successful scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveScanError {
    pub drive_root: String,
    pub message: String,
}

/// Index status as reported by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionStatus {
    pub is_scan_in_progress: bool,
    pub is_committing: bool,
    pub is_parallel_scan: bool,
    /// Milliseconds since the Unix epoch.
    pub last_scan_time: Option<u64>,
    pub indexed_item_count: u64,
    pub index_size_bytes: u64,
    pub current_drive_root: Option<String>,
    pub drive_scan_errors: Vec<DriveScanError>,
    pub is_index_valid: bool,
    #[serde(rename = "scanned_drives_count")]
    pub scanned_drive_count: u32,
    #[serde(rename = "total_drives_count")]
    pub total_drive_count: u32,
}

impl SessionStatus {
    /// Whether the backend is scanning or committing.
    pub fn is_active(&self) -> bool {
        self.is_scan_in_progress || self.is_committing
    }
}

/// Parameters of a scan request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Always at least 1.
    pub scan_depth: u32,
    pub ignored_paths: Vec<String>,
    pub drive_roots: Vec<String>,
    pub parallel_scan: bool,
}

/// Parameters of a bulk or priority-path query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    pub limit: usize,
    pub include_files: bool,
    pub include_directories: bool,
    pub exact_match: bool,
    pub typo_tolerance: bool,
    pub min_score_threshold: Option<f64>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RESULT_LIMIT,
            include_files: true,
            include_directories: true,
            exact_match: false,
            typo_tolerance: true,
            min_score_threshold: None,
        }
    }
}

/// A mounted drive reported by the drive source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveInfo {
    pub path: String,
}

impl DriveInfo {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// A filesystem entry returned by a query, with its match score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoredEntry {
    pub name: String,
    pub ext: Option<String>,
    pub path: String,
    pub size: u64,
    pub item_count: Option<u64>,
    pub modified_time: u64,
    pub accessed_time: u64,
    pub created_time: u64,
    pub mime: Option<String>,
    pub is_file: bool,
    pub is_dir: bool,
    pub is_symlink: bool,
    pub is_hidden: bool,
    pub score: Option<f64>,
}

impl ScoredEntry {
    /// A file entry with name, extension and hidden flag derived from `path`.
    pub fn file(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = fuzzy::base_name(&path).to_string();
        let ext = name
            .rsplit_once('.')
            .filter(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
            .map(|(_, ext)| ext.to_lowercase());
        Self {
            is_hidden: name.starts_with('.'),
            name,
            ext,
            path,
            is_file: true,
            ..Self::default()
        }
    }

    /// A directory entry with name and hidden flag derived from `path`.
    pub fn dir(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = fuzzy::base_name(&path).to_string();
        Self {
            is_hidden: name.starts_with('.'),
            name,
            path,
            is_dir: true,
            ..Self::default()
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Score used for ranking; missing scores rank as zero.
    pub fn rank(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }
}
