//! Global search settings.
//!
//! Stored as a camelCase JSON document. Missing fields fall back to their
//! defaults so older documents keep loading.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_AUTO_SCAN_PERIOD_MINUTES, DEFAULT_RESULT_LIMIT};
use crate::error::Result;
use crate::types::{QueryOptions, ScanSettings};

pub type SharedSettings = Arc<RwLock<GlobalSearchSettings>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalSearchSettings {
    pub scan_depth: u32,
    pub auto_scan_period_minutes: u64,
    pub auto_reindex_when_idle: bool,
    pub ignored_paths: Vec<String>,
    pub selected_drive_roots: Vec<String>,
    pub parallel_scan: bool,
    pub result_limit: usize,
    pub include_files: bool,
    pub include_directories: bool,
    pub exact_match: bool,
    pub typo_tolerance: bool,
}

impl Default for GlobalSearchSettings {
    fn default() -> Self {
        Self {
            scan_depth: 5,
            auto_scan_period_minutes: DEFAULT_AUTO_SCAN_PERIOD_MINUTES,
            auto_reindex_when_idle: true,
            ignored_paths: Vec::new(),
            selected_drive_roots: Vec::new(),
            parallel_scan: false,
            result_limit: DEFAULT_RESULT_LIMIT,
            include_files: true,
            include_directories: true,
            exact_match: false,
            typo_tolerance: true,
        }
    }
}

impl GlobalSearchSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Loads settings, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn into_shared(self) -> SharedSettings {
        Arc::new(RwLock::new(self))
    }

    /// Builds a scan request for `drive_roots`.
    pub fn scan_settings(&self, drive_roots: Vec<String>) -> ScanSettings {
        ScanSettings {
            scan_depth: self.scan_depth.max(1),
            ignored_paths: self.ignored_paths.clone(),
            drive_roots,
            parallel_scan: self.parallel_scan,
        }
    }

    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            limit: self.result_limit,
            include_files: self.include_files,
            include_directories: self.include_directories,
            exact_match: self.exact_match,
            typo_tolerance: self.typo_tolerance,
            min_score_threshold: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: GlobalSearchSettings =
            serde_json::from_str(r#"{"scanDepth": 3, "ignoredPaths": ["/tmp"]}"#)
                .expect("settings");
        assert_eq!(settings.scan_depth, 3);
        assert_eq!(settings.ignored_paths, vec!["/tmp".to_string()]);
        assert_eq!(settings.auto_scan_period_minutes, 60);
        assert!(settings.auto_reindex_when_idle);
        assert_eq!(settings.result_limit, 50);
        assert!(settings.typo_tolerance);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("nested").join("global-search.json");

        let settings = GlobalSearchSettings {
            selected_drive_roots: vec!["/data".to_string()],
            exact_match: true,
            ..GlobalSearchSettings::default()
        };
        settings.save(&path).expect("save");

        let raw = fs::read_to_string(&path).expect("read");
        assert!(raw.contains("\"selectedDriveRoots\""));
        assert_eq!(GlobalSearchSettings::load(&path).expect("load"), settings);
    }

    #[test]
    fn load_or_default_handles_missing_file() {
        let dir = TempDir::new().expect("tempdir");
        let loaded =
            GlobalSearchSettings::load_or_default(&dir.path().join("absent.json")).expect("load");
        assert_eq!(loaded, GlobalSearchSettings::default());
    }

    #[test]
    fn malformed_file_is_a_settings_error() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").expect("write");
        assert!(matches!(
            GlobalSearchSettings::load(&path),
            Err(crate::error::SearchError::Settings(_))
        ));
    }

    #[test]
    fn scan_depth_is_clamped_to_one() {
        let settings = GlobalSearchSettings {
            scan_depth: 0,
            parallel_scan: true,
            ..GlobalSearchSettings::default()
        };
        let scan = settings.scan_settings(vec!["/".to_string()]);
        assert_eq!(scan.scan_depth, 1);
        assert!(scan.parallel_scan);
        assert_eq!(scan.drive_roots, vec!["/".to_string()]);
    }

    #[test]
    fn query_options_follow_settings() {
        let settings = GlobalSearchSettings {
            result_limit: 10,
            include_directories: false,
            typo_tolerance: false,
            ..GlobalSearchSettings::default()
        };
        let options = settings.query_options();
        assert_eq!(options.limit, 10);
        assert!(options.include_files);
        assert!(!options.include_directories);
        assert!(!options.typo_tolerance);
        assert_eq!(options.min_score_threshold, None);
    }
}
