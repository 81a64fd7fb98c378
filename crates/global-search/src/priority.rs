//! Locally known high-value paths searched alongside the bulk index.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Standard user directories searched with priority.
pub const STANDARD_USER_DIRS: [&str; 6] = [
    "Desktop",
    "Documents",
    "Downloads",
    "Music",
    "Pictures",
    "Videos",
];

/// Provides the priority path set for one query execution.
pub trait PriorityPathSource: Send + Sync {
    fn priority_paths(&self) -> Vec<String>;
}

/// Priority paths gathered from the user's directories and usage lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPaths {
    pub standard_dirs: Vec<String>,
    pub favorites: Vec<String>,
    pub history: Vec<String>,
    pub frequent: Vec<String>,
    pub tagged: Vec<String>,
}

impl UserPaths {
    /// Uses the standard directories under `home`.
    pub fn from_home(home: &Path) -> Self {
        Self {
            standard_dirs: STANDARD_USER_DIRS
                .iter()
                .map(|dir| home.join(dir).to_string_lossy().into_owned())
                .collect(),
            ..Self::default()
        }
    }

    pub fn with_favorites(mut self, favorites: Vec<String>) -> Self {
        self.favorites = favorites;
        self
    }

    pub fn with_history(mut self, history: Vec<String>) -> Self {
        self.history = history;
        self
    }

    pub fn with_frequent(mut self, frequent: Vec<String>) -> Self {
        self.frequent = frequent;
        self
    }

    pub fn with_tagged(mut self, tagged: Vec<String>) -> Self {
        self.tagged = tagged;
        self
    }
}

impl PriorityPathSource for UserPaths {
    /// Every list in order, keeping the first spelling of paths that differ
    /// only in case.
    fn priority_paths(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        [
            &self.standard_dirs,
            &self.favorites,
            &self.history,
            &self.frequent,
            &self.tagged,
        ]
        .into_iter()
        .flatten()
        .filter(|path| !path.is_empty() && seen.insert(path.to_lowercase()))
        .cloned()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_dirs_come_from_home() {
        let paths = UserPaths::from_home(Path::new("/home/me")).priority_paths();
        assert_eq!(paths.len(), STANDARD_USER_DIRS.len());
        assert_eq!(paths[0], "/home/me/Desktop");
        assert!(paths.contains(&"/home/me/Downloads".to_string()));
    }

    #[test]
    fn lists_are_merged_in_order_without_case_duplicates() {
        let paths = UserPaths::default()
            .with_favorites(vec!["/work/Plans".to_string(), "/work/notes".to_string()])
            .with_history(vec!["/WORK/plans".to_string(), String::new()])
            .with_frequent(vec!["/tmp/build.log".to_string()])
            .with_tagged(vec!["/work/Notes".to_string(), "/photos/2024".to_string()])
            .priority_paths();

        assert_eq!(
            paths,
            vec![
                "/work/Plans".to_string(),
                "/work/notes".to_string(),
                "/tmp/build.log".to_string(),
                "/photos/2024".to_string(),
            ]
        );
    }

    #[test]
    fn empty_sources_yield_no_paths() {
        assert!(UserPaths::default().priority_paths().is_empty());
    }
}
