//! Static Asset Manifest
//!
//! The ordered set of root-relative paths considered essential for the
//! application shell. Immutable for the lifetime of a cache version and
//! installed atomically: if any entry fails to fetch, nothing is committed.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// The application shell cached on install.
pub const APP_SHELL: &[&str] = &[
    "/",
    "/index.html",
    "/manifest.json",
    "/favicon.ico",
    "/logo192.png",
    "/logo512.png",
    "/static/js/bundle.js",
    "/static/css/main.css",
];

/// An ordered, de-duplicated set of asset paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticManifest {
    paths: Vec<String>,
}

impl StaticManifest {
    /// Build a manifest from paths, preserving first-seen order
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for path in paths {
            let path = path.into();
            if !out.contains(&path) {
                out.push(path);
            }
        }
        Self { paths: out }
    }

    /// Iterate the paths in manifest order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    /// Check whether a path is part of the manifest
    pub fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if the manifest is empty
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl Default for StaticManifest {
    fn default() -> Self {
        Self::new(APP_SHELL.iter().map(|p| p.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_order_preserved() {
        let manifest = StaticManifest::new(vec!["/b", "/a", "/c"]);
        let paths: Vec<&str> = manifest.iter().collect();
        assert_eq!(paths, ["/b", "/a", "/c"]);
    }

    #[test]
    fn test_duplicates_dropped() {
        let manifest = StaticManifest::new(vec!["/a", "/b", "/a"]);
        assert_eq!(manifest.len(), 2);
        let paths: Vec<&str> = manifest.iter().collect();
        assert_eq!(paths, ["/a", "/b"]);
    }

    #[test]
    fn test_contains() {
        let manifest = StaticManifest::default();
        assert!(manifest.contains("/"));
        assert!(manifest.contains("/static/css/main.css"));
        assert!(!manifest.contains("/api/words"));
    }

    #[test]
    fn test_default_shell() {
        let manifest = StaticManifest::default();
        assert_eq!(manifest.len(), APP_SHELL.len());
        assert!(!manifest.is_empty());
    }
}
