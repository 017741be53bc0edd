//! Lingo Offline Worker
//!
//! This crate implements the offline caching and background-sync policy of
//! the Lingo language-trainer PWA. It is the core of the application's
//! service worker: a versioned cache store seeded from a static asset
//! manifest, a two-strategy fetch router, generation-based eviction, and a
//! best-effort sync notification channel back to connected clients.
//!
//! The crate is sans-io. The hosting environment (event loop, network,
//! browser sessions) drives it through a thin adapter that calls one method
//! per event kind and implements the three seams the policy needs:
//! [`fetch::FetchBackend`], [`clients::ClientHub`], and [`policy::Clock`].
//!
//! # Architecture
//!
//! - `fetch`: request/response model + the network backend seam
//! - `store`: versioned cache stores and the storage that owns them
//! - `manifest`: the ordered static asset manifest installed atomically
//! - `lifecycle`: per-generation state machine + transition validation
//! - `clients`: connected-session registry seam + in-memory implementation
//! - `message`: JSON client message protocol (skip-waiting, sync)
//! - `policy`: the `OfflineCachePolicy` event router itself

#![no_std]

extern crate alloc;

pub mod clients;
pub mod fetch;
pub mod lifecycle;
pub mod manifest;
pub mod message;
pub mod policy;
pub mod store;

use alloc::string::String;

use fetch::FetchError;
use lifecycle::GenerationState;

/// Policy error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// Atomic install failed; no partial store was committed.
    Install(String),
    /// Network fetch failed with no cached fallback.
    Network(FetchError),
    /// A generation was asked to move along an illegal edge.
    InvalidTransition {
        from: GenerationState,
        to: GenerationState,
    },
    /// Activation requested with no installed or active generation.
    NoWaitingVersion,
}

/// Policy configuration.
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    /// The application's own origin, e.g. `https://trainer.example.com`.
    /// Root-relative URLs are always same-origin; when this is empty, only
    /// root-relative URLs are.
    pub origin: String,
    /// Version-stamped cache store name. Bumping it is the only supported
    /// upgrade mechanism; the old generation is swept on activation.
    pub cache_name: String,
    /// Path marker that routes a request to the network-first strategy.
    pub api_marker: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig {
            origin: String::new(),
            cache_name: String::from("app-cache-v1"),
            api_marker: String::from("/api/"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PolicyConfig::default();
        assert_eq!(config.cache_name, "app-cache-v1");
        assert_eq!(config.api_marker, "/api/");
        assert!(config.origin.is_empty());
    }
}
