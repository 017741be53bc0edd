//! Offline Cache Policy
//!
//! The event router at the heart of the service worker. The host adapter
//! calls one method per event kind: `install`, `activate`, `route`,
//! `handle_message`, and `notify_deferred_sync`. The policy owns the cache
//! storage handle it was constructed with; there is no ambient global.
//!
//! Handlers run on a single-threaded, event-driven host and may interleave
//! at suspension points. The storage sits behind a lock held only across
//! individual reads/writes; concurrent fetches of the same key resolve as
//! last-writer-wins.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use spin::RwLock;

use crate::clients::ClientHub;
use crate::fetch::{self, FetchBackend, Method, Request, Response, ResponseType};
use crate::lifecycle::{Generation, GenerationState};
use crate::manifest::StaticManifest;
use crate::message::{self, InboundMessage, OutboundMessage, SYNC_TRAINING_DATA};
use crate::store::{CacheStorage, CacheStore};
use crate::{PolicyConfig, PolicyError};

/// Time seam implemented by the host adapter.
pub trait Clock: Send + Sync {
    /// Current time in epoch milliseconds
    fn now_ms(&self) -> u64;
}

/// Which fetch strategy a request gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingDecision {
    /// Network-first (path contains the API marker)
    Api,
    /// Cache-first (every other same-origin GET)
    Static,
    /// Not intercepted: non-GET or cross-origin
    Bypass,
}

/// Result of routing a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The policy produced a response
    Served(Response),
    /// Default browser handling; the policy never touches the request
    Bypass,
}

/// Waiting/active generation slots.
#[derive(Default)]
struct Slots {
    waiting: Option<Generation>,
    active: Option<Generation>,
}

/// The offline caching and sync policy for one origin.
pub struct OfflineCachePolicy {
    config: PolicyConfig,
    storage: RwLock<CacheStorage>,
    slots: RwLock<Slots>,
    backend: Box<dyn FetchBackend>,
    clients: Box<dyn ClientHub>,
    clock: Box<dyn Clock>,
}

impl OfflineCachePolicy {
    /// Create a policy over an explicitly passed-in storage handle
    pub fn new(
        config: PolicyConfig,
        storage: CacheStorage,
        backend: Box<dyn FetchBackend>,
        clients: Box<dyn ClientHub>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            config,
            storage: RwLock::new(storage),
            slots: RwLock::new(Slots::default()),
            backend,
            clients,
            clock,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Version name of the waiting generation, if any
    pub fn waiting_version(&self) -> Option<String> {
        self.slots.read().waiting.as_ref().map(|g| g.name().to_string())
    }

    /// Version name of the active generation, if any
    pub fn active_version(&self) -> Option<String> {
        self.slots.read().active.as_ref().map(|g| g.name().to_string())
    }

    /// Check whether a URL has a snapshot in the current version's store
    pub fn cached(&self, url: &str) -> bool {
        let key = fetch::origin_relative(url, &self.config.origin);
        self.storage
            .read()
            .get(&self.config.cache_name)
            .map(|store| store.lookup(key).is_some())
            .unwrap_or(false)
    }

    /// Names of all cache stores currently held
    pub fn store_names(&self) -> Vec<String> {
        self.storage.read().names()
    }

    /// Install a new cache generation from the manifest.
    ///
    /// All-or-nothing: the store is staged off to the side and only
    /// committed once every asset has fetched with a success status. On any
    /// failure the generation is discarded and the previous version, if
    /// any, stays active.
    pub fn install(&self, manifest: &StaticManifest) -> Result<(), PolicyError> {
        let name = self.config.cache_name.clone();
        let mut generation = Generation::new(&name);
        generation.advance(GenerationState::Installing)?;
        log::info!(
            "installing cache generation {} ({} assets)",
            name,
            manifest.len()
        );

        let mut staged = CacheStore::new(&name);
        let now = self.clock.now_ms();
        for path in manifest.iter() {
            let request = Request::get(path);
            match self.backend.fetch(&request) {
                Ok(response) if response.ok() => {
                    staged.put(path, response, now);
                }
                Ok(response) => {
                    generation.advance(GenerationState::Discarded)?;
                    log::warn!("install aborted: {} returned {}", path, response.status);
                    return Err(PolicyError::Install(format!(
                        "{} returned status {}",
                        path, response.status
                    )));
                }
                Err(err) => {
                    generation.advance(GenerationState::Discarded)?;
                    log::warn!("install aborted: {} failed: {:?}", path, err);
                    return Err(PolicyError::Install(format!("{} failed to fetch", path)));
                }
            }
        }

        self.storage.write().insert(staged);
        generation.advance(GenerationState::Installed)?;
        // The install handler always requests immediate activation; the
        // host is expected to call activate without waiting for open
        // sessions to close.
        self.slots.write().waiting = Some(generation);
        log::info!("cache generation {} installed, skip waiting requested", name);
        Ok(())
    }

    /// Activate the waiting generation.
    ///
    /// Promotes waiting to active (superseding any prior active
    /// generation), deletes every store not named for the current version,
    /// and claims open sessions immediately. With nothing waiting this is
    /// an idempotent re-sweep of the current version.
    pub fn activate(&self) -> Result<(), PolicyError> {
        let current = {
            let mut slots = self.slots.write();
            match slots.waiting.take() {
                Some(mut next) => {
                    next.advance(GenerationState::Active)?;
                    if let Some(mut prev) = slots.active.take() {
                        prev.advance(GenerationState::Superseded)?;
                        log::info!("superseding cache generation {}", prev.name());
                    }
                    let name = next.name().to_string();
                    slots.active = Some(next);
                    name
                }
                None => match slots.active.as_ref() {
                    Some(active) => active.name().to_string(),
                    None => return Err(PolicyError::NoWaitingVersion),
                },
            }
        };

        // The sweep is the sole mechanism keeping storage bounded.
        {
            let mut storage = self.storage.write();
            for name in storage.names() {
                if name != current {
                    storage.delete(&name);
                    log::info!("evicted cache generation {}", name);
                }
            }
        }

        if let Err(err) = self.clients.claim() {
            log::warn!("client claim failed: {:?}", err);
        }
        log::info!("cache generation {} active", current);
        Ok(())
    }

    /// Activate the waiting version without waiting for sessions to close
    pub fn invalidate_on_demand(&self) -> Result<(), PolicyError> {
        log::debug!("skip waiting requested by client");
        self.activate()
    }

    /// Classify a request for routing
    pub fn classify(&self, request: &Request) -> RoutingDecision {
        if request.method != Method::Get {
            return RoutingDecision::Bypass;
        }
        if !fetch::is_same_origin(&request.url, &self.config.origin) {
            return RoutingDecision::Bypass;
        }
        let path = fetch::origin_relative(&request.url, &self.config.origin);
        if path.contains(self.config.api_marker.as_str()) {
            RoutingDecision::Api
        } else {
            RoutingDecision::Static
        }
    }

    /// Route an intercepted request through the matching fetch strategy.
    ///
    /// Requests arriving before any generation is active fall through to
    /// the host, as do non-GET and cross-origin requests.
    pub fn route(&self, request: &Request) -> Result<RouteOutcome, PolicyError> {
        let decision = self.classify(request);
        if decision == RoutingDecision::Bypass {
            return Ok(RouteOutcome::Bypass);
        }
        let current = match self.active_version() {
            Some(name) => name,
            None => return Ok(RouteOutcome::Bypass),
        };
        match decision {
            RoutingDecision::Api => self.network_first(&current, request),
            RoutingDecision::Static => self.cache_first(&current, request),
            RoutingDecision::Bypass => Ok(RouteOutcome::Bypass),
        }
    }

    /// Network-first: prefer live data, fall back to the snapshot.
    ///
    /// A fallback miss surfaces the original fetch failure; no synthetic
    /// offline page is fabricated.
    fn network_first(
        &self,
        store_name: &str,
        request: &Request,
    ) -> Result<RouteOutcome, PolicyError> {
        // Request identity is origin-relative, so the absolute and
        // root-relative forms of a URL share one snapshot key.
        let key = fetch::origin_relative(&request.url, &self.config.origin);
        match self.backend.fetch(request) {
            Ok(response) => {
                let now = self.clock.now_ms();
                self.storage
                    .write()
                    .open(store_name)
                    .put(key, response.clone(), now);
                Ok(RouteOutcome::Served(response))
            }
            Err(err) => {
                let storage = self.storage.read();
                match storage.get(store_name).and_then(|s| s.lookup(key)) {
                    Some(snapshot) => {
                        log::debug!("network fetch failed, serving snapshot: {}", key);
                        Ok(RouteOutcome::Served(snapshot.response().clone()))
                    }
                    None => Err(PolicyError::Network(err)),
                }
            }
        }
    }

    /// Cache-first: serve the snapshot, otherwise fetch and cache if valid.
    ///
    /// An invalid response (bad status, non-basic type, redirected) is
    /// still returned to the caller but never persisted.
    fn cache_first(
        &self,
        store_name: &str,
        request: &Request,
    ) -> Result<RouteOutcome, PolicyError> {
        let key = fetch::origin_relative(&request.url, &self.config.origin);
        {
            let storage = self.storage.read();
            if let Some(snapshot) = storage.get(store_name).and_then(|s| s.lookup(key)) {
                return Ok(RouteOutcome::Served(snapshot.response().clone()));
            }
        }
        let response = self.backend.fetch(request).map_err(PolicyError::Network)?;
        if is_cacheable(&response) {
            let now = self.clock.now_ms();
            self.storage
                .write()
                .open(store_name)
                .put(key, response.clone(), now);
        }
        Ok(RouteOutcome::Served(response))
    }

    /// Dispatch an inbound client message.
    ///
    /// Undecodable or unexpected messages are logged and dropped; a client
    /// can never fault the worker through this channel.
    pub fn handle_message(&self, bytes: &[u8]) {
        match message::decode_inbound(bytes) {
            Ok(InboundMessage::SkipWaiting) => {
                if let Err(err) = self.invalidate_on_demand() {
                    log::debug!("skip waiting ignored: {:?}", err);
                }
            }
            Err(err) => {
                log::debug!("ignoring unrecognized client message: {:?}", err);
            }
        }
    }

    /// React to a deferred-sync signal from the environment.
    ///
    /// On an exact tag match, pushes a timestamped sync message to every
    /// connected session. Best-effort: per-client delivery failures are
    /// skipped, and an enumeration failure reduces to `false` rather than
    /// propagating.
    pub fn notify_deferred_sync(&self, tag: &str) -> bool {
        if tag != SYNC_TRAINING_DATA {
            log::debug!("ignoring sync signal with tag {}", tag);
            return false;
        }
        let outbound = OutboundMessage::SyncTrainingData {
            timestamp: message::iso8601(self.clock.now_ms()),
        };
        let connected = match self.clients.connected() {
            Ok(connected) => connected,
            Err(err) => {
                log::warn!("sync notification failed: {:?}", err);
                return false;
            }
        };
        for client in &connected {
            if let Err(err) = self.clients.post_message(client, &outbound) {
                log::debug!("client {} unreachable: {:?}", client.as_str(), err);
            }
        }
        log::info!("sync notification pushed to {} clients", connected.len());
        true
    }
}

/// Only successful, same-origin, non-redirected responses enter the static
/// cache.
fn is_cacheable(response: &Response) -> bool {
    response.ok() && response.response_type == ResponseType::Basic && !response.redirected
}
