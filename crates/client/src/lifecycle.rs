//! Install/activate lifecycle and fetch dispatch.
//!
//! ```text
//! INSTALLING --install settles--> WAITING --activate | SKIP_WAITING--> ACTIVATING --purge, claim--> ACTIVE
//! ```
//!
//! The controller is the only owner of store versions: install creates the
//! current store, activation deletes every other one. The request path only
//! looks stores up and never creates one, so an old controller still serving
//! after a newer version activated declines instead of reviving its store.
//!
//! Install and activation are serialized on one lock, so activation never
//! starts while install is still populating the store.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use serde::Serialize;
use swcache_core::{AppConfig, CacheDb, CacheStore, Error, Request};
use tokio::sync::{Mutex, RwLock};
use url::Url;

use crate::fetch::{Fetcher, resolve};
use crate::message::ControlMessage;
use crate::router::{Classifier, RoutingPolicy};
use crate::strategy::{Served, network_first, stale_while_revalidate};

/// Lifecycle phase of one controller instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    Installing,
    Waiting,
    Activating,
    Active,
}

/// Host hook for taking over pages that are already open.
#[async_trait]
pub trait ClientHooks: Send + Sync {
    /// Take control of every open client without a reload.
    async fn claim(&self) -> Result<(), Error>;
}

/// Outcome of populating the store at install time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    pub store: String,
    pub stored: usize,
    /// Manifest URLs that could not be fetched or stored.
    pub failed: Vec<String>,
}

/// Outcome of an activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivateReport {
    /// Old-version stores removed.
    pub deleted: Vec<String>,
    /// Old-version stores that could not be removed.
    pub orphaned: Vec<String>,
    pub claimed: bool,
}

/// Snapshot of the controller for status reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStatus {
    pub state: LifecycleState,
    pub cache_name: String,
    pub stores: Vec<String>,
    pub entries: usize,
}

/// What to do with an intercepted request.
#[derive(Debug)]
pub enum FetchOutcome {
    Respond { policy: RoutingPolicy, served: Served },
    /// Not handled here; the host performs a normal network fetch.
    Decline,
}

#[derive(Debug)]
struct Phase {
    state: LifecycleState,
    skip_waiting: bool,
}

/// One deployed version of the caching engine.
pub struct LifecycleController {
    db: CacheDb,
    cache_name: String,
    manifest: Vec<Url>,
    classifier: Classifier,
    fetcher: Arc<dyn Fetcher>,
    clients: Arc<dyn ClientHooks>,
    skip_waiting_on_install: bool,
    phase: RwLock<Phase>,
    transition: Mutex<()>,
}

impl LifecycleController {
    /// Build a controller for the configured version.
    ///
    /// Resolves the manifest against the origin up front so a bad entry
    /// fails here rather than during install.
    pub fn new(
        config: &AppConfig, db: CacheDb, fetcher: Arc<dyn Fetcher>, clients: Arc<dyn ClientHooks>,
    ) -> Result<Self, Error> {
        let origin = config.origin_url().map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let manifest = config
            .manifest
            .iter()
            .map(|entry| resolve(&origin, entry).map_err(|e| Error::InvalidUrl(format!("{entry}: {e}"))))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            db,
            cache_name: config.cache_name(),
            manifest,
            classifier: Classifier::from_config(config, origin),
            fetcher,
            clients,
            skip_waiting_on_install: config.skip_waiting_on_install,
            phase: RwLock::new(Phase { state: LifecycleState::Installing, skip_waiting: false }),
            transition: Mutex::new(()),
        })
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub async fn state(&self) -> LifecycleState {
        self.phase.read().await.state
    }

    /// Whether install finished and asked to activate without waiting.
    async fn ready_to_activate(&self) -> bool {
        let phase = self.phase.read().await;
        phase.state == LifecycleState::Waiting && phase.skip_waiting
    }

    /// Open the current store and precache the manifest, best-effort.
    ///
    /// Each manifest entry is fetched independently; failures are reported
    /// and logged but never fail the install. Running install again while
    /// waiting is allowed and only overwrites entries it could refetch.
    pub async fn on_install(&self) -> Result<InstallReport, Error> {
        let _guard = self.transition.lock().await;
        self.install_locked().await
    }

    /// Install, then activate right away if install asked to skip waiting.
    ///
    /// Both steps run under one hold of the transition lock, so a
    /// concurrent skip-waiting message cannot activate in between.
    pub async fn on_install_then_activate(&self) -> Result<(InstallReport, Option<ActivateReport>), Error> {
        let _guard = self.transition.lock().await;
        let install = self.install_locked().await?;

        let activation = if self.ready_to_activate().await { Some(self.activate_locked().await?) } else { None };
        Ok((install, activation))
    }

    async fn install_locked(&self) -> Result<InstallReport, Error> {
        let state = self.state().await;
        if !matches!(state, LifecycleState::Installing | LifecycleState::Waiting) {
            return Err(Error::InvalidState(format!("cannot install while {state:?}")));
        }

        tracing::info!(store = %self.cache_name, assets = self.manifest.len(), "installing");
        let store = self.db.open_store(&self.cache_name).await?;

        let results = join_all(self.manifest.iter().map(|url| self.precache(&store, url))).await;

        let mut report = InstallReport { store: self.cache_name.clone(), stored: 0, failed: Vec::new() };
        for (url, result) in self.manifest.iter().zip(results) {
            match result {
                Ok(()) => report.stored += 1,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to precache {}", url);
                    report.failed.push(url.to_string());
                }
            }
        }

        let mut phase = self.phase.write().await;
        phase.state = LifecycleState::Waiting;
        phase.skip_waiting = self.skip_waiting_on_install;

        tracing::info!(stored = report.stored, failed = report.failed.len(), "install settled");
        Ok(report)
    }

    async fn precache(&self, store: &CacheStore, url: &Url) -> Result<(), Error> {
        let request = Request::get(url.clone());
        let response = self.fetcher.fetch(&request).await?;
        if !response.is_success() {
            return Err(Error::HttpError(format!("{} answered {}", url, response.status)));
        }
        store.put(&request, &response).await
    }

    /// Purge old-version stores and claim open clients.
    pub async fn on_activate(&self) -> Result<ActivateReport, Error> {
        let _guard = self.transition.lock().await;
        self.activate_locked().await
    }

    async fn activate_locked(&self) -> Result<ActivateReport, Error> {
        {
            let mut phase = self.phase.write().await;
            if phase.state != LifecycleState::Waiting {
                return Err(Error::InvalidState(format!("cannot activate while {:?}", phase.state)));
            }
            phase.state = LifecycleState::Activating;
        }
        tracing::info!(store = %self.cache_name, "activating");

        let mut report = ActivateReport { deleted: Vec::new(), orphaned: Vec::new(), claimed: false };

        match self.db.store_names().await {
            Ok(names) => {
                for name in names.into_iter().filter(|name| *name != self.cache_name) {
                    match self.db.delete_store(&name).await {
                        Ok(_) => {
                            tracing::debug!(store = %name, "deleted old store");
                            report.deleted.push(name);
                        }
                        Err(e) => {
                            tracing::warn!(store = %name, error = %e, "failed to delete old store");
                            report.orphaned.push(name);
                        }
                    }
                }
            }
            Err(e) => tracing::warn!(error = %e, "could not list stores, skipping purge"),
        }

        match self.clients.claim().await {
            Ok(()) => report.claimed = true,
            Err(e) => tracing::warn!(error = %e, "failed to claim clients"),
        }

        self.phase.write().await.state = LifecycleState::Active;
        tracing::info!(deleted = report.deleted.len(), claimed = report.claimed, "active");
        Ok(report)
    }

    /// Leave WAITING immediately.
    ///
    /// Returns whether this call performed the activation.
    pub async fn skip_waiting(&self) -> Result<bool, Error> {
        let _guard = self.transition.lock().await;
        {
            let mut phase = self.phase.write().await;
            phase.skip_waiting = true;
            if phase.state != LifecycleState::Waiting {
                return Ok(false);
            }
        }
        self.activate_locked().await?;
        Ok(true)
    }

    /// Handle a control message from a page.
    ///
    /// Unrecognised payloads are ignored. Returns whether an activation
    /// happened.
    pub async fn on_message(&self, payload: &serde_json::Value) -> Result<bool, Error> {
        match ControlMessage::parse(payload) {
            Some(ControlMessage::SkipWaiting) => self.skip_waiting().await,
            None => {
                tracing::debug!("ignoring unrecognised message");
                Ok(false)
            }
        }
    }

    /// Route an intercepted request.
    ///
    /// Bypassed requests and requests arriving before activation are
    /// declined without touching the store.
    pub async fn handle_fetch(&self, request: &Request) -> Result<FetchOutcome, Error> {
        let policy = self.classifier.classify(request);
        if policy == RoutingPolicy::Bypass {
            return Ok(FetchOutcome::Decline);
        }

        if self.state().await != LifecycleState::Active {
            tracing::debug!("not active, declining {}", request);
            return Ok(FetchOutcome::Decline);
        }

        let store = match self.db.store(&self.cache_name).await {
            Ok(Some(store)) => store,
            Ok(None) => {
                tracing::debug!(store = %self.cache_name, "store was purged, declining {}", request);
                return Ok(FetchOutcome::Decline);
            }
            Err(e) => {
                tracing::warn!(error = %e, "store unavailable, declining {}", request);
                return Ok(FetchOutcome::Decline);
            }
        };

        let served = match policy {
            RoutingPolicy::StaleWhileRevalidate => stale_while_revalidate(&store, &self.fetcher, request).await?,
            RoutingPolicy::NetworkFirst => network_first(&store, &self.fetcher, request).await?,
            RoutingPolicy::Bypass => return Ok(FetchOutcome::Decline),
        };

        Ok(FetchOutcome::Respond { policy, served })
    }

    pub async fn status(&self) -> Result<CacheStatus, Error> {
        let stores = self.db.store_names().await?;
        let entries = match self.db.store(&self.cache_name).await? {
            Some(store) => store.len().await?,
            None => 0,
        };
        Ok(CacheStatus { state: self.state().await, cache_name: self.cache_name.clone(), stores, entries })
    }
}
