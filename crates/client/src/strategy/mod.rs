//! Caching strategies.
//!
//! Both strategies read and write entries through a borrowed [`CacheStore`];
//! neither can create or delete a store. Only success responses
//! (see [`Response::is_success`]) are ever written.

pub mod network_first;
pub mod stale_while_revalidate;

pub use network_first::network_first;
pub use stale_while_revalidate::stale_while_revalidate;

use std::future::Future;

use serde::Serialize;
use swcache_core::{CacheStore, Request, Response};
use tokio::task::JoinHandle;

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    /// Fresh from the network.
    Network,
    /// Stored copy served without waiting on the network.
    Cache,
    /// Stored copy served because the network produced nothing.
    Fallback,
}

/// A detached background refresh.
///
/// The task's errors are discarded: it logs and ends. Dropping this handle
/// detaches the task, it keeps running to completion and is not cancelled.
#[derive(Debug)]
pub struct Revalidation {
    handle: JoinHandle<()>,
}

impl Revalidation {
    pub(crate) fn spawn<F>(task: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self { handle: tokio::spawn(task) }
    }

    /// Wait until the refresh has either written the store or given up.
    pub async fn settled(self) {
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "revalidation task did not complete");
        }
    }
}

/// Result of running a strategy.
#[derive(Debug)]
pub struct Served {
    pub response: Response,
    pub source: ResponseSource,
    /// Present when a stored copy was served and a refresh was started.
    pub revalidation: Option<Revalidation>,
}

impl Served {
    fn fresh(response: Response) -> Self {
        Self { response, source: ResponseSource::Network, revalidation: None }
    }
}

/// Write a success response to the store, logging instead of failing.
///
/// Returns whether the entry was written.
pub(crate) async fn remember(store: &CacheStore, request: &Request, response: &Response) -> bool {
    if !response.is_success() {
        tracing::debug!(status = response.status, "not storing {}", request);
        return false;
    }

    match store.put(request, response).await {
        Ok(()) => {
            tracing::debug!(store = store.name(), "stored {}", request);
            true
        }
        Err(e) => {
            tracing::warn!(store = store.name(), error = %e, "failed to store {}", request);
            false
        }
    }
}
