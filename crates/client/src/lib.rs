//! Request interception engine for sw-cache.
//!
//! This crate provides the network fetcher, the request classifier, the two
//! caching strategies, and the lifecycle controller that ties them to a
//! versioned store.

pub mod fetch;
pub mod lifecycle;
pub mod message;
pub mod router;
pub mod strategy;

#[cfg(test)]
pub(crate) mod testing;

pub use fetch::{FetchClient, FetchConfig, Fetcher};
pub use lifecycle::{
    ActivateReport, CacheStatus, ClientHooks, FetchOutcome, InstallReport, LifecycleController, LifecycleState,
};
pub use message::ControlMessage;
pub use router::{Classifier, RoutingPolicy};
pub use strategy::{ResponseSource, Revalidation, Served};
