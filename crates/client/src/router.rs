//! Request classification.
//!
//! Every intercepted request gets exactly one [`RoutingPolicy`], decided by
//! the first rule that matches:
//!
//! 1. Non-GET method → `Bypass`
//! 2. Cross-origin URL → `Bypass`
//! 3. Static asset (destination hint, static path prefix, or static file
//!    extension) → `StaleWhileRevalidate`
//! 4. Anything else, including `/` → `NetworkFirst`

use std::fmt;

use serde::Serialize;
use swcache_core::{AppConfig, Request};
use url::Url;

use crate::fetch::same_origin;

/// How a request is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingPolicy {
    StaleWhileRevalidate,
    NetworkFirst,
    /// Not intercepted: the host fetches normally and the store is untouched.
    Bypass,
}

impl fmt::Display for RoutingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::StaleWhileRevalidate => "stale_while_revalidate",
            Self::NetworkFirst => "network_first",
            Self::Bypass => "bypass",
        };
        f.write_str(s)
    }
}

/// Static routing rules for one application origin.
#[derive(Debug, Clone)]
pub struct Classifier {
    origin: Url,
    static_prefixes: Vec<String>,
    static_extensions: Vec<String>,
}

impl Classifier {
    pub fn new(origin: Url, static_prefixes: Vec<String>, static_extensions: Vec<String>) -> Self {
        let static_extensions = static_extensions.into_iter().map(|e| e.to_ascii_lowercase()).collect();
        Self { origin, static_prefixes, static_extensions }
    }

    /// Build from configuration; `origin` must already be validated.
    pub fn from_config(config: &AppConfig, origin: Url) -> Self {
        Self::new(origin, config.static_path_prefixes.clone(), config.static_extensions.clone())
    }

    pub fn classify(&self, request: &Request) -> RoutingPolicy {
        if !request.is_get() {
            return RoutingPolicy::Bypass;
        }
        if !same_origin(request.url(), &self.origin) {
            return RoutingPolicy::Bypass;
        }
        if request.destination().is_static_asset() || self.is_static_path(request.url().path()) {
            return RoutingPolicy::StaleWhileRevalidate;
        }
        RoutingPolicy::NetworkFirst
    }

    fn is_static_path(&self, path: &str) -> bool {
        if self.static_prefixes.iter().any(|prefix| path.starts_with(prefix.as_str())) {
            return true;
        }

        let file = path.rsplit('/').next().unwrap_or_default();
        match file.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => {
                let ext = ext.to_ascii_lowercase();
                self.static_extensions.iter().any(|known| *known == ext)
            }
            _ => false,
        }
    }
}
