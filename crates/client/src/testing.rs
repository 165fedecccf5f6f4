//! Scripted fetcher shared by the unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use swcache_core::{Error, Request, Response};
use tokio::sync::Notify;

use crate::fetch::Fetcher;

#[derive(Clone)]
pub enum Reply {
    Status(u16, &'static str),
    Fail,
    /// Never resolves.
    Hang,
    /// Resolves with 200 once `release` is notified.
    Gated(&'static str),
}

/// Answers from a URL → reply table; unknown URLs fail like a dead network.
#[derive(Default)]
pub struct StubFetcher {
    replies: Mutex<HashMap<String, Reply>>,
    calls: AtomicUsize,
    pub release: Notify,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, url: &str, reply: Reply) -> Self {
        self.set(url, reply);
        self
    }

    pub fn set(&self, url: &str, reply: Reply) {
        self.replies.lock().unwrap().insert(url.to_string(), reply);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let url = request.url().to_string();
        let reply = self.replies.lock().unwrap().get(&url).cloned();

        match reply {
            Some(Reply::Status(status, body)) => Ok(Response::new(url, status, body)),
            Some(Reply::Hang) => std::future::pending().await,
            Some(Reply::Gated(body)) => {
                self.release.notified().await;
                Ok(Response::new(url, 200, body))
            }
            Some(Reply::Fail) | None => Err(Error::Network(format!("{url}: connection refused"))),
        }
    }
}
