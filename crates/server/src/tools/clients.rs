//! Client-claim hook for the stdio host.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use swcache_client::ClientHooks;
use swcache_core::Error;

/// Records claims; the stdio host has no pages of its own to take over.
#[derive(Debug, Default)]
pub struct ClaimLog {
    claims: AtomicUsize,
}

#[async_trait]
impl ClientHooks for ClaimLog {
    async fn claim(&self) -> Result<(), Error> {
        let n = self.claims.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(claims = n, "claimed open clients");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_claim_counts() {
        let log = ClaimLog::default();
        log.claim().await.unwrap();
        log.claim().await.unwrap();
        assert_eq!(log.claims.load(Ordering::SeqCst), 2);
    }
}
