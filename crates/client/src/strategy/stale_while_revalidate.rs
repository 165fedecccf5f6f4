//! Stale-while-revalidate: answer from the store, refresh behind the caller.

use std::sync::Arc;

use swcache_core::{CacheStore, Error, Request};

use super::{ResponseSource, Revalidation, Served, remember};
use crate::fetch::Fetcher;

/// Serve a stored copy immediately if there is one, refreshing it in the
/// background; otherwise wait on the network.
///
/// On a hit the caller never waits on the network. On a miss a network
/// failure is returned to the caller since nothing can stand in for it.
/// A failed store read counts as a miss.
pub async fn stale_while_revalidate(
    store: &CacheStore, fetcher: &Arc<dyn Fetcher>, request: &Request,
) -> Result<Served, Error> {
    let cached = store.match_request(request).await.unwrap_or_else(|e| {
        tracing::warn!(store = store.name(), error = %e, "store read failed for {}", request);
        None
    });

    if let Some(hit) = cached {
        tracing::debug!(store = store.name(), "cache hit for {}", request);
        let revalidation = Revalidation::spawn(refresh(store.clone(), Arc::clone(fetcher), request.clone()));
        return Ok(Served { response: hit.response, source: ResponseSource::Cache, revalidation: Some(revalidation) });
    }

    tracing::debug!(store = store.name(), "cache miss for {}", request);
    let response = fetcher.fetch(request).await?;
    remember(store, request, &response).await;
    Ok(Served::fresh(response))
}

async fn refresh(store: CacheStore, fetcher: Arc<dyn Fetcher>, request: Request) {
    match fetcher.fetch(&request).await {
        Ok(response) => {
            remember(&store, &request, &response).await;
        }
        Err(e) => tracing::debug!(error = %e, "background refresh failed for {}", request),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Reply, StubFetcher};
    use std::time::Duration;
    use swcache_core::{CacheDb, Response};
    use url::Url;

    const CSS: &str = "http://localhost:5000/static/app.css";

    fn request() -> Request {
        Request::get(Url::parse(CSS).unwrap())
    }

    async fn store_with(body: Option<&str>) -> CacheStore {
        let db = CacheDb::open_in_memory().await.unwrap();
        let store = db.open_store("menino-alho-v1").await.unwrap();
        if let Some(body) = body {
            store.put(&request(), &Response::new(CSS, 200, body)).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_hit_does_not_wait_on_network() {
        let store = store_with(Some("cached")).await;
        let fetcher: Arc<dyn Fetcher> = Arc::new(StubFetcher::new().reply(CSS, Reply::Hang));

        let served = tokio::time::timeout(Duration::from_secs(2), stale_while_revalidate(&store, &fetcher, &request()))
            .await
            .expect("hit must not block on the network")
            .unwrap();

        assert_eq!(served.response.text(), "cached");
        assert_eq!(served.source, ResponseSource::Cache);
        assert!(served.revalidation.is_some());
    }

    #[tokio::test]
    async fn test_miss_fetches_and_stores() {
        let store = store_with(None).await;
        let fetcher: Arc<dyn Fetcher> = Arc::new(StubFetcher::new().reply(CSS, Reply::Status(200, "fresh")));

        let served = stale_while_revalidate(&store, &fetcher, &request()).await.unwrap();

        assert_eq!(served.response.text(), "fresh");
        assert_eq!(served.source, ResponseSource::Network);
        assert!(served.revalidation.is_none());
        let stored = store.match_request(&request()).await.unwrap().unwrap();
        assert_eq!(stored.response.text(), "fresh");
    }

    #[tokio::test]
    async fn test_hit_then_refresh_updates_next_request() {
        let store = store_with(Some("A")).await;
        let fetcher: Arc<dyn Fetcher> = Arc::new(StubFetcher::new().reply(CSS, Reply::Status(200, "B")));

        let first = stale_while_revalidate(&store, &fetcher, &request()).await.unwrap();
        assert_eq!(first.response.text(), "A");
        first.revalidation.unwrap().settled().await;

        let second = stale_while_revalidate(&store, &fetcher, &request()).await.unwrap();
        assert_eq!(second.response.text(), "B");
        second.revalidation.unwrap().settled().await;
    }

    #[tokio::test]
    async fn test_refresh_runs_after_caller_returns() {
        let store = store_with(Some("A")).await;
        let stub = Arc::new(StubFetcher::new().reply(CSS, Reply::Gated("B")));
        let fetcher: Arc<dyn Fetcher> = stub.clone();

        let served = stale_while_revalidate(&store, &fetcher, &request()).await.unwrap();
        assert_eq!(served.response.text(), "A");
        let current = store.match_request(&request()).await.unwrap().unwrap();
        assert_eq!(current.response.text(), "A");

        stub.release.notify_one();
        served.revalidation.unwrap().settled().await;

        let current = store.match_request(&request()).await.unwrap().unwrap();
        assert_eq!(current.response.text(), "B");
    }

    #[tokio::test]
    async fn test_refresh_failure_is_swallowed() {
        let store = store_with(Some("A")).await;
        let fetcher: Arc<dyn Fetcher> = Arc::new(StubFetcher::new().reply(CSS, Reply::Fail));

        let served = stale_while_revalidate(&store, &fetcher, &request()).await.unwrap();
        assert_eq!(served.response.text(), "A");
        served.revalidation.unwrap().settled().await;

        let current = store.match_request(&request()).await.unwrap().unwrap();
        assert_eq!(current.response.text(), "A");
    }

    #[tokio::test]
    async fn test_refresh_error_status_keeps_entry() {
        let store = store_with(Some("A")).await;
        let fetcher: Arc<dyn Fetcher> = Arc::new(StubFetcher::new().reply(CSS, Reply::Status(404, "gone")));

        let served = stale_while_revalidate(&store, &fetcher, &request()).await.unwrap();
        served.revalidation.unwrap().settled().await;

        let current = store.match_request(&request()).await.unwrap().unwrap();
        assert_eq!(current.response.text(), "A");
    }

    #[tokio::test]
    async fn test_miss_network_failure_propagates() {
        let store = store_with(None).await;
        let fetcher: Arc<dyn Fetcher> = Arc::new(StubFetcher::new().reply(CSS, Reply::Fail));

        let result = stale_while_revalidate(&store, &fetcher, &request()).await;
        assert!(matches!(result, Err(Error::Network(_))));
        assert!(store.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_miss_error_status_returned_not_stored() {
        let store = store_with(None).await;
        let fetcher: Arc<dyn Fetcher> = Arc::new(StubFetcher::new().reply(CSS, Reply::Status(404, "missing")));

        let served = stale_while_revalidate(&store, &fetcher, &request()).await.unwrap();
        assert_eq!(served.response.status, 404);
        assert!(store.is_empty().await.unwrap());
    }
}
