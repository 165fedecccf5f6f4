//! Network-first: prefer a live response, fall back to the store.

use std::sync::Arc;

use swcache_core::{CacheStore, Error, Request};

use super::{ResponseSource, Served, remember};
use crate::fetch::Fetcher;

/// Fetch from the network, falling back to the stored copy only when no
/// response was obtainable at all.
///
/// Any HTTP status counts as a response: a 500 is returned as-is and leaves
/// the store untouched. With no stored copy the network error is returned.
pub async fn network_first(store: &CacheStore, fetcher: &Arc<dyn Fetcher>, request: &Request) -> Result<Served, Error> {
    let err = match fetcher.fetch(request).await {
        Ok(response) => {
            remember(store, request, &response).await;
            return Ok(Served::fresh(response));
        }
        Err(e) if e.is_network() => e,
        Err(e) => return Err(e),
    };

    match store.match_request(request).await {
        Ok(Some(hit)) => {
            tracing::info!(store = store.name(), error = %err, "network failed, serving stored {}", request);
            Ok(Served { response: hit.response, source: ResponseSource::Fallback, revalidation: None })
        }
        Ok(None) => Err(err),
        Err(store_err) => {
            tracing::warn!(store = store.name(), error = %store_err, "store read failed for {}", request);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Reply, StubFetcher};
    use swcache_core::{CacheDb, Response};
    use url::Url;

    const PAGE: &str = "http://localhost:5000/vendas";

    fn request() -> Request {
        Request::get(Url::parse(PAGE).unwrap())
    }

    async fn store_with(body: Option<&str>) -> CacheStore {
        let db = CacheDb::open_in_memory().await.unwrap();
        let store = db.open_store("menino-alho-v1").await.unwrap();
        if let Some(body) = body {
            store.put(&request(), &Response::new(PAGE, 200, body)).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_success_returns_and_stores() {
        let store = store_with(Some("old")).await;
        let fetcher: Arc<dyn Fetcher> = Arc::new(StubFetcher::new().reply(PAGE, Reply::Status(200, "new")));

        let served = network_first(&store, &fetcher, &request()).await.unwrap();

        assert_eq!(served.response.text(), "new");
        assert_eq!(served.source, ResponseSource::Network);
        let stored = store.match_request(&request()).await.unwrap().unwrap();
        assert_eq!(stored.response.text(), "new");
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_store() {
        let store = store_with(Some("A")).await;
        let fetcher: Arc<dyn Fetcher> = Arc::new(StubFetcher::new().reply(PAGE, Reply::Fail));

        let served = network_first(&store, &fetcher, &request()).await.unwrap();

        assert_eq!(served.response.text(), "A");
        assert_eq!(served.source, ResponseSource::Fallback);
    }

    #[tokio::test]
    async fn test_failure_without_stored_copy_fails() {
        let store = store_with(None).await;
        let fetcher: Arc<dyn Fetcher> = Arc::new(StubFetcher::new().reply(PAGE, Reply::Fail));

        let result = network_first(&store, &fetcher, &request()).await;
        assert!(matches!(result, Err(Error::Network(_))));
    }

    #[tokio::test]
    async fn test_server_error_returned_and_not_stored() {
        let store = store_with(Some("A")).await;
        let fetcher: Arc<dyn Fetcher> = Arc::new(StubFetcher::new().reply(PAGE, Reply::Status(500, "boom")));

        let served = network_first(&store, &fetcher, &request()).await.unwrap();

        assert_eq!(served.response.status, 500);
        assert_eq!(served.source, ResponseSource::Network);
        let stored = store.match_request(&request()).await.unwrap().unwrap();
        assert_eq!(stored.response.text(), "A");
    }

    #[tokio::test]
    async fn test_store_write_failure_still_returns_response() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let store = db.open_store("menino-alho-v1").await.unwrap();
        db.delete_store("menino-alho-v1").await.unwrap();
        let fetcher: Arc<dyn Fetcher> = Arc::new(StubFetcher::new().reply(PAGE, Reply::Status(200, "new")));

        let served = network_first(&store, &fetcher, &request()).await.unwrap();
        assert_eq!(served.response.text(), "new");
    }
}
