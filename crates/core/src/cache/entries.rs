//! Entry operations on a single store.
//!
//! Only GET requests are ever stored: `put` rejects other methods and
//! `match_request` answers `None` for them without touching the database.

use std::collections::BTreeMap;

use super::hash::compute_cache_key;
use super::stores::CacheStore;
use crate::{Error, Request, Response};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A response read back from a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResponse {
    pub response: Response,
    /// RFC 3339 time of the last write for this key.
    pub stored_at: String,
}

/// Request identity as stored: method plus URL without fragment.
fn identity(request: &Request) -> (String, String) {
    let mut url = request.url().clone();
    url.set_fragment(None);
    (request.method().to_string(), url.to_string())
}

impl CacheStore {
    /// Look up the stored response for a request.
    pub async fn match_request(&self, request: &Request) -> Result<Option<StoredResponse>, Error> {
        if !request.is_get() {
            return Ok(None);
        }

        let (method, url) = identity(request);
        let key_hash = compute_cache_key(&method, &url);
        let store = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT url, status, headers_json, body, stored_at
                     FROM cache_entries WHERE store_name = ?1 AND key_hash = ?2",
                )?;

                let result = stmt.query_row(params![store, key_hash], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, u16>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Vec<u8>>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                });

                match result {
                    Ok((url, status, headers_json, body, stored_at)) => {
                        let headers: BTreeMap<String, String> = serde_json::from_str(&headers_json)?;
                        Ok(Some(StoredResponse { response: Response { url, status, headers, body }, stored_at }))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Store a response for a request, replacing any previous entry.
    pub async fn put(&self, request: &Request, response: &Response) -> Result<(), Error> {
        if !request.is_get() {
            return Err(Error::InvalidInput(format!("refusing to store {} request", request.method())));
        }

        let (method, url) = identity(request);
        let key_hash = compute_cache_key(&method, &url);
        let headers_json = serde_json::to_string(&response.headers)?;
        let status = response.status;
        let body = response.body.clone();
        let stored_at = chrono::Utc::now().to_rfc3339();
        let store = self.name.clone();

        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO cache_entries (
                        store_name, key_hash, method, url, status, headers_json, body, stored_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                    ON CONFLICT(store_name, key_hash) DO UPDATE SET
                        status = excluded.status,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![store, key_hash, method, url, status, headers_json, body, stored_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Remove the entry for a request.
    ///
    /// Returns false if nothing was stored for it.
    pub async fn delete(&self, request: &Request) -> Result<bool, Error> {
        let (method, url) = identity(request);
        let key_hash = compute_cache_key(&method, &url);
        let store = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute(
                    "DELETE FROM cache_entries WHERE store_name = ?1 AND key_hash = ?2",
                    params![store, key_hash],
                )?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// URLs of every stored entry, oldest write first.
    pub async fn keys(&self) -> Result<Vec<String>, Error> {
        let store = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT url FROM cache_entries WHERE store_name = ?1 ORDER BY stored_at ASC, url ASC",
                )?;
                let urls = stmt
                    .query_map(params![store], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(urls)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries in this store.
    pub async fn len(&self) -> Result<usize, Error> {
        let store = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<usize, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM cache_entries WHERE store_name = ?1",
                    params![store],
                    |row| row.get(0),
                )?;
                Ok(count as usize)
            })
            .await
            .map_err(Error::from)
    }

    pub async fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len().await? == 0)
    }
}
