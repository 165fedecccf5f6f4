//! Named store registry.
//!
//! Store names carry the deployed version, so creating and deleting a name
//! is how versions come and go. Only the lifecycle owner should call the
//! registry methods on [`CacheDb`]; strategies get a [`CacheStore`] handle.

use super::connection::CacheDb;
use crate::Error;
use tokio_rusqlite::params;

/// Handle to one named store.
///
/// Can read and write entries but cannot delete the store itself.
#[derive(Clone, Debug)]
pub struct CacheStore {
    pub(crate) db: CacheDb,
    pub(crate) name: String,
}

impl CacheStore {
    /// The store name, e.g. `menino-alho-v1`.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl CacheDb {
    /// Open the named store, creating it if absent.
    pub async fn open_store(&self, name: &str) -> Result<CacheStore, Error> {
        if name.trim().is_empty() {
            return Err(Error::InvalidInput("store name cannot be empty".into()));
        }

        let owned = name.to_string();
        let created_at = chrono::Utc::now().to_rfc3339();
        let created = self
            .conn
            .call(move |conn| -> Result<bool, Error> {
                let inserted = conn.execute(
                    "INSERT OR IGNORE INTO cache_stores (name, created_at) VALUES (?1, ?2)",
                    params![owned, created_at],
                )?;
                Ok(inserted > 0)
            })
            .await
            .map_err(Error::from)?;

        if created {
            tracing::debug!(store = name, "created cache store");
        }

        Ok(CacheStore { db: self.clone(), name: name.to_string() })
    }

    /// Get a handle to an existing store without creating it.
    ///
    /// Returns `None` once the store has been deleted.
    pub async fn store(&self, name: &str) -> Result<Option<CacheStore>, Error> {
        if !self.has_store(name).await? {
            return Ok(None);
        }
        Ok(Some(CacheStore { db: self.clone(), name: name.to_string() }))
    }

    /// Check whether a store with this name exists.
    pub async fn has_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM cache_stores WHERE name = ?1)",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// List every store name, oldest first.
    pub async fn store_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM cache_stores ORDER BY created_at ASC, name ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a store and all of its entries.
    ///
    /// Returns false if no store had that name.
    pub async fn delete_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM cache_stores WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_store_creates_once() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let store = db.open_store("app-v1").await.unwrap();
        db.open_store("app-v1").await.unwrap();

        assert_eq!(store.name(), "app-v1");
        assert_eq!(db.store_names().await.unwrap(), vec!["app-v1".to_string()]);
    }

    #[tokio::test]
    async fn test_open_store_empty_name() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let result = db.open_store("  ").await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_delete_store() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_store("app-v1").await.unwrap();
        db.open_store("app-v2").await.unwrap();

        assert!(db.delete_store("app-v1").await.unwrap());
        assert!(!db.delete_store("app-v1").await.unwrap());
        assert!(!db.has_store("app-v1").await.unwrap());
        assert!(db.has_store("app-v2").await.unwrap());
    }

    #[tokio::test]
    async fn test_store_lookup_never_creates() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.store("app-v1").await.unwrap().is_none());
        assert!(db.store_names().await.unwrap().is_empty());

        db.open_store("app-v1").await.unwrap();
        let store = db.store("app-v1").await.unwrap().unwrap();
        assert_eq!(store.name(), "app-v1");

        db.delete_store("app-v1").await.unwrap();
        assert!(db.store("app-v1").await.unwrap().is_none());
        assert!(db.store_names().await.unwrap().is_empty());
    }
}
