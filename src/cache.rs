//! Local key-value store
//!
//! Stands in for the browser's local storage: a fjall keyspace holding
//! postcard-encoded values with an expiry timestamp.

use anyhow::Result;
use fjall::Keyspace;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tokio::task;

#[derive(Serialize, Deserialize)]
struct StoredEntry<T> {
    value: T,
    expires_at: u64, // Unix timestamp (seconds)
}

/// TTL for entries that should outlive any cache policy
pub const PERSISTENT: Duration = Duration::MAX;

pub struct LocalStore {
    store: Keyspace,
    // Serializes read-modify-write cycles in `update`
    write_lock: Mutex<()>,
}

impl Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore").finish_non_exhaustive()
    }
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> Result<Option<Vec<u8>>> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

fn unix_now() -> Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

impl LocalStore {
    /// Open (or create) the store under `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = fjall::Database::builder(&path).open()?;
        let items = db.keyspace("tripsync", fjall::KeyspaceCreateOptions::default)?;
        Ok(Self {
            store: items,
            write_lock: Mutex::new(()),
        })
    }

    /// Stores a serializable value with a time-to-live (TTL).
    #[tracing::instrument(name = "store_put", level = "debug", skip(self, value))]
    pub async fn put<T: Serialize + Send + 'static>(
        &self,
        key: &str,
        value: T,
        ttl: Duration,
    ) -> Result<()> {
        let store = self.store.clone();
        let key = key.as_bytes().to_vec();
        // Saturates, so PERSISTENT entries never expire
        let expires_at = unix_now()?.saturating_add(ttl.as_secs());
        let entry = StoredEntry { value, expires_at };
        let bytes = postcard::to_stdvec(&entry)?;

        task::spawn_blocking(move || store.insert(key, bytes)).await??;
        Ok(())
    }

    /// Retrieves a value if it exists and has not expired.
    /// Returns `None` for misses and expired entries.
    #[tracing::instrument(name = "store_get", level = "debug", skip(self))]
    pub async fn get<T: DeserializeOwned + Send + 'static>(&self, key: &str) -> Result<Option<T>> {
        let store = self.store.clone();
        let key_bytes = key.as_bytes().to_vec();

        let maybe_bytes: Option<Vec<u8>> =
            task::spawn_blocking(move || get_from_store(store, key_bytes)).await??;

        let Some(bytes) = maybe_bytes else {
            tracing::debug!("Key not found");
            return Ok(None);
        };

        let entry: StoredEntry<T> = postcard::from_bytes(&bytes)?;
        if unix_now()? < entry.expires_at {
            tracing::debug!("Key found and still fresh");
            Ok(Some(entry.value))
        } else {
            tracing::debug!("Key found but expired");
            self.remove(key).await?;
            Ok(None)
        }
    }

    /// Read the current value (or `T::default()`), apply `f`, and write the
    /// result back. Concurrent updates on the same store are serialized.
    pub async fn update<T, F>(&self, key: &str, ttl: Duration, f: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Default + Clone + Send + 'static,
        F: FnOnce(&mut T) + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut value: T = self.get(key).await?.unwrap_or_default();
        f(&mut value);
        self.put(key, value.clone(), ttl).await?;
        Ok(value)
    }

    /// Manually removes a key.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let key = key.as_bytes().to_vec();
        let store = self.store.clone();
        task::spawn_blocking(move || store.remove(key)).await??;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_and_get() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();

        store
            .put("greeting", "hello".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        let value: Option<String> = store.get("greeting").await.unwrap();
        assert_eq!(value.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();

        let value: Option<u64> = store.get("nothing").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_dropped() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();

        store.put("short", 7_u64, Duration::ZERO).await.unwrap();
        let value: Option<u64> = store.get("short").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_persistent_entry_survives() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();

        store.put("ledger", vec![1_u8, 2], PERSISTENT).await.unwrap();
        let value: Option<Vec<u8>> = store.get("ledger").await.unwrap();
        assert_eq!(value, Some(vec![1, 2]));
    }

    #[tokio::test]
    async fn test_rejected_write_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        // Keys are limited to 64 KiB
        let key = "k".repeat(70_000);

        assert!(store.put(&key, 1_u32, Duration::from_secs(60)).await.is_err());
        let updated = store
            .update(&key, Duration::from_secs(60), |v: &mut Vec<u32>| v.push(1))
            .await;
        assert!(updated.is_err());
    }

    #[tokio::test]
    async fn test_update_appends() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        let ttl = Duration::from_secs(60);

        store.update("list", ttl, |v: &mut Vec<u32>| v.push(1)).await.unwrap();
        let list = store.update("list", ttl, |v: &mut Vec<u32>| v.push(2)).await.unwrap();
        assert_eq!(list, vec![1, 2]);

        let stored: Option<Vec<u32>> = store.get("list").await.unwrap();
        assert_eq!(stored, Some(vec![1, 2]));
    }
}
