//! In-process object store backed by `BTreeMap`s.
//!
//! Shares listing semantics with the SQLite backend through
//! `derive_entries`, which keeps the folder heuristic upstream honest no
//! matter which backend is underneath. Used by tests and local demos.

use crate::store::{
    Entry, ListOptions, ObjectStore, StoreError, StoreResult, derive_entries,
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Clone, Debug)]
struct StoredObject {
    id: Uuid,
    data: Bytes,
    updated_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct MemoryStore {
    buckets: Mutex<HashMap<String, BTreeMap<String, StoredObject>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor with pre-created buckets.
    pub fn with_buckets<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut buckets = HashMap::new();
        for name in names {
            buckets.insert(name.into(), BTreeMap::new());
        }
        Self {
            buckets: Mutex::new(buckets),
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list(&self, bucket: &str, prefix: &str, opts: ListOptions) -> StoreResult<Vec<Entry>> {
        let guard = self.buckets.lock().await;
        let objects = guard
            .get(bucket)
            .ok_or_else(|| StoreError::BucketNotFound(bucket.to_string()))?;
        let trimmed = prefix.trim_matches('/');
        let rows = objects
            .iter()
            .filter(|(key, _)| {
                trimmed.is_empty() || key.strip_prefix(trimmed).is_some_and(|r| r.starts_with('/'))
            })
            .map(|(key, obj)| (key.clone(), obj.id, obj.data.len() as i64, obj.updated_at))
            .collect::<Vec<_>>();
        Ok(derive_entries(trimmed, rows, opts))
    }

    async fn upload(&self, bucket: &str, key: &str, data: Bytes) -> StoreResult<()> {
        if key.is_empty() || key.starts_with('/') || key.contains("..") {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        let mut guard = self.buckets.lock().await;
        let objects = guard
            .get_mut(bucket)
            .ok_or_else(|| StoreError::BucketNotFound(bucket.to_string()))?;
        objects.insert(
            key.to_string(),
            StoredObject {
                id: Uuid::new_v4(),
                data,
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn download(&self, bucket: &str, key: &str) -> StoreResult<Bytes> {
        let guard = self.buckets.lock().await;
        let objects = guard
            .get(bucket)
            .ok_or_else(|| StoreError::BucketNotFound(bucket.to_string()))?;
        objects
            .get(key)
            .map(|obj| obj.data.clone())
            .ok_or_else(|| StoreError::ObjectNotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    async fn remove(&self, bucket: &str, keys: &[String]) -> StoreResult<()> {
        let mut guard = self.buckets.lock().await;
        let objects = guard
            .get_mut(bucket)
            .ok_or_else(|| StoreError::BucketNotFound(bucket.to_string()))?;
        for key in keys {
            if objects.remove(key).is_none() {
                return Err(StoreError::ObjectNotFound {
                    bucket: bucket.to_string(),
                    key: key.clone(),
                });
            }
        }
        Ok(())
    }

    async fn list_buckets(&self) -> StoreResult<Vec<String>> {
        let guard = self.buckets.lock().await;
        let mut names: Vec<String> = guard.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn create_bucket(&self, name: &str) -> StoreResult<()> {
        if name.is_empty() || name.contains('/') {
            return Err(StoreError::InvalidBucketName {
                name: name.to_string(),
                reason: "must be a single non-empty segment".into(),
            });
        }
        let mut guard = self.buckets.lock().await;
        if guard.contains_key(name) {
            return Err(StoreError::BucketAlreadyExists(name.to_string()));
        }
        guard.insert(name.to_string(), BTreeMap::new());
        Ok(())
    }

    async fn delete_bucket(&self, name: &str) -> StoreResult<()> {
        let mut guard = self.buckets.lock().await;
        if guard.remove(name).is_none() {
            return Err(StoreError::BucketNotFound(name.to_string()));
        }
        Ok(())
    }
}
