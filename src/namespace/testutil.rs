//! Test doubles for the namespace layer: a failure-injecting wrapper
//! around `MemoryStore` so partial-failure paths can be exercised
//! deterministically.

use crate::store::{
    Entry, ListOptions, MemoryStore, ObjectStore, StoreError, StoreResult,
};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

pub(crate) async fn seed(store: &Arc<MemoryStore>, bucket: &str, keys: &[&str]) {
    for key in keys {
        store
            .upload(bucket, key, Bytes::from(key.as_bytes().to_vec()))
            .await
            .unwrap();
    }
}

/// Delegates to a `MemoryStore`, failing specific (bucket, target)
/// pairs on demand.
pub(crate) struct FlakyStore {
    inner: Arc<MemoryStore>,
    /// Remaining successful list calls per (bucket, prefix); zero fails.
    fail_list: Mutex<HashMap<(String, String), usize>>,
    fail_upload: Mutex<HashSet<(String, String)>>,
    fail_download: Mutex<HashSet<(String, String)>>,
    fail_remove: Mutex<HashSet<(String, String)>>,
}

impl FlakyStore {
    pub(crate) fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            fail_list: Mutex::default(),
            fail_upload: Mutex::default(),
            fail_download: Mutex::default(),
            fail_remove: Mutex::default(),
        }
    }

    pub(crate) async fn fail_list(&self, bucket: &str, prefix: &str) {
        self.fail_list_after(bucket, prefix, 0).await;
    }

    /// Let `successes` list calls for the pair go through, then fail.
    pub(crate) async fn fail_list_after(&self, bucket: &str, prefix: &str, successes: usize) {
        self.fail_list
            .lock()
            .await
            .insert((bucket.to_string(), prefix.to_string()), successes);
    }

    pub(crate) async fn fail_upload(&self, bucket: &str, key: &str) {
        self.fail_upload
            .lock()
            .await
            .insert((bucket.to_string(), key.to_string()));
    }

    pub(crate) async fn fail_download(&self, bucket: &str, key: &str) {
        self.fail_download
            .lock()
            .await
            .insert((bucket.to_string(), key.to_string()));
    }

    pub(crate) async fn fail_remove(&self, bucket: &str, key: &str) {
        self.fail_remove
            .lock()
            .await
            .insert((bucket.to_string(), key.to_string()));
    }

    async fn armed(set: &Mutex<HashSet<(String, String)>>, bucket: &str, target: &str) -> bool {
        set.lock()
            .await
            .contains(&(bucket.to_string(), target.to_string()))
    }
}

#[async_trait]
impl ObjectStore for FlakyStore {
    async fn list(&self, bucket: &str, prefix: &str, opts: ListOptions) -> StoreResult<Vec<Entry>> {
        {
            let mut armed = self.fail_list.lock().await;
            let pair = (bucket.to_string(), prefix.trim_matches('/').to_string());
            if let Some(remaining) = armed.get_mut(&pair) {
                if *remaining == 0 {
                    return Err(StoreError::Backend("injected list failure".into()));
                }
                *remaining -= 1;
            }
        }
        self.inner.list(bucket, prefix, opts).await
    }

    async fn upload(&self, bucket: &str, key: &str, data: Bytes) -> StoreResult<()> {
        if Self::armed(&self.fail_upload, bucket, key).await {
            return Err(StoreError::Backend("injected upload failure".into()));
        }
        self.inner.upload(bucket, key, data).await
    }

    async fn download(&self, bucket: &str, key: &str) -> StoreResult<Bytes> {
        if Self::armed(&self.fail_download, bucket, key).await {
            return Err(StoreError::Backend("injected download failure".into()));
        }
        self.inner.download(bucket, key).await
    }

    async fn remove(&self, bucket: &str, keys: &[String]) -> StoreResult<()> {
        for key in keys {
            if Self::armed(&self.fail_remove, bucket, key).await {
                return Err(StoreError::Backend("injected remove failure".into()));
            }
        }
        self.inner.remove(bucket, keys).await
    }

    async fn list_buckets(&self) -> StoreResult<Vec<String>> {
        self.inner.list_buckets().await
    }

    async fn create_bucket(&self, name: &str) -> StoreResult<()> {
        self.inner.create_bucket(name).await
    }

    async fn delete_bucket(&self, name: &str) -> StoreResult<()> {
        self.inner.delete_bucket(name).await
    }
}
