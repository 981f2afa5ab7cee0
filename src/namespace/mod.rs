//! Namespace emulation over a flat key/blob store.
//!
//! Folders do not exist in the backend; they are inferred from key
//! prefixes and kept visible when empty through zero-byte `.keep`
//! placeholder objects. Recursive operations (delete, copy, move) walk
//! the inferred tree one listing at a time and aggregate per-object
//! failures instead of aborting — the backend offers no multi-object
//! transactions, so partial success is the contract.

pub mod copy;
pub mod delete;
pub mod listing;
pub mod path;
pub mod transfer;
pub mod walk;

#[cfg(test)]
pub(crate) mod testutil;

use crate::namespace::copy::RecursiveCopier;
use crate::namespace::delete::{DeleteOutcome, RecursiveDeleter};
use crate::namespace::listing::{Listing, NamespaceLister};
use crate::namespace::transfer::{TransferOrchestrator, TransferReport, TransferRequest};
use crate::store::{ObjectStore, StoreError};
use bytes::Bytes;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Zero-byte marker object that keeps an otherwise key-less folder
/// visible in listings.
pub const PLACEHOLDER: &str = ".keep";

#[derive(Debug, Error)]
pub enum NamespaceError {
    #[error("invalid name `{name}`: {reason}")]
    InvalidName { name: String, reason: &'static str },
    #[error("invalid transfer request: {0}")]
    InvalidTransferRequest(String),
    #[error("listing `{bucket}/{prefix}` failed: {source}")]
    List {
        bucket: String,
        prefix: String,
        #[source]
        source: StoreError,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A per-object failure captured during a batch operation without
/// aborting the remainder. The set of these is what matters, not the
/// order they were recorded in.
#[derive(Debug, Clone, Serialize)]
pub struct ItemError {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dst_key: Option<String>,
    pub cause: String,
}

impl ItemError {
    pub fn new(key: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            dst_key: None,
            cause: cause.into(),
        }
    }

    pub fn transfer(
        src_key: impl Into<String>,
        dst_key: impl Into<String>,
        cause: impl Into<String>,
    ) -> Self {
        Self {
            key: src_key.into(),
            dst_key: Some(dst_key.into()),
            cause: cause.into(),
        }
    }
}

impl fmt::Display for ItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.dst_key {
            Some(dst) => write!(f, "{} -> {}: {}", self.key, dst, self.cause),
            None => write!(f, "{}: {}", self.key, self.cause),
        }
    }
}

/// Bounded preview of failures for user-facing reports; callers decide
/// whether to retry the whole operation from the counts.
pub fn preview(errors: &[ItemError], limit: usize) -> Vec<String> {
    errors.iter().take(limit).map(ItemError::to_string).collect()
}

/// One handle over every namespace operation, wired around a shared
/// store client. Cloneable router state: nothing here caches anything
/// between calls.
#[derive(Clone)]
pub struct NamespaceService {
    store: Arc<dyn ObjectStore>,
}

impl NamespaceService {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Arc<dyn ObjectStore> {
        self.store.clone()
    }

    /// One page of folders and files under `prefix`.
    pub async fn browse(&self, bucket: &str, prefix: &str) -> Result<Listing, NamespaceError> {
        NamespaceLister::new(self.store.clone())
            .list(bucket, prefix)
            .await
    }

    /// Create a folder by uploading its placeholder. Returns the
    /// placeholder key.
    pub async fn create_folder(
        &self,
        bucket: &str,
        parent: &str,
        name: &str,
    ) -> Result<String, NamespaceError> {
        path::validate_segment(name)?;
        let placeholder = path::join_path([parent, name, PLACEHOLDER]);
        self.store
            .upload(bucket, &placeholder, Bytes::new())
            .await?;
        Ok(placeholder)
    }

    pub async fn upload_file(
        &self,
        bucket: &str,
        parent: &str,
        filename: &str,
        data: Bytes,
    ) -> Result<String, NamespaceError> {
        path::validate_segment(filename)?;
        let key = path::join_path([parent, filename]);
        self.store.upload(bucket, &key, data).await?;
        Ok(key)
    }

    pub async fn download_file(&self, bucket: &str, key: &str) -> Result<Bytes, NamespaceError> {
        Ok(self.store.download(bucket, key).await?)
    }

    pub async fn delete_file(&self, bucket: &str, key: &str) -> Result<(), NamespaceError> {
        Ok(self.store.remove(bucket, &[key.to_string()]).await?)
    }

    /// Delete everything under `prefix`. The caller guards against an
    /// empty prefix; bucket-emptying is `empty_bucket`.
    pub async fn delete_folder(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<DeleteOutcome, NamespaceError> {
        RecursiveDeleter::new(self.store.clone())
            .delete_subtree(bucket, prefix, &CancellationToken::new())
            .await
    }

    pub async fn empty_bucket(&self, bucket: &str) -> Result<DeleteOutcome, NamespaceError> {
        RecursiveDeleter::new(self.store.clone())
            .empty_bucket(bucket, &CancellationToken::new())
            .await
    }

    pub async fn transfer(&self, req: &TransferRequest) -> Result<TransferReport, NamespaceError> {
        TransferOrchestrator::new(self.store.clone())
            .transfer(req, &CancellationToken::new())
            .await
    }

    pub async fn list_buckets(&self) -> Result<Vec<String>, NamespaceError> {
        Ok(self.store.list_buckets().await?)
    }

    pub async fn create_bucket(&self, name: &str) -> Result<(), NamespaceError> {
        path::validate_segment(name)?;
        Ok(self.store.create_bucket(name).await?)
    }

    /// Empty the bucket through the recursive deleter, then drop the
    /// bucket itself. The emptying outcome is returned so partial
    /// failures stay visible even when the bucket delete succeeds.
    pub async fn delete_bucket(&self, name: &str) -> Result<DeleteOutcome, NamespaceError> {
        let outcome = self.empty_bucket(name).await?;
        self.store.delete_bucket(name).await?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn create_folder_uploads_placeholder() {
        let service = NamespaceService::new(Arc::new(MemoryStore::with_buckets(["b1"])));
        let key = service.create_folder("b1", "docs", "reports").await.unwrap();
        assert_eq!(key, "docs/reports/.keep");
        let data = service.download_file("b1", &key).await.unwrap();
        assert!(data.is_empty());
    }

    #[tokio::test]
    async fn create_folder_rejects_bad_name() {
        let service = NamespaceService::new(Arc::new(MemoryStore::with_buckets(["b1"])));
        let err = service.create_folder("b1", "", "a/b").await.unwrap_err();
        assert!(matches!(err, NamespaceError::InvalidName { .. }));
    }

    #[tokio::test]
    async fn empty_folder_round_trip() {
        let service = NamespaceService::new(Arc::new(MemoryStore::with_buckets(["b1"])));
        service.create_folder("b1", "", "drafts").await.unwrap();

        let listing = service.browse("b1", "").await.unwrap();
        assert_eq!(listing.folders.len(), 1);
        assert_eq!(listing.folders[0].name, "drafts");
        assert!(listing.files.is_empty());

        // A real file under it makes the placeholder irrelevant to
        // classification, but only a folder delete removes it.
        service
            .upload_file("b1", "drafts", "a.txt", Bytes::from_static(b"a"))
            .await
            .unwrap();
        let listing = service.browse("b1", "").await.unwrap();
        assert_eq!(listing.folders.len(), 1);

        let outcome = service.delete_folder("b1", "drafts").await.unwrap();
        assert!(outcome.errors.is_empty());
        let listing = service.browse("b1", "").await.unwrap();
        assert!(listing.folders.is_empty() && listing.files.is_empty());
    }

    #[test]
    fn preview_is_bounded() {
        let errors: Vec<ItemError> = (0..10)
            .map(|i| ItemError::new(format!("k{i}"), "boom"))
            .collect();
        assert_eq!(preview(&errors, 3).len(), 3);
    }
}
