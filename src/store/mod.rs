//! Object-store client seam.
//!
//! The namespace layer never touches a backend directly; everything goes
//! through the [`ObjectStore`] trait so backends (and test doubles) are
//! swappable. The native data model is a flat map from string keys to
//! blobs — there are no directories, and `list` enumerates only the
//! immediate children of a prefix.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::io;
use thiserror::Error;
use uuid::Uuid;

/// One record returned by a listing call. `name` is a single segment
/// relative to the queried prefix. Synthetic folder entries carry no `id`
/// and no `size`; real objects carry both.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub name: String,
    pub id: Option<Uuid>,
    pub size: Option<i64>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    NameAsc,
    NameDesc,
}

#[derive(Debug, Clone, Copy)]
pub struct ListOptions {
    pub limit: usize,
    pub offset: usize,
    pub sort: SortOrder,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            limit: 1000,
            offset: 0,
            sort: SortOrder::NameAsc,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("bucket `{0}` not found")]
    BucketNotFound(String),
    #[error("bucket `{0}` already exists")]
    BucketAlreadyExists(String),
    #[error("bucket `{name}` invalid: {reason}")]
    InvalidBucketName { name: String, reason: String },
    #[error("object `{key}` not found in bucket `{bucket}`")]
    ObjectNotFound { bucket: String, key: String },
    #[error("invalid object key `{0}`")]
    InvalidKey(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("{0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Flat key/blob store with bucket scoping.
///
/// `remove` failing for a key means the target must be assumed still
/// present. Overwrite semantics for `upload` are last-writer-wins.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List immediate children of `prefix`, sorted per `opts`. One page
    /// only; callers own any pagination policy.
    async fn list(&self, bucket: &str, prefix: &str, opts: ListOptions) -> StoreResult<Vec<Entry>>;

    async fn upload(&self, bucket: &str, key: &str, data: Bytes) -> StoreResult<()>;

    async fn download(&self, bucket: &str, key: &str) -> StoreResult<Bytes>;

    async fn remove(&self, bucket: &str, keys: &[String]) -> StoreResult<()>;

    async fn list_buckets(&self) -> StoreResult<Vec<String>>;

    async fn create_bucket(&self, name: &str) -> StoreResult<()>;

    async fn delete_bucket(&self, name: &str) -> StoreResult<()>;
}

/// Fold the full set of keys living under `prefix` into immediate-child
/// entries: a key directly under the prefix becomes a file entry with its
/// metadata, a deeper key contributes one synthetic folder entry (no id,
/// no size) named after its first segment. Shared by both backends so the
/// classifier upstream sees identical shapes.
pub(crate) fn derive_entries<I>(prefix: &str, rows: I, opts: ListOptions) -> Vec<Entry>
where
    I: IntoIterator<Item = (String, Uuid, i64, DateTime<Utc>)>,
{
    let skip = if prefix.is_empty() { 0 } else { prefix.len() + 1 };
    let mut children: BTreeMap<String, Entry> = BTreeMap::new();
    for (key, id, size, updated_at) in rows {
        if key.len() <= skip && !prefix.is_empty() {
            continue;
        }
        let rel = &key[skip..];
        match rel.split_once('/') {
            Some((head, _)) => {
                // A file child with the same name wins over the synthetic
                // folder entry; both can exist in a flat keyspace.
                children.entry(head.to_string()).or_insert_with(|| Entry {
                    name: head.to_string(),
                    id: None,
                    size: None,
                    updated_at: None,
                });
            }
            None => {
                children.insert(
                    rel.to_string(),
                    Entry {
                        name: rel.to_string(),
                        id: Some(id),
                        size: Some(size),
                        updated_at: Some(updated_at),
                    },
                );
            }
        }
    }
    let mut entries: Vec<Entry> = children.into_values().collect();
    if opts.sort == SortOrder::NameDesc {
        entries.reverse();
    }
    entries.into_iter().skip(opts.offset).take(opts.limit).collect()
}
