//! Recursive subtree copy.
//!
//! The store offers no server-side copy, so every file is a full
//! download followed by an upload — memory holds one object at a time,
//! never the whole subtree. Destination placeholders are written eagerly
//! when a folder is entered so empty folders materialize; that write is
//! best-effort, a folder that ends up non-empty does not need it.

use crate::models::node::FileNode;
use crate::namespace::walk::{TreeVisitor, TreeWalker};
use crate::namespace::{ItemError, NamespaceError, PLACEHOLDER, path};
use crate::store::{ObjectStore, StoreError};
use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Aggregate result of a recursive copy. `copied` counts files only,
/// never folders or placeholders synthesized along the way.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CopyOutcome {
    pub copied: usize,
    pub errors: Vec<ItemError>,
    pub cancelled: bool,
}

pub struct RecursiveCopier {
    store: Arc<dyn ObjectStore>,
    walker: TreeWalker,
}

struct CopyVisitor<'a> {
    store: &'a Arc<dyn ObjectStore>,
    src_bucket: &'a str,
    src_root: &'a str,
    dst_bucket: &'a str,
    dst_root: &'a str,
    outcome: CopyOutcome,
}

#[async_trait]
impl TreeVisitor for CopyVisitor<'_> {
    async fn enter_folder(&mut self, rel: &str) {
        let placeholder = path::join_path([self.dst_root, rel, PLACEHOLDER]);
        if let Err(err) = self
            .store
            .upload(self.dst_bucket, &placeholder, Bytes::new())
            .await
        {
            // Swallowed: an empty source folder whose placeholder write
            // fails simply does not appear at the destination.
            tracing::debug!(
                "placeholder upload {}/{} failed: {}",
                self.dst_bucket,
                placeholder,
                err
            );
        }
    }

    async fn visit_file(&mut self, rel: &str, _file: &FileNode) {
        let src_key = path::join_path([self.src_root, rel]);
        let dst_key = path::join_path([self.dst_root, rel]);
        match copy_one(self.store, self.src_bucket, &src_key, self.dst_bucket, &dst_key).await {
            Ok(()) => self.outcome.copied += 1,
            Err(err) => self
                .outcome
                .errors
                .push(ItemError::transfer(src_key, dst_key, err.to_string())),
        }
    }

    async fn leave_folder(&mut self, _rel: &str) {}
}

/// Full download, then upload. One object buffered at a time.
async fn copy_one(
    store: &Arc<dyn ObjectStore>,
    src_bucket: &str,
    src_key: &str,
    dst_bucket: &str,
    dst_key: &str,
) -> Result<(), StoreError> {
    let data = store.download(src_bucket, src_key).await?;
    store.upload(dst_bucket, dst_key, data).await
}

impl RecursiveCopier {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            walker: TreeWalker::new(store.clone()),
            store,
        }
    }

    /// Copy one file. Used directly for single-file transfers.
    pub async fn copy_file(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> Result<(), StoreError> {
        copy_one(&self.store, src_bucket, src_key, dst_bucket, dst_key).await
    }

    /// Copy everything under `src_prefix` to the corresponding paths
    /// under `dst_prefix`, recreating placeholders so empty folders
    /// survive the trip. Per-file failures are recorded and siblings
    /// continue. Same-bucket and cross-bucket copies share this path;
    /// overlap guarding belongs to the orchestrator above.
    pub async fn copy_subtree(
        &self,
        src_bucket: &str,
        src_prefix: &str,
        dst_bucket: &str,
        dst_prefix: &str,
        cancel: &CancellationToken,
    ) -> Result<CopyOutcome, NamespaceError> {
        let mut visitor = CopyVisitor {
            store: &self.store,
            src_bucket,
            src_root: src_prefix,
            dst_bucket,
            dst_root: dst_prefix,
            outcome: CopyOutcome::default(),
        };
        let report = self
            .walker
            .walk(src_bucket, src_prefix, cancel, &mut visitor)
            .await?;

        let mut outcome = visitor.outcome;
        for failure in report.failed_listings {
            outcome.errors.push(ItemError::new(
                failure.prefix,
                format!("listing failed: {}", failure.source),
            ));
        }
        if let Some(rel) = report.cancelled_at {
            outcome.cancelled = true;
            outcome.errors.push(ItemError::new(
                path::join_path([src_prefix, rel.as_str()]),
                "operation cancelled before remaining items were visited",
            ));
        }
        Ok(outcome)
    }
}
