//! Recursive subtree deletion.
//!
//! Every file under the prefix is removed with its own store call; a
//! failed removal is recorded and the walk continues. After a folder's
//! children are processed its `.keep` placeholder is swept — a missing
//! placeholder is normal, folders that were never empty never had one.

use crate::models::node::FileNode;
use crate::namespace::listing::NamespaceLister;
use crate::namespace::walk::{TreeVisitor, TreeWalker};
use crate::namespace::{ItemError, NamespaceError, PLACEHOLDER, path};
use crate::store::{ObjectStore, StoreError};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Aggregate result of a recursive delete. `deleted` counts successful
/// removals only; failed keys remain in the bucket and are reported, not
/// retried.
#[derive(Debug, Default, Clone, Serialize)]
pub struct DeleteOutcome {
    pub deleted: usize,
    pub errors: Vec<ItemError>,
    pub cancelled: bool,
}

impl DeleteOutcome {
    fn absorb(&mut self, other: DeleteOutcome) {
        self.deleted += other.deleted;
        self.errors.extend(other.errors);
        self.cancelled |= other.cancelled;
    }
}

pub struct RecursiveDeleter {
    store: Arc<dyn ObjectStore>,
    walker: TreeWalker,
}

struct DeleteVisitor<'a> {
    store: &'a Arc<dyn ObjectStore>,
    bucket: &'a str,
    root: &'a str,
    outcome: DeleteOutcome,
}

#[async_trait]
impl TreeVisitor for DeleteVisitor<'_> {
    async fn enter_folder(&mut self, _rel: &str) {}

    async fn visit_file(&mut self, rel: &str, _file: &FileNode) {
        let key = path::join_path([self.root, rel]);
        match self.store.remove(self.bucket, &[key.clone()]).await {
            Ok(()) => self.outcome.deleted += 1,
            Err(err) => self.outcome.errors.push(ItemError::new(key, err.to_string())),
        }
    }

    async fn leave_folder(&mut self, rel: &str) {
        let key = path::join_path([self.root, rel, PLACEHOLDER]);
        match self.store.remove(self.bucket, &[key.clone()]).await {
            Ok(()) => {}
            Err(StoreError::ObjectNotFound { .. }) => {}
            Err(err) => self.outcome.errors.push(ItemError::new(key, err.to_string())),
        }
    }
}

impl RecursiveDeleter {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            walker: TreeWalker::new(store.clone()),
            store,
        }
    }

    /// Delete all objects and placeholders under `prefix`.
    ///
    /// The caller contract guarantees a non-empty prefix for "delete
    /// folder" semantics; no root-guard is applied here. On return with
    /// zero errors, no keys remain with this prefix.
    pub async fn delete_subtree(
        &self,
        bucket: &str,
        prefix: &str,
        cancel: &CancellationToken,
    ) -> Result<DeleteOutcome, NamespaceError> {
        let mut visitor = DeleteVisitor {
            store: &self.store,
            bucket,
            root: prefix,
            outcome: DeleteOutcome::default(),
        };
        let report = self.walker.walk(bucket, prefix, cancel, &mut visitor).await?;

        let mut outcome = visitor.outcome;
        for failure in report.failed_listings {
            // Never pretend a failed listing was an empty subtree; the
            // keys below it are unseen and still present.
            outcome.errors.push(ItemError::new(
                failure.prefix,
                format!("listing failed: {}", failure.source),
            ));
        }
        if let Some(rel) = report.cancelled_at {
            outcome.cancelled = true;
            outcome.errors.push(ItemError::new(
                path::join_path([prefix, rel.as_str()]),
                "operation cancelled before remaining items were visited",
            ));
        }
        Ok(outcome)
    }

    /// Empty a bucket: top-level files are removed directly, each
    /// top-level folder goes through `delete_subtree`. A subtree whose
    /// root listing fails is reported and its siblings continue.
    pub async fn empty_bucket(
        &self,
        bucket: &str,
        cancel: &CancellationToken,
    ) -> Result<DeleteOutcome, NamespaceError> {
        let listing = NamespaceLister::new(self.store.clone())
            .list(bucket, "")
            .await?;
        let mut outcome = DeleteOutcome::default();

        for file in &listing.files {
            if cancel.is_cancelled() {
                outcome.cancelled = true;
                outcome
                    .errors
                    .push(ItemError::new(file.name.clone(), "operation cancelled"));
                return Ok(outcome);
            }
            match self.store.remove(bucket, &[file.name.clone()]).await {
                Ok(()) => outcome.deleted += 1,
                Err(err) => outcome
                    .errors
                    .push(ItemError::new(file.name.clone(), err.to_string())),
            }
        }

        for folder in &listing.folders {
            match self.delete_subtree(bucket, &folder.name, cancel).await {
                Ok(sub) => outcome.absorb(sub),
                Err(err) => outcome
                    .errors
                    .push(ItemError::new(folder.name.clone(), err.to_string())),
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::testutil::{FlakyStore, seed};
    use crate::store::{ListOptions, MemoryStore};

    #[tokio::test]
    async fn deletes_subtree_including_placeholders() {
        let store = Arc::new(MemoryStore::with_buckets(["b1"]));
        seed(
            &store,
            "b1",
            &["a/b/.keep", "a/b/one.txt", "a/b/sub/two.txt", "a/other.txt"],
        )
        .await;

        let outcome = RecursiveDeleter::new(store.clone())
            .delete_subtree("b1", "a/b", &CancellationToken::new())
            .await
            .unwrap();
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.deleted, 3);

        let remaining = store.list("b1", "a", ListOptions::default()).await.unwrap();
        let names: Vec<&str> = remaining.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["other.txt"]);
    }

    #[tokio::test]
    async fn deleting_nonexistent_prefix_is_idempotent() {
        let store = Arc::new(MemoryStore::with_buckets(["b1"]));
        let outcome = RecursiveDeleter::new(store)
            .delete_subtree("b1", "ghost/town", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.deleted, 0);
        assert!(outcome.errors.is_empty());
    }

    #[tokio::test]
    async fn failed_removal_is_recorded_and_walk_continues() {
        let store = Arc::new(MemoryStore::with_buckets(["b1"]));
        seed(&store, "b1", &["a/one.txt", "a/two.txt", "a/three.txt"]).await;
        let flaky = Arc::new(FlakyStore::new(store));
        flaky.fail_remove("b1", "a/two.txt").await;

        let outcome = RecursiveDeleter::new(flaky.clone())
            .delete_subtree("b1", "a", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.deleted, 2);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].key, "a/two.txt");
        // failed key must be assumed still present
        assert!(flaky.download("b1", "a/two.txt").await.is_ok());
    }

    #[tokio::test]
    async fn failed_sublisting_surfaces_as_error() {
        let store = Arc::new(MemoryStore::with_buckets(["b1"]));
        seed(&store, "b1", &["a/sub/hidden.txt", "a/seen.txt"]).await;
        let flaky = Arc::new(FlakyStore::new(store));
        flaky.fail_list("b1", "a/sub").await;

        let outcome = RecursiveDeleter::new(flaky.clone())
            .delete_subtree("b1", "a", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.deleted, 1);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].key.contains("a/sub"));
        assert!(flaky.download("b1", "a/sub/hidden.txt").await.is_ok());
    }

    #[tokio::test]
    async fn empty_bucket_clears_top_level_files_and_folders() {
        let store = Arc::new(MemoryStore::with_buckets(["b1"]));
        seed(
            &store,
            "b1",
            &["loose.txt", "docs/a.txt", "docs/deep/b.txt", "media/.keep"],
        )
        .await;

        let outcome = RecursiveDeleter::new(store.clone())
            .empty_bucket("b1", &CancellationToken::new())
            .await
            .unwrap();
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.deleted, 4);
        let entries = store.list("b1", "", ListOptions::default()).await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn cancellation_is_reported_through_errors() {
        let store = Arc::new(MemoryStore::with_buckets(["b1"]));
        seed(&store, "b1", &["a/one.txt", "a/two.txt"]).await;
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = RecursiveDeleter::new(store.clone())
            .delete_subtree("b1", "a", &cancel)
            .await
            .unwrap();
        assert!(outcome.cancelled);
        assert_eq!(outcome.deleted, 0);
        assert_eq!(outcome.errors.len(), 1);
        assert!(store.download("b1", "a/one.txt").await.is_ok());
    }
}
