//! Copy/move dispatch and destination-path resolution.
//!
//! Moves are copy-then-delete; the backend has no atomic rename, so a
//! move whose cleanup fails leaves the object duplicated, and that state
//! is reported distinctly from a failed copy.

use crate::namespace::copy::{CopyOutcome, RecursiveCopier};
use crate::namespace::delete::{DeleteOutcome, RecursiveDeleter};
use crate::namespace::{ItemError, NamespaceError, path};
use crate::store::ObjectStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferOp {
    Copy,
    Move,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransferRequest {
    pub op: TransferOp,
    #[serde(default)]
    pub is_folder: bool,
    pub src_bucket: String,
    pub src_path: String,
    pub dst_bucket: String,
    /// Optional. Empty means "same name at the destination bucket root".
    /// For files, a trailing `/` marks it as a parent directory; without
    /// one it is the full target key (rename-on-transfer).
    #[serde(default)]
    pub dst_path: String,
}

/// What a transfer did. Copy failures and cleanup failures never mix:
/// `cleanup` reports the post-copy source deletion of a move separately,
/// so "duplicated, not moved" is distinguishable from a failed copy.
#[derive(Debug, Serialize)]
pub struct TransferReport {
    pub op: TransferOp,
    pub dst_bucket: String,
    /// Resolved destination path (file key, or folder prefix).
    pub destination: String,
    pub copied: usize,
    pub copy_errors: Vec<ItemError>,
    pub cancelled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup: Option<DeleteOutcome>,
}

pub struct TransferOrchestrator {
    store: Arc<dyn ObjectStore>,
    copier: RecursiveCopier,
    deleter: RecursiveDeleter,
}

impl TransferOrchestrator {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            copier: RecursiveCopier::new(store.clone()),
            deleter: RecursiveDeleter::new(store.clone()),
            store,
        }
    }

    /// Validate, resolve the destination, and run the copy (and for
    /// moves, the source cleanup). Validation failures return before any
    /// store call is made.
    pub async fn transfer(
        &self,
        req: &TransferRequest,
        cancel: &CancellationToken,
    ) -> Result<TransferReport, NamespaceError> {
        let src_bucket = req.src_bucket.trim();
        let dst_bucket = req.dst_bucket.trim();
        let src_path = path::join_path([req.src_path.as_str()]);
        if src_bucket.is_empty() || dst_bucket.is_empty() || src_path.is_empty() {
            return Err(NamespaceError::InvalidTransferRequest(
                "source bucket, destination bucket and source path are required".into(),
            ));
        }

        let destination = resolve_destination(&src_path, &req.dst_path, req.is_folder);

        if req.is_folder && src_bucket == dst_bucket && is_same_or_descendant(&src_path, &destination)
        {
            // Copying a folder into its own subtree would recurse into
            // freshly written output.
            return Err(NamespaceError::InvalidTransferRequest(format!(
                "destination `{destination}` is inside the source folder `{src_path}`"
            )));
        }

        if req.is_folder {
            self.transfer_folder(req.op, src_bucket, &src_path, dst_bucket, &destination, cancel)
                .await
        } else {
            self.transfer_file(req.op, src_bucket, &src_path, dst_bucket, &destination, cancel)
                .await
        }
    }

    async fn transfer_folder(
        &self,
        op: TransferOp,
        src_bucket: &str,
        src_path: &str,
        dst_bucket: &str,
        destination: &str,
        cancel: &CancellationToken,
    ) -> Result<TransferReport, NamespaceError> {
        let copy = self
            .copier
            .copy_subtree(src_bucket, src_path, dst_bucket, destination, cancel)
            .await?;

        // Cleanup runs even after a partial copy; its failures are
        // reported on their own and never roll the copy back. That
        // includes a cleanup whose own root listing fails: the copy
        // already happened, so the report must survive with the source
        // left duplicated.
        let cleanup = match op {
            TransferOp::Move => Some(
                match self.deleter.delete_subtree(src_bucket, src_path, cancel).await {
                    Ok(outcome) => outcome,
                    Err(err) => DeleteOutcome {
                        errors: vec![ItemError::new(
                            src_path,
                            format!("cleanup failed: {err}"),
                        )],
                        ..DeleteOutcome::default()
                    },
                },
            ),
            TransferOp::Copy => None,
        };

        let CopyOutcome {
            copied,
            errors,
            cancelled,
        } = copy;
        Ok(TransferReport {
            op,
            dst_bucket: dst_bucket.to_string(),
            destination: destination.to_string(),
            copied,
            copy_errors: errors,
            cancelled,
            cleanup,
        })
    }

    async fn transfer_file(
        &self,
        op: TransferOp,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
        cancel: &CancellationToken,
    ) -> Result<TransferReport, NamespaceError> {
        let mut report = TransferReport {
            op,
            dst_bucket: dst_bucket.to_string(),
            destination: dst_key.to_string(),
            copied: 0,
            copy_errors: Vec::new(),
            cancelled: false,
            cleanup: None,
        };

        if cancel.is_cancelled() {
            report.cancelled = true;
            report
                .copy_errors
                .push(ItemError::transfer(src_key, dst_key, "operation cancelled"));
            return Ok(report);
        }

        match self
            .copier
            .copy_file(src_bucket, src_key, dst_bucket, dst_key)
            .await
        {
            Ok(()) => {
                report.copied = 1;
                if op == TransferOp::Move {
                    // Source is deleted only after a successful copy; a
                    // failed delete means "duplicated, not moved".
                    let mut cleanup = DeleteOutcome::default();
                    match self.store.remove(src_bucket, &[src_key.to_string()]).await {
                        Ok(()) => cleanup.deleted = 1,
                        Err(err) => cleanup
                            .errors
                            .push(ItemError::new(src_key, err.to_string())),
                    }
                    report.cleanup = Some(cleanup);
                }
            }
            Err(err) => {
                report
                    .copy_errors
                    .push(ItemError::transfer(src_key, dst_key, err.to_string()));
            }
        }
        Ok(report)
    }
}

/// Destination resolution rules:
/// 1. empty dst: `basename(src)` at the destination bucket root;
/// 2. folder op: dst is always a parent, result `dst/basename(src)`;
/// 3. file op, dst ends with `/`: treated as a parent too;
/// 4. file op otherwise: dst verbatim (full target key).
///
/// The trailing-slash check runs on the raw value, before slash trimming.
fn resolve_destination(src_path: &str, dst_raw: &str, is_folder: bool) -> String {
    let name = path::basename(src_path);
    let dir_like = dst_raw.trim_end().ends_with('/');
    let dst = path::join_path([dst_raw]);
    if dst.is_empty() {
        name
    } else if is_folder || dir_like {
        path::join_path([dst.as_str(), name.as_str()])
    } else {
        dst
    }
}

fn is_same_or_descendant(src_prefix: &str, candidate: &str) -> bool {
    candidate == src_prefix || candidate.starts_with(&format!("{src_prefix}/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::testutil::{FlakyStore, seed};
    use crate::store::{ListOptions, MemoryStore};
    use bytes::Bytes;

    fn request(
        op: TransferOp,
        is_folder: bool,
        src_bucket: &str,
        src_path: &str,
        dst_bucket: &str,
        dst_path: &str,
    ) -> TransferRequest {
        TransferRequest {
            op,
            is_folder,
            src_bucket: src_bucket.into(),
            src_path: src_path.into(),
            dst_bucket: dst_bucket.into(),
            dst_path: dst_path.into(),
        }
    }

    #[test]
    fn destination_resolution_rules() {
        // 1: empty dst -> basename at root
        assert_eq!(resolve_destination("docs/a.txt", "", false), "a.txt");
        // 2: folder dst is always a parent
        assert_eq!(resolve_destination("photos/2020", "archive", true), "archive/2020");
        // 3: file dst with trailing slash is a parent
        assert_eq!(resolve_destination("docs/a.txt", "backup/", false), "backup/a.txt");
        // 4: file dst without trailing slash is the full key
        assert_eq!(resolve_destination("docs/a.txt", "renamed.txt", false), "renamed.txt");
    }

    #[tokio::test]
    async fn move_file_to_bucket_root() {
        let store = Arc::new(MemoryStore::with_buckets(["b1", "b2"]));
        store.upload("b1", "docs/a.txt", Bytes::from_static(b"payload")).await.unwrap();

        let report = TransferOrchestrator::new(store.clone())
            .transfer(
                &request(TransferOp::Move, false, "b1", "docs/a.txt", "b2", ""),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(report.destination, "a.txt");
        assert_eq!(report.copied, 1);
        assert!(report.copy_errors.is_empty());
        assert_eq!(report.cleanup.as_ref().unwrap().deleted, 1);
        assert_eq!(&store.download("b2", "a.txt").await.unwrap()[..], b"payload");
        assert!(store.download("b1", "docs/a.txt").await.is_err());
    }

    #[tokio::test]
    async fn folder_copy_lands_under_given_parent() {
        let store = Arc::new(MemoryStore::with_buckets(["b1", "b2"]));
        seed(&store, "b1", &["photos/2020/a.jpg", "photos/2020/b.jpg"]).await;

        let report = TransferOrchestrator::new(store.clone())
            .transfer(
                &request(TransferOp::Copy, true, "b1", "photos/2020", "b2", "archive"),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(report.destination, "archive/2020");
        assert_eq!(report.copied, 2);
        assert!(report.cleanup.is_none());
        assert!(store.download("b2", "archive/2020/a.jpg").await.is_ok());
        // copy leaves the source alone
        assert!(store.download("b1", "photos/2020/a.jpg").await.is_ok());
    }

    #[tokio::test]
    async fn folder_move_cleans_up_source_even_after_partial_copy() {
        let store = Arc::new(MemoryStore::with_buckets(["b1", "b2"]));
        seed(&store, "b1", &["x/bad.txt", "x/good.txt"]).await;
        let flaky = Arc::new(FlakyStore::new(store));
        flaky.fail_download("b1", "x/bad.txt").await;

        let report = TransferOrchestrator::new(flaky.clone())
            .transfer(
                &request(TransferOp::Move, true, "b1", "x", "b2", ""),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(report.copied, 1);
        assert_eq!(report.copy_errors.len(), 1);
        let cleanup = report.cleanup.unwrap();
        // cleanup still ran and removed what it could read
        assert!(cleanup.deleted >= 1);
    }

    #[tokio::test]
    async fn cleanup_failure_is_reported_distinctly() {
        let store = Arc::new(MemoryStore::with_buckets(["b1", "b2"]));
        seed(&store, "b1", &["docs/a.txt"]).await;
        let flaky = Arc::new(FlakyStore::new(store));
        flaky.fail_remove("b1", "docs/a.txt").await;

        let report = TransferOrchestrator::new(flaky.clone())
            .transfer(
                &request(TransferOp::Move, false, "b1", "docs/a.txt", "b2", ""),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        // copy succeeded, cleanup failed: duplicated, not moved
        assert_eq!(report.copied, 1);
        assert!(report.copy_errors.is_empty());
        let cleanup = report.cleanup.unwrap();
        assert_eq!(cleanup.deleted, 0);
        assert_eq!(cleanup.errors.len(), 1);
        assert!(flaky.download("b2", "a.txt").await.is_ok());
        assert!(flaky.download("b1", "docs/a.txt").await.is_ok());
    }

    #[tokio::test]
    async fn folder_move_cleanup_listing_failure_keeps_copy_report() {
        let store = Arc::new(MemoryStore::with_buckets(["b1", "b2"]));
        seed(&store, "b1", &["x/a.txt"]).await;
        let flaky = Arc::new(FlakyStore::new(store));
        // the copy's root listing goes through; the cleanup's does not
        flaky.fail_list_after("b1", "x", 1).await;

        let report = TransferOrchestrator::new(flaky.clone())
            .transfer(
                &request(TransferOp::Move, true, "b1", "x", "b2", ""),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(report.copied, 1);
        assert!(report.copy_errors.is_empty());
        let cleanup = report.cleanup.unwrap();
        assert_eq!(cleanup.deleted, 0);
        assert_eq!(cleanup.errors.len(), 1);
        assert_eq!(cleanup.errors[0].key, "x");
        // duplicated, not moved
        assert!(flaky.download("b2", "x/a.txt").await.is_ok());
        assert!(flaky.download("b1", "x/a.txt").await.is_ok());
    }

    #[tokio::test]
    async fn cancelled_file_transfer_copies_nothing() {
        let store = Arc::new(MemoryStore::with_buckets(["b1", "b2"]));
        seed(&store, "b1", &["docs/a.txt"]).await;
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = TransferOrchestrator::new(store.clone())
            .transfer(
                &request(TransferOp::Move, false, "b1", "docs/a.txt", "b2", ""),
                &cancel,
            )
            .await
            .unwrap();
        assert!(report.cancelled);
        assert_eq!(report.copied, 0);
        assert_eq!(report.copy_errors.len(), 1);
        assert!(report.cleanup.is_none());
        assert!(store.download("b1", "docs/a.txt").await.is_ok());
        assert!(store.download("b2", "a.txt").await.is_err());
    }

    #[tokio::test]
    async fn rejects_incomplete_requests_before_any_store_call() {
        let store = Arc::new(MemoryStore::new());
        let orchestrator = TransferOrchestrator::new(store);
        for req in [
            request(TransferOp::Copy, false, "", "a.txt", "b2", ""),
            request(TransferOp::Copy, false, "b1", "", "b2", ""),
            request(TransferOp::Copy, false, "b1", "a.txt", "", ""),
        ] {
            let err = orchestrator
                .transfer(&req, &CancellationToken::new())
                .await
                .unwrap_err();
            assert!(matches!(err, NamespaceError::InvalidTransferRequest(_)));
        }
    }

    #[tokio::test]
    async fn rejects_copy_into_own_subtree() {
        let store = Arc::new(MemoryStore::with_buckets(["b1"]));
        seed(&store, "b1", &["x/a.txt"]).await;
        let orchestrator = TransferOrchestrator::new(store.clone());
        let err = orchestrator
            .transfer(
                &request(TransferOp::Copy, true, "b1", "x", "b1", "x"),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, NamespaceError::InvalidTransferRequest(_)));
        // sibling-named destination is fine
        let report = orchestrator
            .transfer(
                &request(TransferOp::Copy, true, "b1", "x", "b1", "x2/"),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(report.destination, "x2/x");
        assert_eq!(report.copied, 1);
    }

    #[tokio::test]
    async fn file_rename_on_transfer() {
        let store = Arc::new(MemoryStore::with_buckets(["b1"]));
        seed(&store, "b1", &["docs/a.txt"]).await;
        let report = TransferOrchestrator::new(store.clone())
            .transfer(
                &request(TransferOp::Copy, false, "b1", "docs/a.txt", "b1", "docs/b.txt"),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(report.destination, "docs/b.txt");
        let entries = store.list("b1", "docs", ListOptions::default()).await.unwrap();
        assert_eq!(entries.len(), 2);
    }
}
