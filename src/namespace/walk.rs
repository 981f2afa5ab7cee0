//! Depth-first traversal driver shared by every recursive operation.
//!
//! Order per level: enter the folder, visit its files in listing order,
//! then descend into each subfolder, then leave. The walk is driven by an
//! explicit frame stack, so depth is bounded only by the keyspace, not by
//! the call stack. Keys are strings, not links, so a pure prefix
//! namespace cannot contain back-edges.

use crate::models::node::{FileNode, FolderNode};
use crate::namespace::listing::NamespaceLister;
use crate::namespace::{NamespaceError, path};
use crate::store::ObjectStore;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Callbacks invoked during a walk. Paths are relative to the walk root;
/// the root itself is entered and left with the empty string.
///
/// Visitors aggregate their own per-item failures; from the walker's
/// point of view they are infallible.
#[async_trait]
pub trait TreeVisitor: Send {
    async fn enter_folder(&mut self, rel: &str);
    async fn visit_file(&mut self, rel: &str, file: &FileNode);
    async fn leave_folder(&mut self, rel: &str);
}

/// A sub-listing that failed mid-walk. The branch below it was skipped;
/// siblings already enumerated continued.
#[derive(Debug)]
pub struct ListFailure {
    /// Absolute prefix whose listing failed.
    pub prefix: String,
    pub source: NamespaceError,
}

#[derive(Debug, Default)]
pub struct WalkReport {
    pub failed_listings: Vec<ListFailure>,
    /// Relative path at which cancellation stopped the walk, if it did.
    pub cancelled_at: Option<String>,
}

struct Frame {
    rel: String,
    folders: std::vec::IntoIter<FolderNode>,
}

pub struct TreeWalker {
    lister: NamespaceLister,
}

impl TreeWalker {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            lister: NamespaceLister::new(store),
        }
    }

    /// Walk the subtree rooted at `root`. A failed root listing fails the
    /// whole walk; failed sub-listings are recorded in the report and the
    /// walk continues with siblings. Cancellation is checked between
    /// store calls and stops the walk where it stands.
    pub async fn walk<V: TreeVisitor>(
        &self,
        bucket: &str,
        root: &str,
        cancel: &CancellationToken,
        visitor: &mut V,
    ) -> Result<WalkReport, NamespaceError> {
        let mut report = WalkReport::default();
        if cancel.is_cancelled() {
            report.cancelled_at = Some(String::new());
            return Ok(report);
        }

        let listing = self.lister.list(bucket, root).await?;
        visitor.enter_folder("").await;
        let mut stack = vec![Frame {
            rel: String::new(),
            folders: listing.folders.into_iter(),
        }];
        for file in &listing.files {
            if cancel.is_cancelled() {
                report.cancelled_at = Some(String::new());
                return Ok(report);
            }
            visitor.visit_file(&path::join_path([file.name.as_str()]), file).await;
        }

        while let Some(frame) = stack.last_mut() {
            match frame.folders.next() {
                Some(folder) => {
                    let rel = path::join_path([frame.rel.as_str(), folder.name.as_str()]);
                    if cancel.is_cancelled() {
                        report.cancelled_at = Some(rel);
                        return Ok(report);
                    }
                    let abs = path::join_path([root, rel.as_str()]);
                    let listing = match self.lister.list(bucket, &abs).await {
                        Ok(listing) => listing,
                        Err(source) => {
                            report.failed_listings.push(ListFailure { prefix: abs, source });
                            continue;
                        }
                    };
                    visitor.enter_folder(&rel).await;
                    for file in &listing.files {
                        if cancel.is_cancelled() {
                            report.cancelled_at = Some(rel.clone());
                            return Ok(report);
                        }
                        visitor
                            .visit_file(&path::join_path([rel.as_str(), file.name.as_str()]), file)
                            .await;
                    }
                    stack.push(Frame {
                        rel,
                        folders: listing.folders.into_iter(),
                    });
                }
                None => {
                    let rel = frame.rel.clone();
                    stack.pop();
                    visitor.leave_folder(&rel).await;
                }
            }
        }
        Ok(report)
    }
}
