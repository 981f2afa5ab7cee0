//! One listing page, classified into folder and file nodes.
//!
//! The backend has no "is directory" bit. The only available signal is
//! the entry shape: a synthetic child produced purely by deeper keys has
//! no `id` and no `size`, and some backends instead mark folders with a
//! trailing `/` on the name. That heuristic lives behind [`Classifier`]
//! so backend quirks stay isolated from traversal logic.

use crate::models::node::{FileNode, FolderNode, Node};
use crate::namespace::{NamespaceError, PLACEHOLDER};
use crate::store::{Entry, ListOptions, ObjectStore, SortOrder};
use serde::Serialize;
use std::sync::Arc;

/// Single-page listing cap. Entries past the first page are not fetched;
/// this is a documented capability limit, not silent truncation.
pub const LIST_PAGE_LIMIT: usize = 1000;

/// Maps one raw listing entry to a typed node.
pub trait Classifier: Send + Sync {
    fn classify(&self, entry: &Entry) -> Node;
}

/// Default policy: an entry is a folder iff its size is absent or zero,
/// it has no id, and its name is not a placeholder; a trailing `/` on
/// the name forces folder classification and is trimmed from the
/// displayed name.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicClassifier;

impl Classifier for HeuristicClassifier {
    fn classify(&self, entry: &Entry) -> Node {
        if let Some(stripped) = entry.name.strip_suffix('/') {
            return Node::Folder(FolderNode {
                name: stripped.to_string(),
                updated_at: entry.updated_at,
            });
        }
        let is_folder = matches!(entry.size, None | Some(0))
            && entry.id.is_none()
            && !entry.name.ends_with(PLACEHOLDER);
        if is_folder {
            Node::Folder(FolderNode {
                name: entry.name.clone(),
                updated_at: entry.updated_at,
            })
        } else {
            Node::File(FileNode {
                name: entry.name.clone(),
                size: entry.size,
                updated_at: entry.updated_at,
            })
        }
    }
}

/// Folders and files of one level, each in store order. The two lists
/// are separate collections, not a merged sorted view.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Listing {
    pub folders: Vec<FolderNode>,
    pub files: Vec<FileNode>,
}

pub struct NamespaceLister {
    store: Arc<dyn ObjectStore>,
    classifier: Arc<dyn Classifier>,
}

impl NamespaceLister {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self::with_classifier(store, Arc::new(HeuristicClassifier))
    }

    pub fn with_classifier(store: Arc<dyn ObjectStore>, classifier: Arc<dyn Classifier>) -> Self {
        Self { store, classifier }
    }

    /// Fetch the first page under `prefix` and classify it. A failed
    /// store call is an error; callers must never coerce it to an empty
    /// listing during recursive walks.
    pub async fn list(&self, bucket: &str, prefix: &str) -> Result<Listing, NamespaceError> {
        let opts = ListOptions {
            limit: LIST_PAGE_LIMIT,
            offset: 0,
            sort: SortOrder::NameAsc,
        };
        let entries = self.store.list(bucket, prefix, opts).await.map_err(|source| {
            NamespaceError::List {
                bucket: bucket.to_string(),
                prefix: prefix.to_string(),
                source,
            }
        })?;

        let mut listing = Listing::default();
        for entry in &entries {
            match self.classifier.classify(entry) {
                Node::Folder(folder) => listing.folders.push(folder),
                Node::File(file) => listing.files.push(file),
            }
        }
        Ok(listing)
    }
}
