//! Classified listing nodes.
//!
//! The backing store has no directory primitive, so a listing entry is
//! classified into a folder or a file by heuristic (see
//! `namespace::listing`). Nodes never outlive the request that produced
//! them; nothing here is cached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A synthesized folder. It "exists" only as long as some key carries its
/// prefix or a `.keep` placeholder sits under it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FolderNode {
    pub name: String,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A real object directly under the listed prefix.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FileNode {
    pub name: String,
    pub size: Option<i64>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Classification result for one listing entry.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Folder(FolderNode),
    File(FileNode),
}
