//! Folder tree derived from flat bookmark records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Bookmark;

/// A node of the bookmark tree. Built per request and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub name: String,
    pub path: String,
    /// Bookmarks whose path equals this folder's path, in store order.
    pub bookmarks: Vec<Bookmark>,
    /// Child folders keyed by their literal path segment.
    pub folders: BTreeMap<String, Folder>,
}

impl Folder {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            bookmarks: Vec::new(),
            folders: BTreeMap::new(),
        }
    }

    /// Number of folder nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.folders.values().map(Folder::node_count).sum::<usize>()
    }

    /// Number of bookmarks in this subtree.
    pub fn bookmark_count(&self) -> usize {
        self.bookmarks.len()
            + self
                .folders
                .values()
                .map(Folder::bookmark_count)
                .sum::<usize>()
    }
}
