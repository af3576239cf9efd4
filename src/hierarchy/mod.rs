//! Folder tree construction from flat bookmark records.
//!
//! The tree is rebuilt on every read from the stored records and never
//! persisted.

use crate::models::{Bookmark, Folder, BOOKMARKS_BASE_PATH};

/// Label of the root folder when browsing a whole account.
pub const ROOT_FOLDER_LABEL: &str = "root";

/// Build the folder rooted at `target_path` from `records`.
///
/// Records exactly at `target_path` become the root's bookmarks in input
/// order. Deeper records are placed into sub-folders, creating every
/// intermediate folder on the way. Records outside `target_path` are
/// ignored. Paths are taken literally: empty segments produced by `//` or a
/// trailing `/` are folders of their own.
pub fn build_folder(records: &[Bookmark], target_path: &str, root_label: &str) -> Folder {
    let mut root = Folder::new(root_label, target_path);
    let target = segments(target_path);

    for record in records {
        if record.path == target_path {
            root.bookmarks.push(record.clone());
            continue;
        }
        let (Some(target), Some(path)) = (target.as_deref(), segments(&record.path)) else {
            continue;
        };
        if path.len() > target.len() && path.starts_with(target) {
            place(&mut root, record, &path[target.len()..]);
        }
    }

    root
}

fn place(folder: &mut Folder, record: &Bookmark, rest: &[&str]) {
    let Some((segment, rest)) = rest.split_first() else {
        folder.bookmarks.push(record.clone());
        return;
    };

    let child = folder
        .folders
        .entry(segment.to_string())
        .or_insert_with(|| Folder::new(segment, &join_path(&folder.path, segment)));
    place(child, record, rest);
}

/// Segments of an absolute path below the root sentinel, or `None` for a
/// relative path.
fn segments(path: &str) -> Option<Vec<&str>> {
    if path == BOOKMARKS_BASE_PATH {
        return Some(Vec::new());
    }
    path.strip_prefix('/').map(|rest| rest.split('/').collect())
}

/// Path of the child `segment` below `base`.
pub(crate) fn join_path(base: &str, segment: &str) -> String {
    if base == BOOKMARKS_BASE_PATH {
        format!("{}{}", base, segment)
    } else {
        format!("{}/{}", base, segment)
    }
}
