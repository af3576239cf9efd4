//! Bulk import of browser bookmark exports.
//!
//! Browsers export bookmarks in the Netscape bookmark file format: nested
//! `<DL>` lists where an `<H3>` heading names the folder whose list follows
//! it and every `<A HREF>` is a bookmark. Nesting is flattened into the
//! bookmark `path`.
//!
//! Folder names are joined as-is, so a heading containing `/` (for example
//! `a/b`) reads back as two nested folders. The path format has no escape
//! for the separator.

use std::sync::Arc;
use std::time::Duration;

use select::document::Document;
use select::node::Node;
use select::predicate::Name;
use tokio::time::timeout;

use crate::db::Store;
use crate::errors::AppError;
use crate::hierarchy::join_path;
use crate::models::{Bookmark, ImportSummary, BOOKMARKS_BASE_PATH};

/// Multipart field carrying the export file.
pub const BOOKMARKS_FILE_KEY: &str = "bookmarks_file";

/// Parse a bookmark export into records owned by `api_key`.
///
/// Fails with `Malformed` when the document is blank, contains no bookmark
/// list, or has a link without a target.
pub fn parse_import_file(document: &str, api_key: &str) -> Result<Vec<Bookmark>, AppError> {
    if document.trim().is_empty() {
        return Err(AppError::Malformed("Bookmark file is empty".to_string()));
    }

    let document = Document::from(document);
    let lists: Vec<Node> = document
        .find(Name("dl"))
        .filter(|list| !has_list_ancestor(list))
        .collect();

    if lists.is_empty() {
        return Err(AppError::Malformed(
            "No bookmark list found in file".to_string(),
        ));
    }

    let mut bookmarks = Vec::new();
    for list in lists {
        walk(list, BOOKMARKS_BASE_PATH, api_key, &mut bookmarks)?;
    }

    Ok(bookmarks)
}

/// Collect bookmarks below `node` into `out`.
///
/// Returns a folder heading that was not followed by its list inside `node`,
/// so the caller can attach it to a list that the HTML parser placed as a
/// sibling instead of a child.
fn walk(
    node: Node,
    path: &str,
    api_key: &str,
    out: &mut Vec<Bookmark>,
) -> Result<Option<String>, AppError> {
    let mut heading: Option<String> = None;

    for child in node.children() {
        match child.name() {
            Some("h3") => heading = Some(child.text().trim().to_string()),
            Some("a") => {
                let name = child.text().trim().to_string();
                let url = child.attr("href").ok_or_else(|| {
                    AppError::Malformed(format!("Bookmark {:?} has no HREF", name))
                })?;
                out.push(Bookmark::new(api_key, &name, path, url));
            }
            Some("dl") => {
                let list_path = match heading.take() {
                    Some(folder) => join_path(path, &folder),
                    None => path.to_string(),
                };
                walk(child, &list_path, api_key, out)?;
            }
            Some(_) => {
                if let Some(folder) = walk(child, path, api_key, out)? {
                    heading = Some(folder);
                }
            }
            None => {}
        }
    }

    Ok(heading)
}

fn has_list_ancestor(node: &Node) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        if parent.name() == Some("dl") {
            return true;
        }
        current = parent.parent();
    }
    false
}

/// Parses exports and writes them to the store as one batch.
#[derive(Clone)]
pub struct Importer {
    store: Arc<dyn Store>,
    deadline: Duration,
}

impl Importer {
    pub fn new(store: Arc<dyn Store>, deadline: Duration) -> Self {
        Self { store, deadline }
    }

    /// Parse `document` and insert every bookmark for `api_key`.
    ///
    /// Nothing reaches the store when parsing fails. Entries are not checked
    /// against existing bookmarks, so importing a file twice stores every
    /// entry twice.
    pub async fn import(&self, api_key: &str, document: &str) -> Result<ImportSummary, AppError> {
        let records = parse_import_file(document, api_key)?;
        let parsed = records.len() as u64;

        if records.is_empty() {
            return Ok(ImportSummary {
                parsed,
                inserted: 0,
            });
        }

        let inserted = timeout(self.deadline, self.store.insert_bookmarks(&records)).await??;
        if inserted < parsed {
            tracing::warn!(
                "Partial import for {}: {} of {} bookmarks inserted",
                api_key,
                inserted,
                parsed
            );
        } else {
            tracing::info!("Imported {} bookmarks for {}", inserted, api_key);
        }

        Ok(ImportSummary { parsed, inserted })
    }
}
