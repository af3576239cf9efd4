//! Bookmark model and request bodies.

use serde::{Deserialize, Serialize};

/// Root sentinel of every bookmark path.
pub const BOOKMARKS_BASE_PATH: &str = "/";

/// A single path-addressed bookmark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    #[serde(rename = "APIKey")]
    pub api_key: String,
    pub name: String,
    pub path: String,
    pub url: String,
}

impl Bookmark {
    /// Build a bookmark with a freshly generated id.
    pub fn new(api_key: &str, name: &str, path: &str, url: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            api_key: api_key.to_string(),
            name: name.to_string(),
            path: path.to_string(),
            url: url.to_string(),
        }
    }
}

/// Request body for adding a single bookmark.
#[derive(Debug, Clone, Deserialize)]
pub struct AddBookmarkRequest {
    pub name: String,
    #[serde(default = "default_path")]
    pub path: String,
    pub url: String,
}

fn default_path() -> String {
    BOOKMARKS_BASE_PATH.to_string()
}

/// Query parameters for browsing bookmarks.
#[derive(Debug, Default, Deserialize)]
pub struct BookmarkQuery {
    #[serde(default)]
    pub path: Option<String>,
}

/// Result of a bulk import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Records extracted from the document.
    pub parsed: u64,
    /// Records the store confirmed as inserted.
    pub inserted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bookmark_wire_names() {
        let bookmark = Bookmark {
            id: "b1".to_string(),
            api_key: "key".to_string(),
            name: "Docs".to_string(),
            path: "/work".to_string(),
            url: "https://docs.rs".to_string(),
        };

        let value = serde_json::to_value(&bookmark).unwrap();
        assert_eq!(value["APIKey"], "key");
        assert_eq!(value["name"], "Docs");
        assert_eq!(value["path"], "/work");
        assert_eq!(value["url"], "https://docs.rs");
    }

    #[test]
    fn test_add_bookmark_request_defaults_to_root() {
        let request: AddBookmarkRequest =
            serde_json::from_str(r#"{"name":"Rust","url":"https://rust-lang.org"}"#).unwrap();
        assert_eq!(request.path, BOOKMARKS_BASE_PATH);
    }
}
