//! Store contract consumed by the resolver and the importer.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::{Bookmark, CommandMap};

/// Point lookups and batch writes keyed by account API key.
#[async_trait]
pub trait Store: Send + Sync {
    /// All commands of an account, or `None` when the account does not exist.
    async fn fetch_account_commands(&self, api_key: &str)
        -> Result<Option<CommandMap>, AppError>;

    /// Bookmarks of an account in insertion order, optionally limited to
    /// paths starting with `path_prefix`.
    async fn fetch_account_bookmarks(
        &self,
        api_key: &str,
        path_prefix: Option<&str>,
    ) -> Result<Vec<Bookmark>, AppError>;

    /// Insert a batch of bookmarks, returning how many the store accepted.
    async fn insert_bookmarks(&self, bookmarks: &[Bookmark]) -> Result<u64, AppError>;
}
