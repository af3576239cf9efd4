//! Database repository for accounts, commands and bookmarks.
//!
//! Uses prepared statements and transactions for data integrity.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use super::Store;
use crate::errors::AppError;
use crate::models::{Account, AddBookmarkRequest, Bookmark, CommandMap};

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== ACCOUNT OPERATIONS ====================

    /// Create a new account with a freshly generated API key.
    pub async fn create_account(&self, name: &str) -> Result<Account, AppError> {
        let account = Account {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            api_key: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now().to_rfc3339(),
        };

        let result =
            sqlx::query("INSERT INTO accounts (id, name, api_key, created_at) VALUES (?, ?, ?, ?)")
                .bind(&account.id)
                .bind(&account.name)
                .bind(&account.api_key)
                .bind(&account.created_at)
                .execute(&self.pool)
                .await;

        match result {
            Ok(_) => Ok(account),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::Conflict(
                format!("Account with name {} already exists", name),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Get an account by its API key.
    pub async fn get_account(&self, api_key: &str) -> Result<Option<Account>, AppError> {
        let row = sqlx::query("SELECT id, name, api_key, created_at FROM accounts WHERE api_key = ?")
            .bind(api_key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(account_from_row))
    }

    /// Get an account or fail with `NotFound`.
    pub async fn require_account(&self, api_key: &str) -> Result<Account, AppError> {
        self.get_account(api_key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Account {} not found", api_key)))
    }

    // ==================== COMMAND OPERATIONS ====================

    /// Add or update a single command, leaving the account's other commands untouched.
    pub async fn add_command(&self, api_key: &str, cmd: &str, url: &str) -> Result<u64, AppError> {
        self.require_account(api_key).await?;

        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO commands (api_key, cmd, url, updated_at) VALUES (?, ?, ?, ?)
             ON CONFLICT(api_key, cmd) DO UPDATE SET url = excluded.url, updated_at = excluded.updated_at",
        )
        .bind(api_key)
        .bind(cmd)
        .bind(url)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Remove a single command, returning the number of removed entries.
    pub async fn delete_command(&self, api_key: &str, cmd: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM commands WHERE api_key = ? AND cmd = ?")
            .bind(api_key)
            .bind(cmd)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    // ==================== BOOKMARK OPERATIONS ====================

    /// Add a single bookmark.
    pub async fn add_bookmark(
        &self,
        api_key: &str,
        request: &AddBookmarkRequest,
    ) -> Result<Bookmark, AppError> {
        let bookmark = Bookmark::new(api_key, &request.name, &request.path, &request.url);

        sqlx::query("INSERT INTO bookmarks (id, api_key, name, path, url) VALUES (?, ?, ?, ?, ?)")
            .bind(&bookmark.id)
            .bind(&bookmark.api_key)
            .bind(&bookmark.name)
            .bind(&bookmark.path)
            .bind(&bookmark.url)
            .execute(&self.pool)
            .await?;

        Ok(bookmark)
    }

    /// Delete a bookmark owned by the given account.
    pub async fn delete_bookmark(&self, api_key: &str, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE api_key = ? AND id = ?")
            .bind(api_key)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Bookmark {} not found", id)));
        }

        Ok(())
    }
}

#[async_trait]
impl Store for Repository {
    async fn fetch_account_commands(
        &self,
        api_key: &str,
    ) -> Result<Option<CommandMap>, AppError> {
        if self.get_account(api_key).await?.is_none() {
            return Ok(None);
        }

        let rows = sqlx::query("SELECT cmd, url FROM commands WHERE api_key = ?")
            .bind(api_key)
            .fetch_all(&self.pool)
            .await?;

        Ok(Some(
            rows.iter()
                .map(|row| (row.get("cmd"), row.get("url")))
                .collect(),
        ))
    }

    async fn fetch_account_bookmarks(
        &self,
        api_key: &str,
        path_prefix: Option<&str>,
    ) -> Result<Vec<Bookmark>, AppError> {
        let rows = match path_prefix {
            Some(prefix) => {
                sqlx::query(
                    "SELECT id, api_key, name, path, url FROM bookmarks
                     WHERE api_key = ? AND substr(path, 1, length(?)) = ?
                     ORDER BY seq",
                )
                .bind(api_key)
                .bind(prefix)
                .bind(prefix)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT id, api_key, name, path, url FROM bookmarks WHERE api_key = ? ORDER BY seq",
                )
                .bind(api_key)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.iter().map(bookmark_from_row).collect())
    }

    async fn insert_bookmarks(&self, bookmarks: &[Bookmark]) -> Result<u64, AppError> {
        // Use a transaction so the batch lands as one write
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for bookmark in bookmarks {
            let result = sqlx::query(
                "INSERT INTO bookmarks (id, api_key, name, path, url) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&bookmark.id)
            .bind(&bookmark.api_key)
            .bind(&bookmark.name)
            .bind(&bookmark.path)
            .bind(&bookmark.url)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        tracing::debug!("Inserted {} of {} bookmarks", inserted, bookmarks.len());

        Ok(inserted)
    }
}

// ==================== ROW MAPPING HELPERS ====================

fn account_from_row(row: &sqlx::sqlite::SqliteRow) -> Account {
    Account {
        id: row.get("id"),
        name: row.get("name"),
        api_key: row.get("api_key"),
        created_at: row.get("created_at"),
    }
}

fn bookmark_from_row(row: &sqlx::sqlite::SqliteRow) -> Bookmark {
    Bookmark {
        id: row.get("id"),
        api_key: row.get("api_key"),
        name: row.get("name"),
        path: row.get("path"),
        url: row.get("url"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use std::time::Duration;
    use tempfile::TempDir;

    async fn test_repo() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("test.sqlite"), Duration::from_secs(5))
            .await
            .unwrap();
        (Repository::new(pool), temp_dir)
    }

    #[tokio::test]
    async fn test_unknown_account_has_no_commands() {
        let (repo, _dir) = test_repo().await;
        assert!(repo.fetch_account_commands("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_command_writes_are_scoped_to_one_key() {
        let (repo, _dir) = test_repo().await;
        let account = repo.create_account("ada").await.unwrap();

        repo.add_command(&account.api_key, "gh", "https://github.com")
            .await
            .unwrap();
        repo.add_command(&account.api_key, "rs", "https://docs.rs")
            .await
            .unwrap();
        repo.add_command(&account.api_key, "gh", "https://github.com/rust-lang")
            .await
            .unwrap();
        assert_eq!(repo.delete_command(&account.api_key, "rs").await.unwrap(), 1);
        assert_eq!(repo.delete_command(&account.api_key, "rs").await.unwrap(), 0);

        let cmds = repo
            .fetch_account_commands(&account.api_key)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds["gh"], "https://github.com/rust-lang");
    }

    #[tokio::test]
    async fn test_duplicate_account_name_conflicts() {
        let (repo, _dir) = test_repo().await;
        repo.create_account("ada").await.unwrap();

        let err = repo.create_account("ada").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_bookmarks_keep_insertion_order_and_prefix() {
        let (repo, _dir) = test_repo().await;
        let batch = vec![
            Bookmark::new("k", "z-last", "/work", "https://z.example"),
            Bookmark::new("k", "a-first", "/work", "https://a.example"),
            Bookmark::new("k", "home", "/home", "https://h.example"),
            Bookmark::new("other", "foreign", "/work", "https://f.example"),
        ];
        assert_eq!(repo.insert_bookmarks(&batch).await.unwrap(), 4);

        let all = repo.fetch_account_bookmarks("k", None).await.unwrap();
        assert_eq!(all.len(), 3);

        let work = repo
            .fetch_account_bookmarks("k", Some("/work"))
            .await
            .unwrap();
        let names: Vec<_> = work.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["z-last", "a-first"]);
    }

    #[tokio::test]
    async fn test_delete_bookmark_of_other_account_is_not_found() {
        let (repo, _dir) = test_repo().await;
        let request = AddBookmarkRequest {
            name: "Rust".to_string(),
            path: "/".to_string(),
            url: "https://rust-lang.org".to_string(),
        };
        let bookmark = repo.add_bookmark("k", &request).await.unwrap();

        let err = repo.delete_bookmark("other", &bookmark.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        repo.delete_bookmark("k", &bookmark.id).await.unwrap();
    }
}
