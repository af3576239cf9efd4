//! Bookmark API endpoints.

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};

use super::{require_non_empty, success, ApiResult};
use crate::db::Store;
use crate::errors::AppError;
use crate::hierarchy::{build_folder, ROOT_FOLDER_LABEL};
use crate::import::BOOKMARKS_FILE_KEY;
use crate::models::{
    AddBookmarkRequest, Bookmark, BookmarkQuery, Folder, ImportSummary, BOOKMARKS_BASE_PATH,
};
use crate::AppState;

/// GET /api/bookmarks/:api_key - Bookmarks as a folder tree.
///
/// `?path=/work` scopes the tree to that folder.
pub async fn get_bookmarks(
    State(state): State<AppState>,
    Path(api_key): Path<String>,
    Query(query): Query<BookmarkQuery>,
) -> ApiResult<Folder> {
    let path = query
        .path
        .unwrap_or_else(|| BOOKMARKS_BASE_PATH.to_string());
    validate_path(&path)?;
    state.repo.require_account(&api_key).await?;

    let (prefix, label) = if path == BOOKMARKS_BASE_PATH {
        (None, ROOT_FOLDER_LABEL)
    } else {
        (Some(path.as_str()), path.rsplit('/').next().unwrap_or(&path))
    };

    let records = state.repo.fetch_account_bookmarks(&api_key, prefix).await?;
    let folder = build_folder(&records, &path, label);
    tracing::debug!(
        "Built folder {} with {} bookmarks in {} folders",
        path,
        folder.bookmark_count(),
        folder.node_count()
    );
    success(folder)
}

/// POST /api/bookmarks/:api_key - Add a single bookmark.
pub async fn add_bookmark(
    State(state): State<AppState>,
    Path(api_key): Path<String>,
    Json(request): Json<AddBookmarkRequest>,
) -> ApiResult<Bookmark> {
    require_non_empty(&request.name, "name")?;
    require_non_empty(&request.url, "url")?;
    validate_path(&request.path)?;
    state.repo.require_account(&api_key).await?;

    success(state.repo.add_bookmark(&api_key, &request).await?)
}

/// DELETE /api/bookmarks/:api_key/:id - Delete a bookmark.
pub async fn delete_bookmark(
    State(state): State<AppState>,
    Path((api_key, id)): Path<(String, String)>,
) -> ApiResult<()> {
    state.repo.delete_bookmark(&api_key, &id).await?;
    success(())
}

/// POST /api/bookmarks/:api_key/import - Import a browser bookmark export.
pub async fn import_bookmarks(
    State(state): State<AppState>,
    Path(api_key): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<ImportSummary> {
    let mut document = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some(BOOKMARKS_FILE_KEY) {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("Could not read bookmark file: {}", e)))?;
            document = Some(text);
            break;
        }
    }

    let document = document.ok_or_else(|| {
        AppError::BadRequest(format!("No {} in request", BOOKMARKS_FILE_KEY))
    })?;
    state.repo.require_account(&api_key).await?;

    success(state.importer.import(&api_key, &document).await?)
}

fn validate_path(path: &str) -> Result<(), AppError> {
    if !path.starts_with('/') {
        return Err(AppError::Validation(format!(
            "Path {:?} must start with {}",
            path, BOOKMARKS_BASE_PATH
        )));
    }
    Ok(())
}
