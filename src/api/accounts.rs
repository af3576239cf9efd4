//! Account API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{require_non_empty, success, ApiResult};
use crate::models::{Account, CreateAccountRequest};
use crate::AppState;

/// POST /api/accounts - Register a new account.
pub async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<CreateAccountRequest>,
) -> ApiResult<Account> {
    require_non_empty(&request.name, "Account name")?;

    let account = state.repo.create_account(request.name.trim()).await?;
    tracing::info!("Created account {}", account.name);
    success(account)
}

/// GET /api/accounts/:api_key - Get account details.
pub async fn get_account(
    State(state): State<AppState>,
    Path(api_key): Path<String>,
) -> ApiResult<Account> {
    success(state.repo.require_account(&api_key).await?)
}
