//! Command API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{require_non_empty, success, ApiResult};
use crate::db::Store;
use crate::errors::AppError;
use crate::models::{AddCmdRequest, AddCmdResponse, CommandMap, DelCmdRequest, DelCmdResponse};
use crate::resolver::validate_command_url;
use crate::AppState;

/// GET /api/cmds/:api_key - List all commands of an account.
pub async fn list_cmds(
    State(state): State<AppState>,
    Path(api_key): Path<String>,
) -> ApiResult<CommandMap> {
    match state.repo.fetch_account_commands(&api_key).await? {
        Some(cmds) => success(cmds),
        None => Err(AppError::NotFound(format!("Account {} not found", api_key))),
    }
}

/// PUT /api/cmds/:api_key - Add or update one command.
pub async fn add_cmd(
    State(state): State<AppState>,
    Path(api_key): Path<String>,
    Json(request): Json<AddCmdRequest>,
) -> ApiResult<AddCmdResponse> {
    require_non_empty(&request.cmd, "cmd")?;
    require_non_empty(&request.url, "url")?;
    validate_command_url(&request.url)?;

    let cmds_set = state
        .repo
        .add_command(&api_key, &request.cmd, &request.url)
        .await?;
    if cmds_set == 0 {
        return Err(AppError::BadRequest("Could not update cmds".to_string()));
    }

    tracing::info!("Set cmd {} -> {} for {}", request.cmd, request.url, api_key);
    success(AddCmdResponse {
        cmds_set,
        cmd: request.cmd,
        url: request.url,
    })
}

/// DELETE /api/cmds/:api_key - Remove one command.
pub async fn delete_cmd(
    State(state): State<AppState>,
    Path(api_key): Path<String>,
    Json(request): Json<DelCmdRequest>,
) -> ApiResult<DelCmdResponse> {
    require_non_empty(&request.cmd, "cmd")?;

    let num_deleted = state.repo.delete_command(&api_key, &request.cmd).await?;
    if num_deleted == 0 {
        return Err(AppError::NotFound(format!(
            "Command {} not found",
            request.cmd
        )));
    }

    tracing::info!("Removed cmd {} for {}", request.cmd, api_key);
    success(DelCmdResponse {
        num_deleted,
        cmd: request.cmd,
    })
}
