//! Command search endpoints.

use axum::{
    extract::{Path, State},
    http::HeaderValue,
    response::{IntoResponse, Redirect, Response},
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::resolver::Resolution;
use crate::AppState;

/// Header reporting where a redirect target came from.
pub const RESOLUTION_ORIGIN_HEADER: &str = "x-resolution-origin";

/// GET /api/search/:api_key/:cmd - Redirect to the command's URL.
///
/// Unknown commands redirect to a web search for the command text.
pub async fn search(
    State(state): State<AppState>,
    Path((api_key, cmd)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let resolution = resolve_logged(&state, &api_key, &cmd).await?;

    let mut response = Redirect::temporary(&resolution.url).into_response();
    response.headers_mut().insert(
        RESOLUTION_ORIGIN_HEADER,
        HeaderValue::from_static(resolution.origin.as_str()),
    );
    Ok(response)
}

/// GET /api/resolve/:api_key/:cmd - Resolve a command without redirecting.
pub async fn resolve_cmd(
    State(state): State<AppState>,
    Path((api_key, cmd)): Path<(String, String)>,
) -> ApiResult<Resolution> {
    success(resolve_logged(&state, &api_key, &cmd).await?)
}

async fn resolve_logged(state: &AppState, api_key: &str, cmd: &str) -> Result<Resolution, AppError> {
    state.resolver.resolve(api_key, cmd).await.map_err(|e| {
        if e.is_transient() {
            tracing::warn!("Could not resolve {} for {}: {}", cmd, api_key, e);
        }
        e
    })
}
