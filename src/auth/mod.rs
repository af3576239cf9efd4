//! Optional pre-shared key check for the API routes.
//!
//! Account scoping happens through the API key in each route's path; this
//! layer only keeps unknown clients away from the service as a whole.

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::errors::AppError;

/// Header name for the service key.
pub const SERVICE_KEY_HEADER: &str = "x-api-key";

/// Middleware rejecting requests that do not present `expected_psk`.
pub async fn psk_auth_layer(
    expected_psk: Option<String>,
    request: Request,
    next: Next,
) -> Response {
    // If no PSK is configured, allow all requests (dev mode)
    let Some(expected) = expected_psk else {
        return next.run(request).await;
    };

    match provided_key(request.headers()) {
        Some(provided) if constant_time_compare(provided, &expected) => next.run(request).await,
        Some(_) => AppError::Unauthorized("Invalid service key".to_string()).into_response(),
        None => AppError::Unauthorized("Missing service key".to_string()).into_response(),
    }
}

/// Key from the `x-api-key` header, else from an `Authorization: Bearer` header.
fn provided_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SERVICE_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
        })
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
