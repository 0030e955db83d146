//! Admin authentication middleware
//!
//! Checks `Authorization: Bearer <token>` against the configured admin token.
//! With no token configured the admin API answers 403 to everyone.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use ecutune_common::auth::{verify_admin_token, AdminAuthError};
use tracing::warn;

use crate::error::ApiError;
use crate::AppState;

/// Authentication middleware, applied to admin routes only
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    verify_admin_token(state.admin_token_digest.as_deref(), authorization).map_err(|e| {
        match e {
            AdminAuthError::Disabled => ApiError::Forbidden(e.to_string()),
            AdminAuthError::MissingToken | AdminAuthError::InvalidToken => {
                warn!("Rejected admin request to {}: {}", request.uri().path(), e);
                ApiError::Unauthorized(e.to_string())
            }
        }
    })?;

    Ok(next.run(request).await)
}
