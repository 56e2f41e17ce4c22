//! Caller identity middleware
//!
//! Sessions are validated by the gateway in front of this service, which
//! forwards the authenticated user's id in the `x-user-id` header.

use axum::{
    body::Body,
    extract::Request,
    http::HeaderName,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::{ApiError, Result};

pub const USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");

/// Authenticated user stored in request extensions
#[derive(Clone, Copy, Debug)]
pub struct CurrentUser {
    pub user_id: Uuid,
}

/// Identity middleware - extracts the user id forwarded by the gateway
pub async fn auth_middleware(mut request: Request<Body>, next: Next) -> Result<Response> {
    let raw = request
        .headers()
        .get(&USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing x-user-id header".to_string()))?;

    let user_id = Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::Unauthorized("Invalid user id".to_string()))?;

    request.extensions_mut().insert(CurrentUser { user_id });

    Ok(next.run(request).await)
}
