//! Per-user rate limiting middleware

use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::error::{ApiError, Result};
use crate::routes::auth::CurrentUser;
use crate::services::rate_limit::RateLimitDecision;
use crate::AppState;

const RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RATE_LIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

/// Must run after the identity middleware; requests without a user pass through.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response> {
    let Some(user) = request.extensions().get::<CurrentUser>().copied() else {
        return Ok(next.run(request).await);
    };

    let decision = state.rate_limiter.check(&user.user_id.to_string()).await;
    if !decision.allowed {
        tracing::warn!("Rate limit exceeded for user {}", user.user_id);
        return Err(ApiError::RateLimited {
            retry_after_secs: decision.reset_after_secs,
        });
    }

    let mut response = next.run(request).await;
    apply_headers(&mut response, decision);
    Ok(response)
}

fn apply_headers(response: &mut Response, decision: RateLimitDecision) {
    let headers = response.headers_mut();
    headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(decision.limit));
    headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(RATE_LIMIT_RESET, HeaderValue::from(decision.reset_after_secs));
}
