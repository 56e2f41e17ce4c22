//! Study endpoints

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use recall_core::{is_due, study_queue};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::CurrentUser;
use crate::AppState;

/// GET /api/study/queue
pub async fn queue(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<StudyQueueQuery>,
) -> Result<Json<StudyQueueResponse>> {
    let limit = query.resolve_limit(
        state.config.queue.default_limit,
        state.config.queue.max_limit,
    )?;

    let now = Utc::now();
    let due_cards = state
        .db
        .get_due_cards(user.user_id, query.deck_id, now)
        .await?;
    let total_due = due_cards.len();

    let cards = study_queue(due_cards, now, limit)
        .iter()
        .map(DbCard::to_api_card)
        .collect();

    Ok(Json(StudyQueueResponse {
        cards,
        total_due,
        limit,
    }))
}

/// POST /api/study/review
pub async fn review(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<SubmitReviewRequest>,
) -> Result<Json<SubmitReviewResponse>> {
    // Reject bad ratings before touching the database
    let now = Utc::now();
    let outcome = payload.validate(now, state.scheduler.as_ref())?;

    let applied = state
        .db
        .apply_review(user.user_id, payload.card_id, outcome, state.scheduler.as_ref())
        .await?
        .ok_or_else(|| ApiError::NotFound("Card not found".to_string()))?;

    let transition = applied.transition;
    tracing::debug!(
        "Reviewed card {} rating {} ({}): interval {} -> {}",
        payload.card_id,
        transition.outcome.rating.to_value(),
        payload.rating_scale.as_str(),
        transition.previous.interval_days,
        transition.next.interval_days
    );

    Ok(Json(SubmitReviewResponse {
        card_id: payload.card_id,
        review_id: applied.review_id,
        is_due: is_due(&transition.next, now),
        previous_state: transition.previous,
        state: transition.next,
    }))
}
