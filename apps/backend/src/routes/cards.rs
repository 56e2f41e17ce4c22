//! Card review history endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::CurrentUser;
use crate::AppState;

/// GET /api/cards/:id/reviews
pub async fn reviews(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(card_id): Path<Uuid>,
) -> Result<Json<ReviewHistoryResponse>> {
    state
        .db
        .get_card(user.user_id, card_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Card not found".to_string()))?;

    let reviews = state
        .db
        .get_review_logs(user.user_id, card_id)
        .await?
        .iter()
        .map(DbReviewLog::to_api_record)
        .collect::<Result<Vec<_>>>()?;

    Ok(Json(ReviewHistoryResponse { card_id, reviews }))
}
