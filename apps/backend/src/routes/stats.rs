//! Statistics endpoints

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use recall_core::compute_stats;

use crate::error::Result;
use crate::models::*;
use crate::routes::auth::CurrentUser;
use crate::AppState;

/// GET /api/stats
pub async fn summary(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<StatsResponse>> {
    let cards = state.db.get_cards(user.user_id, query.deck_id).await?;
    let now = Utc::now();

    Ok(Json(StatsResponse {
        stats: compute_stats(&cards, now),
        generated_at: now,
    }))
}
