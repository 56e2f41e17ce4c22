//! Test fixtures and factory functions for creating test data.

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use super::CardSeed;

/// Create a submit review request body.
///
/// `rating` is a JSON value so tests can send fractional or malformed numbers.
pub fn submit_review_request(
    card_id: Uuid,
    rating: serde_json::Value,
    rating_scale: Option<&str>,
) -> serde_json::Value {
    let mut body = json!({
        "card_id": card_id,
        "rating": rating,
        "duration_ms": 2000
    });
    if let Some(scale) = rating_scale {
        body["rating_scale"] = json!(scale);
    }
    body
}

/// Review request with an explicit review time.
pub fn submit_review_request_at(
    card_id: Uuid,
    rating: i64,
    reviewed_at: DateTime<Utc>,
) -> serde_json::Value {
    json!({
        "card_id": card_id,
        "rating": rating,
        "reviewed_at": reviewed_at
    })
}

/// Card that has never been scheduled.
pub fn new_card() -> CardSeed {
    CardSeed::default()
}

/// Card due `days` days ago (negative for the future).
pub fn due_card(days: i64, repetition_count: i32, interval_days: i32) -> CardSeed {
    CardSeed {
        repetition_count,
        interval_days,
        due_at: Some(Utc::now() - Duration::days(days)),
        ..CardSeed::default()
    }
}

/// Archived copy of a seed.
pub fn archived(seed: CardSeed) -> CardSeed {
    CardSeed {
        is_archived: true,
        ..seed
    }
}

/// Generate a unique test deck name to avoid collisions.
pub fn unique_deck_name(prefix: &str) -> String {
    format!("{}_{}", prefix, &Uuid::new_v4().to_string()[..8])
}
