//! Database models and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{ApiError, Result};

// Re-export shared types from recall-core
pub use recall_core::{
    LearningState, QueueEntry, Rating, RatingScale, ReviewOutcome, Scheduler, StatsEntry,
    StudyStats, Transition,
};

// === Database Entity Types ===

/// Card stored in PostgreSQL, with its learning state inline
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbCard {
    pub id: Uuid,
    pub user_id: Uuid,
    pub deck_id: Uuid,
    pub front: String,
    pub back: String,
    pub is_archived: bool,
    pub repetition_count: i32,
    pub lapse_count: i32,
    pub ease_factor: f64,
    pub interval_days: i32,
    pub due_at: Option<DateTime<Utc>>,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbCard {
    /// Convert to recall-core LearningState
    pub fn to_learning_state(&self) -> LearningState {
        LearningState {
            repetition_count: from_db_count(self.repetition_count),
            lapse_count: from_db_count(self.lapse_count),
            ease_factor: self.ease_factor,
            interval_days: from_db_count(self.interval_days),
            due_at: self.due_at,
            last_reviewed_at: self.last_reviewed_at,
        }
    }

    /// Convert to API card type
    pub fn to_api_card(&self) -> StudyCard {
        StudyCard {
            id: self.id,
            deck_id: self.deck_id,
            front: self.front.clone(),
            back: self.back.clone(),
            state: self.to_learning_state(),
        }
    }
}

impl QueueEntry for DbCard {
    fn due_at(&self) -> Option<DateTime<Utc>> {
        self.due_at
    }

    fn interval_days(&self) -> u32 {
        from_db_count(self.interval_days)
    }
}

impl StatsEntry for DbCard {
    fn due_at(&self) -> Option<DateTime<Utc>> {
        self.due_at
    }

    fn repetition_count(&self) -> u32 {
        from_db_count(self.repetition_count)
    }

    fn is_archived(&self) -> bool {
        self.is_archived
    }
}

/// Review audit record, one per applied transition
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbReviewLog {
    pub id: Uuid,
    pub card_id: Uuid,
    pub user_id: Uuid,
    pub rating: i16,
    pub reviewed_at: DateTime<Utc>,
    pub duration_ms: Option<i32>,
    pub repetition_count_before: i32,
    pub lapse_count_before: i32,
    pub ease_factor_before: f64,
    pub interval_days_before: i32,
    pub due_at_before: Option<DateTime<Utc>>,
    pub last_reviewed_at_before: Option<DateTime<Utc>>,
    pub repetition_count_after: i32,
    pub lapse_count_after: i32,
    pub ease_factor_after: f64,
    pub interval_days_after: i32,
    pub due_at_after: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl DbReviewLog {
    /// Build the audit row for a transition
    pub fn from_transition(card_id: Uuid, user_id: Uuid, transition: &Transition) -> Result<Self> {
        let before = &transition.previous;
        let after = &transition.next;
        let outcome = &transition.outcome;
        Ok(Self {
            id: Uuid::new_v4(),
            card_id,
            user_id,
            rating: i16::from(outcome.rating.to_value()),
            reviewed_at: outcome.reviewed_at,
            duration_ms: outcome
                .duration_ms
                .map(|ms| to_db_count(ms, "duration_ms"))
                .transpose()?,
            repetition_count_before: to_db_count(before.repetition_count, "repetition_count")?,
            lapse_count_before: to_db_count(before.lapse_count, "lapse_count")?,
            ease_factor_before: before.ease_factor,
            interval_days_before: to_db_count(before.interval_days, "interval_days")?,
            due_at_before: before.due_at,
            last_reviewed_at_before: before.last_reviewed_at,
            repetition_count_after: to_db_count(after.repetition_count, "repetition_count")?,
            lapse_count_after: to_db_count(after.lapse_count, "lapse_count")?,
            ease_factor_after: after.ease_factor,
            interval_days_after: to_db_count(after.interval_days, "interval_days")?,
            due_at_after: after.due_at,
            created_at: Utc::now(),
        })
    }

    /// Convert to API audit record
    pub fn to_api_record(&self) -> Result<ReviewAuditRecord> {
        let rating = Rating::from_value(i64::from(self.rating)).map_err(|e| {
            ApiError::Internal(format!("corrupt review log {}: {}", self.id, e))
        })?;

        Ok(ReviewAuditRecord {
            id: self.id,
            card_id: self.card_id,
            outcome: ReviewOutcome {
                rating,
                reviewed_at: self.reviewed_at,
                duration_ms: self.duration_ms.map(from_db_count),
            },
            before: LearningState {
                repetition_count: from_db_count(self.repetition_count_before),
                lapse_count: from_db_count(self.lapse_count_before),
                ease_factor: self.ease_factor_before,
                interval_days: from_db_count(self.interval_days_before),
                due_at: self.due_at_before,
                last_reviewed_at: self.last_reviewed_at_before,
            },
            after: LearningState {
                repetition_count: from_db_count(self.repetition_count_after),
                lapse_count: from_db_count(self.lapse_count_after),
                ease_factor: self.ease_factor_after,
                interval_days: from_db_count(self.interval_days_after),
                due_at: self.due_at_after,
                last_reviewed_at: Some(self.reviewed_at),
            },
            created_at: self.created_at,
        })
    }
}

/// Non-negative counter from an INTEGER column
pub fn from_db_count(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

/// Counter to an INTEGER column; values past i32::MAX are refused, not truncated
pub fn to_db_count(value: u32, column: &str) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| ApiError::Internal(format!("{column} value {value} exceeds INTEGER range")))
}

// === API Request/Response Types ===

/// Card as returned to study clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyCard {
    pub id: Uuid,
    pub deck_id: Uuid,
    pub front: String,
    pub back: String,
    pub state: LearningState,
}

/// Before/after snapshot of one review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewAuditRecord {
    pub id: Uuid,
    pub card_id: Uuid,
    pub outcome: ReviewOutcome,
    pub before: LearningState,
    pub after: LearningState,
    pub created_at: DateTime<Utc>,
}

// Study types
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitReviewRequest {
    pub card_id: Uuid,
    /// Raw number as sent; validated against `rating_scale`
    pub rating: f64,
    #[serde(default)]
    pub rating_scale: RatingScale,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<u32>,
}

impl SubmitReviewRequest {
    /// Validate and map to a scheduler outcome, defaulting the review time to `now`.
    ///
    /// Review times the scheduler could never place on the calendar are
    /// rejected here, before a card row is locked.
    pub fn validate(
        &self,
        now: DateTime<Utc>,
        scheduler: &dyn Scheduler,
    ) -> Result<ReviewOutcome> {
        let rating = self.rating_scale.to_rating(self.rating)?;
        let mut outcome = ReviewOutcome::new(rating, self.reviewed_at.unwrap_or(now));
        if let Some(duration_ms) = self.duration_ms {
            outcome = outcome.with_duration(duration_ms);
        }
        scheduler.check_outcome(&outcome)?;
        Ok(outcome)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitReviewResponse {
    pub card_id: Uuid,
    pub review_id: Uuid,
    pub previous_state: LearningState,
    pub state: LearningState,
    pub is_due: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StudyQueueQuery {
    pub deck_id: Option<Uuid>,
    pub limit: Option<usize>,
}

impl StudyQueueQuery {
    /// Resolve the requested prefix length against configured bounds
    pub fn resolve_limit(&self, default_limit: usize, max_limit: usize) -> Result<usize> {
        match self.limit {
            Some(0) => Err(ApiError::BadRequest("limit must be at least 1".to_string())),
            Some(n) => Ok(n.min(max_limit)),
            None => Ok(default_limit),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StudyQueueResponse {
    pub cards: Vec<StudyCard>,
    pub total_due: usize,
    pub limit: usize,
}

// Stats types
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StatsQuery {
    pub deck_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: StudyStats,
    pub generated_at: DateTime<Utc>,
}

// Card types
#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewHistoryResponse {
    pub card_id: Uuid,
    pub reviews: Vec<ReviewAuditRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;
    use recall_core::algorithm::sm2::Sm2;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 10, 0, 0).unwrap()
    }

    fn review_request(rating: f64, scale: RatingScale) -> SubmitReviewRequest {
        SubmitReviewRequest {
            card_id: Uuid::new_v4(),
            rating,
            rating_scale: scale,
            reviewed_at: None,
            duration_ms: Some(1500),
        }
    }

    fn db_card() -> DbCard {
        DbCard {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            deck_id: Uuid::new_v4(),
            front: "capital of France?".to_string(),
            back: "Paris".to_string(),
            is_archived: false,
            repetition_count: 2,
            lapse_count: 1,
            ease_factor: 2.5,
            interval_days: 6,
            due_at: Some(now()),
            last_reviewed_at: Some(now() - Duration::days(6)),
            created_at: now(),
            updated_at: now(),
        }
    }

    #[test]
    fn test_validate_defaults_review_time() {
        let outcome = review_request(3.0, RatingScale::FourPoint)
            .validate(now(), &Sm2::default())
            .unwrap();
        assert_eq!(outcome.rating, Rating::Perfect);
        assert_eq!(outcome.reviewed_at, now());
        assert_eq!(outcome.duration_ms, Some(1500));
    }

    #[test]
    fn test_validate_rejects_fractional_rating() {
        let err = review_request(1.5, RatingScale::FourPoint)
            .validate(now(), &Sm2::default())
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        for rating in [-1.0, 4.0] {
            let err = review_request(rating, RatingScale::FourPoint)
                .validate(now(), &Sm2::default())
                .unwrap_err();
            assert!(matches!(err, ApiError::InvalidArgument(_)));
        }
    }

    #[test]
    fn test_validate_maps_six_point_scale() {
        let outcome = review_request(5.0, RatingScale::SixPoint)
            .validate(now(), &Sm2::default())
            .unwrap();
        assert_eq!(outcome.rating, Rating::Perfect);
    }

    #[test]
    fn test_validate_rejects_review_time_past_calendar_end() {
        let mut request = review_request(3.0, RatingScale::FourPoint);
        request.reviewed_at = Some("+262142-12-31T12:00:00Z".parse().unwrap());
        let err = request.validate(now(), &Sm2::default()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[test]
    fn test_validate_without_duration() {
        let mut request = review_request(2.0, RatingScale::FourPoint);
        request.duration_ms = None;
        let outcome = request.validate(now(), &Sm2::default()).unwrap();
        assert_eq!(outcome.duration_ms, None);
    }

    #[test]
    fn test_to_db_count_refuses_overflow() {
        assert_eq!(to_db_count(36_500, "interval_days").unwrap(), 36_500);
        let err = to_db_count(u32::MAX, "interval_days").unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn test_review_log_refuses_unstorable_counter() {
        let card = db_card();
        let mut transition = recall_core::transition(&card.to_learning_state(), 3, now()).unwrap();
        transition.next.repetition_count = u32::MAX;
        let result = DbReviewLog::from_transition(card.id, card.user_id, &transition);
        assert!(matches!(result, Err(ApiError::Internal(_))));
    }

    #[test]
    fn test_review_request_deserializes_with_default_scale() {
        let json = format!(r#"{{"card_id":"{}","rating":2}}"#, Uuid::new_v4());
        let request: SubmitReviewRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(request.rating_scale, RatingScale::FourPoint);
        assert_eq!(request.rating, 2.0);
        assert!(request.reviewed_at.is_none());
    }

    #[test]
    fn test_resolve_limit() {
        let query = StudyQueueQuery::default();
        assert_eq!(query.resolve_limit(20, 200).unwrap(), 20);

        let query = StudyQueueQuery { deck_id: None, limit: Some(500) };
        assert_eq!(query.resolve_limit(20, 200).unwrap(), 200);

        let query = StudyQueueQuery { deck_id: None, limit: Some(0) };
        assert!(query.resolve_limit(20, 200).is_err());
    }

    #[test]
    fn test_db_card_to_learning_state() {
        let state = db_card().to_learning_state();
        assert_eq!(state.repetition_count, 2);
        assert_eq!(state.lapse_count, 1);
        assert_eq!(state.interval_days, 6);
        assert_eq!(state.due_at, Some(now()));
    }

    #[test]
    fn test_review_log_round_trips_snapshots() {
        let card = db_card();
        let transition = recall_core::transition(&card.to_learning_state(), 3, now()).unwrap();
        let log = DbReviewLog::from_transition(card.id, card.user_id, &transition).unwrap();

        assert_eq!(log.rating, 3);
        assert_eq!(log.interval_days_before, 6);
        assert_eq!(log.interval_days_after, 15);

        let record = log.to_api_record().unwrap();
        assert_eq!(record.before, transition.previous);
        assert_eq!(record.after, transition.next);
        assert_eq!(record.outcome, transition.outcome);
    }

    #[test]
    fn test_corrupt_rating_is_internal_error() {
        let card = db_card();
        let transition = recall_core::transition(&card.to_learning_state(), 1, now()).unwrap();
        let mut log = DbReviewLog::from_transition(card.id, card.user_id, &transition).unwrap();
        log.rating = 9;
        assert!(matches!(log.to_api_record(), Err(ApiError::Internal(_))));
    }

    #[test]
    fn test_stats_response_flattens() {
        let response = StatsResponse {
            stats: StudyStats {
                total: 3,
                new: 1,
                due: 1,
                learning: 1,
                mastered: 0,
            },
            generated_at: now(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["total"], 3);
        assert_eq!(value["mastered"], 0);
    }
}
