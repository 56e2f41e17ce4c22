//! PostgreSQL database operations

use chrono::{DateTime, Utc};
use recall_core::Scheduler;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;

const CARD_COLUMNS: &str = r#"
    id, user_id, deck_id, front, back, is_archived,
    repetition_count, lapse_count, ease_factor, interval_days,
    due_at, last_reviewed_at, created_at, updated_at
"#;

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

/// Outcome of a review persisted together with its audit record
#[derive(Debug, Clone)]
pub struct AppliedReview {
    pub transition: Transition,
    pub review_id: Uuid,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a pool that opens connections on first use
    pub fn connect_lazy(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new().connect_lazy(database_url)?;
        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // === Card Repository ===

    /// Get a card owned by the user
    pub async fn get_card(&self, user_id: Uuid, card_id: Uuid) -> Result<Option<DbCard>> {
        let card = sqlx::query_as::<_, DbCard>(&format!(
            "SELECT {CARD_COLUMNS} FROM cards WHERE id = $1 AND user_id = $2"
        ))
        .bind(card_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(card)
    }

    /// Non-archived cards that are due at `now`, optionally for one deck
    pub async fn get_due_cards(
        &self,
        user_id: Uuid,
        deck_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<Vec<DbCard>> {
        let cards = sqlx::query_as::<_, DbCard>(&format!(
            r#"
            SELECT {CARD_COLUMNS}
            FROM cards
            WHERE user_id = $1
              AND NOT is_archived
              AND (due_at IS NULL OR due_at <= $2)
              AND ($3::UUID IS NULL OR deck_id = $3)
            ORDER BY created_at, id
            "#
        ))
        .bind(user_id)
        .bind(now)
        .bind(deck_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(cards)
    }

    /// All cards for a user including archived ones, optionally for one deck
    pub async fn get_cards(&self, user_id: Uuid, deck_id: Option<Uuid>) -> Result<Vec<DbCard>> {
        let cards = sqlx::query_as::<_, DbCard>(&format!(
            r#"
            SELECT {CARD_COLUMNS}
            FROM cards
            WHERE user_id = $1 AND ($2::UUID IS NULL OR deck_id = $2)
            ORDER BY created_at, id
            "#
        ))
        .bind(user_id)
        .bind(deck_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(cards)
    }

    // === Review Repository ===

    /// Apply a review to a card and record the audit entry atomically.
    ///
    /// The card row is locked for the duration of the transaction, so two
    /// concurrent reviews of the same card are applied one after the other.
    /// Returns `None` when the card does not exist for this user.
    pub async fn apply_review(
        &self,
        user_id: Uuid,
        card_id: Uuid,
        outcome: ReviewOutcome,
        scheduler: &dyn Scheduler,
    ) -> Result<Option<AppliedReview>> {
        let mut tx = self.pool.begin().await?;

        let card = sqlx::query_as::<_, DbCard>(&format!(
            "SELECT {CARD_COLUMNS} FROM cards WHERE id = $1 AND user_id = $2 FOR UPDATE"
        ))
        .bind(card_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(card) = card else {
            tx.rollback().await?;
            return Ok(None);
        };

        // Dropping `tx` on error rolls back, releasing the row lock
        let transition = scheduler.schedule(&card.to_learning_state(), outcome)?;
        let next = &transition.next;
        let log = DbReviewLog::from_transition(card_id, user_id, &transition)?;

        sqlx::query(
            r#"
            UPDATE cards SET
                repetition_count = $1,
                lapse_count = $2,
                ease_factor = $3,
                interval_days = $4,
                due_at = $5,
                last_reviewed_at = $6,
                updated_at = NOW()
            WHERE id = $7
            "#,
        )
        .bind(log.repetition_count_after)
        .bind(log.lapse_count_after)
        .bind(next.ease_factor)
        .bind(log.interval_days_after)
        .bind(next.due_at)
        .bind(next.last_reviewed_at)
        .bind(card_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO review_logs (id, card_id, user_id, rating, reviewed_at, duration_ms,
                                     repetition_count_before, lapse_count_before, ease_factor_before,
                                     interval_days_before, due_at_before, last_reviewed_at_before,
                                     repetition_count_after, lapse_count_after, ease_factor_after,
                                     interval_days_after, due_at_after)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(log.id)
        .bind(log.card_id)
        .bind(log.user_id)
        .bind(log.rating)
        .bind(log.reviewed_at)
        .bind(log.duration_ms)
        .bind(log.repetition_count_before)
        .bind(log.lapse_count_before)
        .bind(log.ease_factor_before)
        .bind(log.interval_days_before)
        .bind(log.due_at_before)
        .bind(log.last_reviewed_at_before)
        .bind(log.repetition_count_after)
        .bind(log.lapse_count_after)
        .bind(log.ease_factor_after)
        .bind(log.interval_days_after)
        .bind(log.due_at_after)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(AppliedReview {
            transition,
            review_id: log.id,
        }))
    }

    /// Audit records for a card, newest first
    pub async fn get_review_logs(&self, user_id: Uuid, card_id: Uuid) -> Result<Vec<DbReviewLog>> {
        let logs = sqlx::query_as::<_, DbReviewLog>(
            r#"
            SELECT id, card_id, user_id, rating, reviewed_at, duration_ms,
                   repetition_count_before, lapse_count_before, ease_factor_before,
                   interval_days_before, due_at_before, last_reviewed_at_before,
                   repetition_count_after, lapse_count_after, ease_factor_after,
                   interval_days_after, due_at_after, created_at
            FROM review_logs
            WHERE card_id = $1 AND user_id = $2
            ORDER BY reviewed_at DESC, created_at DESC
            "#,
        )
        .bind(card_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }
}
