//! Spaced repetition scheduling.

pub mod sm2;

use crate::error::Result;
use crate::types::{LearningState, Rating, ReviewOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of scheduling a card after review.
///
/// Carries both snapshots so the caller can write an audit entry alongside
/// the new state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub previous: LearningState,
    pub next: LearningState,
    pub outcome: ReviewOutcome,
}

/// Trait for spaced repetition schedulers.
pub trait Scheduler: Send + Sync {
    /// Scheduler identifier.
    fn name(&self) -> &'static str;

    /// Reject an outcome that could never be scheduled, before any state is loaded.
    fn check_outcome(&self, _outcome: &ReviewOutcome) -> Result<()> {
        Ok(())
    }

    /// Calculate the next learning state after a review.
    ///
    /// Fails with `InvalidArgument` when the next due date is not representable.
    fn schedule(&self, state: &LearningState, outcome: ReviewOutcome) -> Result<Transition>;

    /// Initial state for a new card.
    fn initial_state(&self) -> LearningState;
}

/// Get scheduler by name.
pub fn get_scheduler(name: &str) -> Option<Box<dyn Scheduler>> {
    match name {
        "sm2" => Some(Box::new(sm2::Sm2::default())),
        _ => None,
    }
}

/// Apply a raw 0-3 rating to `state` with the default SM-2 parameters.
///
/// The rating is validated before any arithmetic; an out-of-range value
/// yields `InvalidArgument` and no transition. So does a review time whose
/// next due date falls outside the calendar.
pub fn transition(
    state: &LearningState,
    rating: i64,
    reviewed_at: DateTime<Utc>,
) -> Result<Transition> {
    let rating = Rating::from_value(rating)?;
    sm2::Sm2::default().schedule(state, ReviewOutcome::new(rating, reviewed_at))
}
