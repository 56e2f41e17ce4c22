//! SM-2 spaced repetition algorithm.
//!
//! Based on SuperMemo 2 with configurable parameters. Unlike canonical SM-2
//! a lapse leaves the ease factor untouched; only successful reviews move it.

use super::{Scheduler, Transition};
use crate::error::{Result, SchedulerError};
use crate::types::{LearningState, Rating, ReviewOutcome};
use chrono::{DateTime, Duration, Utc};

/// SM-2 algorithm with configurable parameters.
#[derive(Debug, Clone)]
pub struct Sm2 {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    /// Interval after the first successful repetition.
    pub first_interval: u32,
    /// Interval after the second successful repetition.
    pub second_interval: u32,
    /// Interval after a lapse.
    pub lapse_interval: u32,
    /// Upper bound on any scheduled interval.
    pub maximum_interval: u32,
}

impl Default for Sm2 {
    fn default() -> Self {
        Self {
            initial_ease: 2.5,
            minimum_ease: 1.3,
            first_interval: 1,
            second_interval: 6,
            lapse_interval: 1,
            maximum_interval: 36_500,
        }
    }
}

impl Scheduler for Sm2 {
    fn name(&self) -> &'static str {
        "sm2"
    }

    fn initial_state(&self) -> LearningState {
        LearningState {
            ease_factor: self.initial_ease,
            ..LearningState::default()
        }
    }

    fn check_outcome(&self, outcome: &ReviewOutcome) -> Result<()> {
        self.due_after(outcome.reviewed_at, self.maximum_interval)
            .map(|_| ())
    }

    fn schedule(&self, state: &LearningState, outcome: ReviewOutcome) -> Result<Transition> {
        let (repetition_count, interval_days, ease_factor, lapse_count) =
            if outcome.rating.is_success() {
                self.schedule_success(state, outcome.rating)
            } else {
                self.schedule_lapse(state)
            };

        let reviewed_at = outcome.reviewed_at;
        let next = LearningState {
            repetition_count,
            lapse_count,
            ease_factor: round_ease(ease_factor),
            interval_days,
            due_at: Some(self.due_after(reviewed_at, interval_days)?),
            last_reviewed_at: Some(reviewed_at),
        };

        Ok(Transition {
            previous: state.clone(),
            next,
            outcome,
        })
    }
}

impl Sm2 {
    fn due_after(&self, reviewed_at: DateTime<Utc>, interval_days: u32) -> Result<DateTime<Utc>> {
        reviewed_at
            .checked_add_signed(Duration::days(i64::from(interval_days)))
            .ok_or_else(|| {
                SchedulerError::InvalidArgument(format!(
                    "reviewed_at {reviewed_at} plus {interval_days} days is out of range"
                ))
            })
    }

    fn schedule_lapse(&self, state: &LearningState) -> (u32, u32, f64, u32) {
        (
            0,
            self.lapse_interval,
            state.ease_factor,
            state.lapse_count.saturating_add(1),
        )
    }

    fn schedule_success(&self, state: &LearningState, rating: Rating) -> (u32, u32, f64, u32) {
        let repetition_count = state.repetition_count.saturating_add(1);
        let interval = match repetition_count {
            1 => self.first_interval,
            2 => self.second_interval,
            _ => {
                let grown = (f64::from(state.interval_days) * state.ease_factor).round();
                (grown.min(f64::from(self.maximum_interval)) as u32).max(1)
            }
        };

        let q = f64::from(Rating::MAX - rating.to_value());
        let ease = (state.ease_factor + 0.1 - q * (0.08 + q * 0.02)).max(self.minimum_ease);

        (repetition_count, interval, ease, state.lapse_count)
    }
}

/// Round to two decimals, half away from zero.
fn round_ease(ease: f64) -> f64 {
    (ease * 100.0).round() / 100.0
}
