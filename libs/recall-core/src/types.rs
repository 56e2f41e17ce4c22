//! Core types for the scheduler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulerError};

/// Recall quality for a single review, on the scheduler's 0-3 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub enum Rating {
    /// Complete failure to recall.
    Blackout,
    /// Failed, but the answer was recognized.
    Forgot,
    /// Correct with hesitation.
    Hesitant,
    /// Perfect recall.
    Perfect,
}

impl Rating {
    /// Highest value on the scheduler scale.
    pub const MAX: u8 = 3;

    /// Lowest value counted as a successful recall.
    pub const PASSING: u8 = 2;

    /// Numeric value (0-3).
    pub fn to_value(self) -> u8 {
        match self {
            Self::Blackout => 0,
            Self::Forgot => 1,
            Self::Hesitant => 2,
            Self::Perfect => 3,
        }
    }

    /// Create from an integer, rejecting anything outside 0-3.
    pub fn from_value(value: i64) -> Result<Self> {
        match value {
            0 => Ok(Self::Blackout),
            1 => Ok(Self::Forgot),
            2 => Ok(Self::Hesitant),
            3 => Ok(Self::Perfect),
            other => Err(SchedulerError::rating_out_of_range(other, Self::MAX)),
        }
    }

    /// Create from an arbitrary JSON-style number.
    ///
    /// Fractional, infinite and NaN values are rejected rather than rounded.
    pub fn from_number(value: f64) -> Result<Self> {
        Self::from_value(integral(value, Self::MAX)?)
    }

    pub fn is_success(self) -> bool {
        self.to_value() >= Self::PASSING
    }
}

impl TryFrom<i64> for Rating {
    type Error = SchedulerError;

    fn try_from(value: i64) -> Result<Self> {
        Self::from_value(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.to_value()
    }
}

fn integral(value: f64, max: u8) -> Result<i64> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(SchedulerError::InvalidArgument(format!(
            "rating {value} is not an integer"
        )));
    }
    if value < i64::MIN as f64 || value > i64::MAX as f64 {
        return Err(SchedulerError::rating_out_of_range(value, max));
    }
    Ok(value as i64)
}

/// Scale a rating was submitted on, before it is mapped to [`Rating`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RatingScale {
    /// 0-3, identical to the scheduler scale.
    #[default]
    #[serde(rename = "4point")]
    FourPoint,
    /// Classic 0-5 SM-2 quality grades.
    #[serde(rename = "6point")]
    SixPoint,
    /// Wrong (0) or right (1).
    #[serde(rename = "2point")]
    TwoPoint,
}

impl RatingScale {
    /// Largest value accepted on this scale.
    pub fn max_value(self) -> u8 {
        match self {
            Self::FourPoint => 3,
            Self::SixPoint => 5,
            Self::TwoPoint => 1,
        }
    }

    /// Map a submitted value down to the scheduler scale.
    ///
    /// 6-point: 0,1 -> 0; 2 -> 1; 3 -> 2; 4,5 -> 3.
    /// 2-point: 0 -> 0; 1 -> 2.
    pub fn to_rating(self, value: f64) -> Result<Rating> {
        let max = self.max_value();
        let value = integral(value, max)?;
        match self {
            Self::FourPoint => Rating::from_value(value),
            Self::SixPoint => match value {
                0 | 1 => Ok(Rating::Blackout),
                2 => Ok(Rating::Forgot),
                3 => Ok(Rating::Hesitant),
                4 | 5 => Ok(Rating::Perfect),
                other => Err(SchedulerError::rating_out_of_range(other, max)),
            },
            Self::TwoPoint => match value {
                0 => Ok(Rating::Blackout),
                1 => Ok(Rating::Hesitant),
                other => Err(SchedulerError::rating_out_of_range(other, max)),
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FourPoint => "4point",
            Self::SixPoint => "6point",
            Self::TwoPoint => "2point",
        }
    }
}

/// Per-card learning state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningState {
    pub repetition_count: u32,
    pub lapse_count: u32,
    pub ease_factor: f64,
    pub interval_days: u32,
    pub due_at: Option<DateTime<Utc>>,
    pub last_reviewed_at: Option<DateTime<Utc>>,
}

impl Default for LearningState {
    fn default() -> Self {
        Self {
            repetition_count: 0,
            lapse_count: 0,
            ease_factor: 2.5,
            interval_days: 0,
            due_at: None,
            last_reviewed_at: None,
        }
    }
}

impl LearningState {
    /// Whether the card has never been scheduled.
    pub fn is_new(&self) -> bool {
        self.due_at.is_none()
    }

    /// Whether the card may be reviewed at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        crate::queue::is_due(self, now)
    }
}

/// A single review as submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewOutcome {
    pub rating: Rating,
    pub reviewed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u32>,
}

impl ReviewOutcome {
    pub fn new(rating: Rating, reviewed_at: DateTime<Utc>) -> Self {
        Self {
            rating,
            reviewed_at,
            duration_ms: None,
        }
    }

    pub fn with_duration(mut self, duration_ms: u32) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}
