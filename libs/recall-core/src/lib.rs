//! Spaced repetition core shared by the study service.
//!
//! Provides:
//! - SM-2 scheduling of a card's learning state after a review
//! - Due-ness checks and study queue ordering
//! - Aggregate study statistics
//! - Rating types and scale mapping
//!
//! Everything here is pure and synchronous; persistence and concurrency
//! control belong to the caller.

pub mod algorithm;
pub mod error;
pub mod queue;
pub mod stats;
pub mod types;

pub use algorithm::{get_scheduler, transition, Scheduler, Transition};
pub use error::{Result, SchedulerError};
pub use queue::{is_due, order_by_priority, priority_cmp, study_queue, QueueEntry};
pub use stats::{compute_stats, StatsEntry, StudyStats};
pub use types::{LearningState, Rating, RatingScale, ReviewOutcome};
