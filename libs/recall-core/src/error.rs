//! Error types for recall-core.

use thiserror::Error;

/// Result type alias using SchedulerError.
pub type Result<T> = std::result::Result<T, SchedulerError>;

/// Errors raised by the scheduler.
///
/// Rejection happens before any state is computed, so a caller that gets
/// an error back has nothing to persist.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchedulerError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl SchedulerError {
    pub(crate) fn rating_out_of_range(value: impl std::fmt::Display, max: u8) -> Self {
        Self::InvalidArgument(format!("rating {value} is outside 0..={max}"))
    }
}
