//! Aggregate study statistics over a collection of cards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Repetition count at which a card stops counting as "learning".
pub const MASTERED_REPETITIONS: u32 = 4;

/// Per-card view needed to compute statistics.
pub trait StatsEntry {
    fn due_at(&self) -> Option<DateTime<Utc>>;
    fn repetition_count(&self) -> u32;
    fn is_archived(&self) -> bool;
}

impl<T: StatsEntry + ?Sized> StatsEntry for &T {
    fn due_at(&self) -> Option<DateTime<Utc>> {
        (**self).due_at()
    }

    fn repetition_count(&self) -> u32 {
        (**self).repetition_count()
    }

    fn is_archived(&self) -> bool {
        (**self).is_archived()
    }
}

/// Card counts for a user or deck.
///
/// `learning` and `due` may overlap: a learning card whose review date has
/// passed is counted in both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyStats {
    pub total: usize,
    pub new: usize,
    pub due: usize,
    pub learning: usize,
    pub mastered: usize,
}

/// Count cards by study bucket. Archived cards are ignored entirely.
pub fn compute_stats<T, I>(cards: I, now: DateTime<Utc>) -> StudyStats
where
    T: StatsEntry,
    I: IntoIterator<Item = T>,
{
    cards
        .into_iter()
        .filter(|card| !card.is_archived())
        .fold(StudyStats::default(), |mut stats, card| {
            stats.total += 1;
            match card.due_at() {
                None => stats.new += 1,
                Some(due_at) if due_at <= now => stats.due += 1,
                Some(_) => {}
            }
            match card.repetition_count() {
                0 => {}
                n if n < MASTERED_REPETITIONS => stats.learning += 1,
                _ => stats.mastered += 1,
            }
            stats
        })
}
