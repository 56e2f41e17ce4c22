//! Due-ness checks and study queue ordering.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::types::LearningState;

/// Anything that can be placed in a study queue.
pub trait QueueEntry {
    fn due_at(&self) -> Option<DateTime<Utc>>;
    fn interval_days(&self) -> u32;
}

impl QueueEntry for LearningState {
    fn due_at(&self) -> Option<DateTime<Utc>> {
        self.due_at
    }

    fn interval_days(&self) -> u32 {
        self.interval_days
    }
}

impl<T: QueueEntry + ?Sized> QueueEntry for &T {
    fn due_at(&self) -> Option<DateTime<Utc>> {
        (**self).due_at()
    }

    fn interval_days(&self) -> u32 {
        (**self).interval_days()
    }
}

/// A card that was never scheduled is always due.
pub fn is_due<T: QueueEntry + ?Sized>(card: &T, now: DateTime<Utc>) -> bool {
    match card.due_at() {
        None => true,
        Some(due_at) => now >= due_at,
    }
}

/// Study priority: unscheduled first, then earliest due, then shortest interval.
pub fn priority_cmp<T: QueueEntry + ?Sized>(a: &T, b: &T) -> Ordering {
    match (a.due_at(), b.due_at()) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.cmp(&y),
    }
    .then_with(|| a.interval_days().cmp(&b.interval_days()))
}

/// Order cards for study. Stable: ties keep their input order.
pub fn order_by_priority<T, I>(cards: I) -> Vec<T>
where
    T: QueueEntry,
    I: IntoIterator<Item = T>,
{
    let mut ordered: Vec<T> = cards.into_iter().collect();
    ordered.sort_by(|a, b| priority_cmp(a, b));
    ordered
}

/// Due cards at `now`, in priority order, cut to at most `limit`.
pub fn study_queue<T, I>(cards: I, now: DateTime<Utc>, limit: usize) -> Vec<T>
where
    T: QueueEntry,
    I: IntoIterator<Item = T>,
{
    let mut queue = order_by_priority(cards.into_iter().filter(|card| is_due(card, now)));
    queue.truncate(limit);
    queue
}
