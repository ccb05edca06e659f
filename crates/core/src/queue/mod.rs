// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::cmp::Ordering;

use crate::{TuneId, UserId, prelude::*};

/// Spaced-repetition state of a tune under active review.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReviewSchedule {
    pub due_at: UtcDateTimeMs,

    pub last_reviewed_at: Option<UtcDateTimeMs>,

    /// Current review interval. Zero until the first review.
    pub interval_days: u32,

    pub review_count: u32,
}

impl ReviewSchedule {
    /// The schedule of a tune that has just been added to the queue.
    ///
    /// It is due immediately.
    #[must_use]
    pub const fn initial(added_at: UtcDateTimeMs) -> Self {
        Self {
            due_at: added_at,
            last_reviewed_at: None,
            interval_days: 0,
            review_count: 0,
        }
    }

    #[must_use]
    pub fn is_due(&self, as_of: UtcDateTimeMs) -> bool {
        self.due_at <= as_of
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReviewScheduleInvalidity {
    ReviewedWithoutCount,
    DueBeforeLastReview,
}

impl Validate for ReviewSchedule {
    type Invalidity = ReviewScheduleInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        ValidationContext::new()
            .invalidate_if(
                self.last_reviewed_at.is_some() && self.review_count == 0,
                ReviewScheduleInvalidity::ReviewedWithoutCount,
            )
            .invalidate_if(
                self.last_reviewed_at
                    .is_some_and(|last_reviewed_at| self.due_at < last_reviewed_at),
                ReviewScheduleInvalidity::DueBeforeLastReview,
            )
            .into()
    }
}

/// A repertoire tune that is under active review.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PracticeQueueEntry {
    pub user_id: UserId,

    pub tune_id: TuneId,

    pub added_at: UtcDateTimeMs,

    pub schedule: ReviewSchedule,
}

impl PracticeQueueEntry {
    #[must_use]
    pub fn new(user_id: UserId, tune_id: TuneId, added_at: UtcDateTimeMs) -> Self {
        Self {
            user_id,
            tune_id,
            added_at,
            schedule: ReviewSchedule::initial(added_at),
        }
    }

    /// Ordering of the practice queue.
    ///
    /// Earliest due date first, ties broken by tune id.
    #[must_use]
    pub fn queue_order(lhs: &Self, rhs: &Self) -> Ordering {
        lhs.schedule
            .due_at
            .cmp(&rhs.schedule.due_at)
            .then_with(|| lhs.tune_id.cmp(&rhs.tune_id))
    }
}

/// The practice queue of a user at a given point in time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PracticeQueue {
    pub as_of: UtcDateTimeMs,

    /// Ordered by [`PracticeQueueEntry::queue_order()`].
    pub entries: Vec<PracticeQueueEntry>,
}

impl PracticeQueue {
    #[must_use]
    pub fn new(as_of: UtcDateTimeMs, mut entries: Vec<PracticeQueueEntry>) -> Self {
        entries.sort_by(PracticeQueueEntry::queue_order);
        Self { as_of, entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn tune_ids(&self) -> impl Iterator<Item = TuneId> + '_ {
        self.entries.iter().map(|entry| entry.tune_id)
    }

    /// Entries that are due for review.
    pub fn due_entries(&self) -> impl Iterator<Item = &PracticeQueueEntry> + '_ {
        let as_of = self.as_of;
        self.entries
            .iter()
            .take_while(move |entry| entry.schedule.is_due(as_of))
    }

    /// Entries that are scheduled for a later review.
    pub fn upcoming_entries(&self) -> impl Iterator<Item = &PracticeQueueEntry> + '_ {
        let as_of = self.as_of;
        self.entries
            .iter()
            .skip_while(move |entry| entry.schedule.is_due(as_of))
    }
}

#[cfg(test)]
mod tests;
