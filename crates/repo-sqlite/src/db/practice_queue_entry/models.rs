// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use semval::prelude::*;
use tunequeue_core::{PracticeQueueEntry, ReviewSchedule, TuneId, UserId, util::is_blank};

use super::schema::*;
use crate::prelude::*;

#[derive(Debug, Clone, Queryable)]
pub(crate) struct QueryableRecord {
    pub(crate) user_id: String,
    pub(crate) tune_id: i64,
    pub(crate) added_ms: TimestampMillis,
    pub(crate) due_ms: TimestampMillis,
    pub(crate) last_reviewed_ms: Option<TimestampMillis>,
    pub(crate) interval_days: i64,
    pub(crate) review_count: i64,
}

impl StoredRecord for QueryableRecord {
    type Decoded = PracticeQueueEntry;

    const TABLE_NAME: &'static str = "practice_queue_entry";

    fn row_key(&self) -> String {
        format!("{}/{}", self.user_id, self.tune_id)
    }

    fn decode(self) -> anyhow::Result<PracticeQueueEntry> {
        let Self {
            user_id,
            tune_id,
            added_ms,
            due_ms,
            last_reviewed_ms,
            interval_days,
            review_count,
        } = self;
        if is_blank(&user_id) {
            anyhow::bail!("empty user id");
        }
        let schedule = ReviewSchedule {
            due_at: UtcDateTimeMs::from_unix_timestamp_millis(due_ms),
            last_reviewed_at: last_reviewed_ms.map(UtcDateTimeMs::from_unix_timestamp_millis),
            interval_days: u32::try_from(interval_days)
                .map_err(|_| anyhow::anyhow!("invalid interval: {interval_days} day(s)"))?,
            review_count: u32::try_from(review_count)
                .map_err(|_| anyhow::anyhow!("invalid review count: {review_count}"))?,
        };
        if let Err(err) = schedule.validate() {
            anyhow::bail!("invalid review schedule: {err:?}");
        }
        Ok(PracticeQueueEntry {
            user_id: UserId::new(user_id),
            tune_id: TuneId::new(tune_id),
            added_at: UtcDateTimeMs::from_unix_timestamp_millis(added_ms),
            schedule,
        })
    }
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(
    table_name = practice_queue_entry,
    primary_key(user_id, tune_id),
    treat_none_as_null = true
)]
pub(crate) struct InsertableRecord<'a> {
    pub(crate) user_id: &'a str,
    pub(crate) tune_id: i64,
    pub(crate) added_ms: TimestampMillis,
    pub(crate) due_ms: TimestampMillis,
    pub(crate) last_reviewed_ms: Option<TimestampMillis>,
    pub(crate) interval_days: i64,
    pub(crate) review_count: i64,
}

impl<'a> InsertableRecord<'a> {
    pub(crate) fn bind(entry: &'a PracticeQueueEntry) -> Self {
        let PracticeQueueEntry {
            user_id,
            tune_id,
            added_at,
            schedule:
                ReviewSchedule {
                    due_at,
                    last_reviewed_at,
                    interval_days,
                    review_count,
                },
        } = entry;
        Self {
            user_id: user_id.as_str(),
            tune_id: tune_id.to_inner(),
            added_ms: added_at.unix_timestamp_millis(),
            due_ms: due_at.unix_timestamp_millis(),
            last_reviewed_ms: last_reviewed_at.map(|at| at.unix_timestamp_millis()),
            interval_days: (*interval_days).into(),
            review_count: (*review_count).into(),
        }
    }
}
