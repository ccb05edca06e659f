// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tunequeue_core::{RepertoireEntry, TuneId, UserId, util::is_blank};

use super::schema::*;
use crate::prelude::*;

#[derive(Debug, Clone, Queryable)]
pub(crate) struct QueryableRecord {
    pub(crate) user_id: String,
    pub(crate) tune_id: i64,
    pub(crate) added_ms: TimestampMillis,
}

impl StoredRecord for QueryableRecord {
    type Decoded = RepertoireEntry;

    const TABLE_NAME: &'static str = "repertoire_entry";

    fn row_key(&self) -> String {
        format!("{}/{}", self.user_id, self.tune_id)
    }

    fn decode(self) -> anyhow::Result<RepertoireEntry> {
        let Self {
            user_id,
            tune_id,
            added_ms,
        } = self;
        if is_blank(&user_id) {
            anyhow::bail!("empty user id");
        }
        Ok(RepertoireEntry {
            user_id: UserId::new(user_id),
            tune_id: TuneId::new(tune_id),
            added_at: UtcDateTimeMs::from_unix_timestamp_millis(added_ms),
        })
    }
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = repertoire_entry, primary_key(user_id, tune_id))]
pub(crate) struct InsertableRecord<'a> {
    pub(crate) user_id: &'a str,
    pub(crate) tune_id: i64,
    pub(crate) added_ms: TimestampMillis,
}

impl<'a> InsertableRecord<'a> {
    pub(crate) fn bind(entry: &'a RepertoireEntry) -> Self {
        let RepertoireEntry {
            user_id,
            tune_id,
            added_at,
        } = entry;
        Self {
            user_id: user_id.as_str(),
            tune_id: tune_id.to_inner(),
            added_ms: added_at.unix_timestamp_millis(),
        }
    }
}
