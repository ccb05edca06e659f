// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tunequeue_core::{Delta, UserId};
use tunequeue_repo::sync::DeferredDelta;

use super::schema::*;
use crate::prelude::*;

#[derive(Debug, Clone, Queryable)]
pub(crate) struct QueryableRecord {
    pub(crate) row_id: RowId,
    pub(crate) user_id: String,
    pub(crate) revision_id: String,
    pub(crate) delta: String,
    pub(crate) deferred_ms: TimestampMillis,
}

impl StoredRecord for QueryableRecord {
    type Decoded = DeferredDelta;

    const TABLE_NAME: &'static str = "deferred_delta";

    fn row_key(&self) -> String {
        self.row_id.to_string()
    }

    fn decode(self) -> anyhow::Result<DeferredDelta> {
        let Self {
            row_id,
            user_id,
            revision_id,
            delta,
            deferred_ms,
        } = self;
        let delta: Delta = serde_json::from_str(&delta)?;
        if delta.revision_id.as_str() != revision_id {
            anyhow::bail!(
                "mismatching revision id: expected {revision_id}, actual {actual}",
                actual = delta.revision_id
            );
        }
        Ok(DeferredDelta {
            id: row_id.into(),
            user_id: UserId::new(user_id),
            delta,
            deferred_at: UtcDateTimeMs::from_unix_timestamp_millis(deferred_ms),
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = deferred_delta)]
pub(crate) struct InsertableRecord<'a> {
    pub(crate) user_id: &'a str,
    pub(crate) revision_id: &'a str,
    pub(crate) delta: String,
    pub(crate) deferred_ms: TimestampMillis,
}

impl<'a> InsertableRecord<'a> {
    pub(crate) fn try_bind(
        user_id: &'a UserId,
        delta: &'a Delta,
        deferred_at: UtcDateTimeMs,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            user_id: user_id.as_str(),
            revision_id: delta.revision_id.as_str(),
            delta: serde_json::to_string(delta)?,
            deferred_ms: deferred_at.unix_timestamp_millis(),
        })
    }
}
