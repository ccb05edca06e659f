// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tunequeue_core::{SyncCursor, UserId};

use super::schema::*;
use crate::prelude::*;

#[derive(Debug, Queryable)]
pub(crate) struct QueryableRecord {
    pub(crate) user_id: String,
    pub(crate) cursor: String,
    pub(crate) updated_ms: TimestampMillis,
}

impl From<QueryableRecord> for SyncCursor {
    fn from(from: QueryableRecord) -> Self {
        let QueryableRecord {
            user_id,
            cursor,
            updated_ms,
        } = from;
        Self {
            user_id: UserId::new(user_id),
            cursor,
            updated_at: UtcDateTimeMs::from_unix_timestamp_millis(updated_ms),
        }
    }
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = sync_cursor, primary_key(user_id))]
pub(crate) struct InsertableRecord<'a> {
    pub(crate) user_id: &'a str,
    pub(crate) cursor: &'a str,
    pub(crate) updated_ms: TimestampMillis,
}

impl<'a> InsertableRecord<'a> {
    pub(crate) fn bind(sync_cursor: &'a SyncCursor) -> Self {
        let SyncCursor {
            user_id,
            cursor,
            updated_at,
        } = sync_cursor;
        Self {
            user_id: user_id.as_str(),
            cursor,
            updated_ms: updated_at.unix_timestamp_millis(),
        }
    }
}
