// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tunequeue_repo::quarantine::QuarantinedRecord;

use super::schema::*;
use crate::prelude::*;

#[derive(Debug, Queryable)]
pub(crate) struct QueryableRecord {
    pub(crate) row_id: RowId,
    pub(crate) table_name: String,
    pub(crate) row_key: String,
    pub(crate) reason: String,
    pub(crate) content: Option<String>,
    pub(crate) quarantined_ms: TimestampMillis,
}

impl From<QueryableRecord> for QuarantinedRecord {
    fn from(from: QueryableRecord) -> Self {
        let QueryableRecord {
            row_id: _,
            table_name,
            row_key,
            reason,
            content,
            quarantined_ms,
        } = from;
        Self {
            table: table_name,
            key: row_key,
            reason,
            content,
            quarantined_at: UtcDateTimeMs::from_unix_timestamp_millis(quarantined_ms),
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = quarantine)]
pub(crate) struct InsertableRecord<'a> {
    pub(crate) table_name: &'a str,
    pub(crate) row_key: &'a str,
    pub(crate) reason: &'a str,
    pub(crate) content: Option<&'a str>,
    pub(crate) quarantined_ms: TimestampMillis,
}

impl<'a> InsertableRecord<'a> {
    pub(crate) fn bind(record: &'a QuarantinedRecord) -> Self {
        let QuarantinedRecord {
            table,
            key,
            reason,
            content,
            quarantined_at,
        } = record;
        Self {
            table_name: table,
            row_key: key,
            reason,
            content: content.as_deref(),
            quarantined_ms: quarantined_at.unix_timestamp_millis(),
        }
    }
}
