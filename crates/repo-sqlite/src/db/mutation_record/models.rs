// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::collections::BTreeSet;

use semval::prelude::*;
use tunequeue_core::{Entity, MutationKind, MutationRecord, MutationState, TuneId, UserId};
use tunequeue_repo::mutation::RecordHeader;

use super::schema::*;
use crate::prelude::*;

fn encode_tune_ids(tune_ids: &BTreeSet<TuneId>) -> anyhow::Result<String> {
    serde_json::to_string(tune_ids).map_err(Into::into)
}

fn decode_tune_ids(json: &str) -> anyhow::Result<BTreeSet<TuneId>> {
    serde_json::from_str(json).map_err(Into::into)
}

fn encode_entities(entities: &[Entity]) -> anyhow::Result<String> {
    serde_json::to_string(entities).map_err(Into::into)
}

fn decode_entities(json: &str) -> anyhow::Result<Vec<Entity>> {
    serde_json::from_str(json).map_err(Into::into)
}

#[derive(Debug, Clone, Queryable)]
pub(crate) struct QueryableRecord {
    pub(crate) row_id: RowId,
    pub(crate) row_created_ms: TimestampMillis,
    pub(crate) row_updated_ms: TimestampMillis,
    pub(crate) idempotency_key: String,
    pub(crate) user_id: String,
    pub(crate) kind: String,
    pub(crate) targets: String,
    pub(crate) effect: String,
    pub(crate) removed: String,
    pub(crate) state: String,
    pub(crate) attempt_count: i64,
    pub(crate) next_attempt_ms: Option<TimestampMillis>,
    pub(crate) failure_reason: Option<String>,
}

impl StoredRecord for QueryableRecord {
    type Decoded = (RecordHeader, MutationRecord);

    const TABLE_NAME: &'static str = "mutation_record";

    fn row_key(&self) -> String {
        self.row_id.to_string()
    }

    fn decode(self) -> anyhow::Result<Self::Decoded> {
        let Self {
            row_id,
            row_created_ms,
            row_updated_ms,
            idempotency_key,
            user_id,
            kind,
            targets,
            effect,
            removed,
            state,
            attempt_count,
            next_attempt_ms,
            failure_reason,
        } = self;
        let created_at = UtcDateTimeMs::from_unix_timestamp_millis(row_created_ms);
        let updated_at = UtcDateTimeMs::from_unix_timestamp_millis(row_updated_ms);
        let header = RecordHeader {
            id: row_id.into(),
            created_at,
            updated_at,
        };
        let key = idempotency_key
            .parse()
            .map_err(|err| anyhow::anyhow!("invalid idempotency key {idempotency_key}: {err}"))?;
        let kind = kind
            .parse::<MutationKind>()
            .map_err(|_| anyhow::anyhow!("unknown mutation kind {kind}"))?;
        let state = state
            .parse::<MutationState>()
            .map_err(|_| anyhow::anyhow!("unknown mutation state {state}"))?;
        let record = MutationRecord {
            key,
            user_id: UserId::new(user_id),
            kind,
            targets: decode_tune_ids(&targets)?,
            effect: decode_tune_ids(&effect)?,
            removed: decode_entities(&removed)?,
            state,
            attempt_count: u32::try_from(attempt_count)
                .map_err(|_| anyhow::anyhow!("invalid attempt count {attempt_count}"))?,
            created_at,
            updated_at,
            next_attempt_at: next_attempt_ms.map(UtcDateTimeMs::from_unix_timestamp_millis),
            failure_reason,
        };
        if let Err(err) = record.validate() {
            anyhow::bail!("invalid mutation record: {err:?}");
        }
        Ok((header, record))
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = mutation_record)]
pub(crate) struct InsertableRecord<'a> {
    pub(crate) row_created_ms: TimestampMillis,
    pub(crate) row_updated_ms: TimestampMillis,
    pub(crate) idempotency_key: String,
    pub(crate) user_id: &'a str,
    pub(crate) kind: &'static str,
    pub(crate) targets: String,
    pub(crate) effect: String,
    pub(crate) removed: String,
    pub(crate) state: &'static str,
    pub(crate) attempt_count: i64,
    pub(crate) next_attempt_ms: Option<TimestampMillis>,
    pub(crate) failure_reason: Option<&'a str>,
}

impl<'a> InsertableRecord<'a> {
    pub(crate) fn try_bind(record: &'a MutationRecord) -> anyhow::Result<Self> {
        let MutationRecord {
            key,
            user_id,
            kind,
            targets,
            effect,
            removed,
            state,
            attempt_count,
            created_at,
            updated_at,
            next_attempt_at,
            failure_reason,
        } = record;
        Ok(Self {
            row_created_ms: created_at.unix_timestamp_millis(),
            row_updated_ms: updated_at.unix_timestamp_millis(),
            idempotency_key: key.to_string(),
            user_id: user_id.as_str(),
            kind: (*kind).into(),
            targets: encode_tune_ids(targets)?,
            effect: encode_tune_ids(effect)?,
            removed: encode_entities(removed)?,
            state: (*state).into(),
            attempt_count: (*attempt_count).into(),
            next_attempt_ms: next_attempt_at.map(|at| at.unix_timestamp_millis()),
            failure_reason: failure_reason.as_deref(),
        })
    }
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = mutation_record, treat_none_as_null = true)]
pub(crate) struct UpdatableRecord<'a> {
    pub(crate) row_updated_ms: TimestampMillis,
    pub(crate) effect: String,
    pub(crate) state: &'static str,
    pub(crate) attempt_count: i64,
    pub(crate) next_attempt_ms: Option<TimestampMillis>,
    pub(crate) failure_reason: Option<&'a str>,
}

impl<'a> UpdatableRecord<'a> {
    pub(crate) fn try_bind(record: &'a MutationRecord) -> anyhow::Result<Self> {
        let MutationRecord {
            effect,
            state,
            attempt_count,
            updated_at,
            next_attempt_at,
            failure_reason,
            ..
        } = record;
        Ok(Self {
            row_updated_ms: updated_at.unix_timestamp_millis(),
            effect: encode_tune_ids(effect)?,
            state: (*state).into(),
            attempt_count: (*attempt_count).into(),
            next_attempt_ms: next_attempt_at.map(|at| at.unix_timestamp_millis()),
            failure_reason: failure_reason.as_deref(),
        })
    }
}
