// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tunequeue_core::{IdempotencyKey, MutationRecord, MutationState, UserId};
use tunequeue_repo::mutation::{RecordHeader, RecordRepo, check_record_update};

use crate::{
    db::mutation_record::{models::*, schema::*},
    prelude::*,
};

impl RecordRepo for crate::Connection<'_> {
    fn insert_mutation_record(&mut self, record: &MutationRecord) -> RepoResult<RecordHeader> {
        let insertable = InsertableRecord::try_bind(record)?;
        let rows_affected = diesel::insert_into(mutation_record::table)
            .values(&insertable)
            .execute(self.as_mut())
            .map_err(repo_error)?;
        debug_assert_eq!(1, rows_affected);
        self.load_mutation_record(&record.key)
            .map(|(header, _)| header)
    }

    fn load_mutation_record(
        &mut self,
        key: &IdempotencyKey,
    ) -> RepoResult<(RecordHeader, MutationRecord)> {
        mutation_record::table
            .filter(mutation_record::idempotency_key.eq(key.to_string()))
            .first::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)
            .and_then(decode_record)
    }

    fn update_mutation_record(&mut self, updated: &MutationRecord) -> RepoResult<()> {
        let (header, stored) = self.load_mutation_record(&updated.key)?;
        check_record_update(&stored, updated)?;
        let updatable = UpdatableRecord::try_bind(updated)?;
        let target = mutation_record::table.filter(mutation_record::row_id.eq(RowId::from(header.id)));
        let rows_affected = diesel::update(target)
            .set(&updatable)
            .execute(self.as_mut())
            .map_err(repo_error)?;
        debug_assert_eq!(1, rows_affected);
        Ok(())
    }

    fn delete_mutation_record(&mut self, key: &IdempotencyKey) -> RepoResult<()> {
        let rows_affected = diesel::delete(
            mutation_record::table.filter(mutation_record::idempotency_key.eq(key.to_string())),
        )
        .execute(self.as_mut())
        .map_err(repo_error)?;
        debug_assert!(rows_affected <= 1);
        if rows_affected < 1 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    fn load_mutation_records(
        &mut self,
        user_id: &UserId,
        states: &[MutationState],
        collector: &mut dyn ReservableRecordCollector<Header = RecordHeader, Record = MutationRecord>,
    ) -> RepoResult<()> {
        let states = states
            .iter()
            .copied()
            .map(<&'static str>::from)
            .collect::<Vec<_>>();
        let records = mutation_record::table
            .filter(mutation_record::user_id.eq(user_id.as_str()))
            .filter(mutation_record::state.eq_any(states))
            .order_by(mutation_record::row_id)
            .load::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)?;
        let decoded = decode_records(records);
        collector.reserve(decoded.len());
        for (header, record) in decoded {
            collector.collect(header, record);
        }
        Ok(())
    }

    fn reset_in_flight_mutation_records(
        &mut self,
        user_id: &UserId,
        updated_at: UtcDateTimeMs,
    ) -> RepoResult<usize> {
        let target = mutation_record::table
            .filter(mutation_record::user_id.eq(user_id.as_str()))
            .filter(mutation_record::state.eq(<&'static str>::from(MutationState::InFlight)));
        diesel::update(target)
            .set((
                mutation_record::state.eq(<&'static str>::from(MutationState::Pending)),
                mutation_record::row_updated_ms.eq(updated_at.unix_timestamp_millis()),
                mutation_record::next_attempt_ms.eq(None::<TimestampMillis>),
            ))
            .execute(self.as_mut())
            .map_err(repo_error)
    }
}
