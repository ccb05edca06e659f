// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tunequeue_repo::quarantine::{QuarantineRepo, QuarantinedRecord};

use crate::{
    db::{
        deferred_delta::{models::QueryableRecord as QueryableDeferredDelta, schema::*},
        genre::{models::QueryableRecord as QueryableGenre, schema::*},
        mutation_record::{models::QueryableRecord as QueryableMutationRecord, schema::*},
        practice_queue_entry::{
            models::QueryableRecord as QueryablePracticeQueueEntry, schema::*,
        },
        quarantine::{
            models::{InsertableRecord, QueryableRecord},
            schema::*,
        },
        repertoire_entry::{models::QueryableRecord as QueryableRepertoireEntry, schema::*},
        tune::{models::QueryableRecord as QueryableTune, schema::*},
    },
    prelude::*,
};

impl crate::Connection<'_> {
    fn insert_quarantined_record<R: StoredRecord>(
        &mut self,
        corrupt: &CorruptRecord<R>,
        quarantined_at: UtcDateTimeMs,
    ) -> RepoResult<()> {
        let CorruptRecord { record, reason } = corrupt;
        let quarantined = QuarantinedRecord {
            table: R::TABLE_NAME.to_owned(),
            key: record.row_key(),
            reason: format!("{reason:#}"),
            content: Some(format!("{record:?}")),
            quarantined_at,
        };
        log::warn!(
            "Quarantining {table} record {key}: {reason}",
            table = quarantined.table,
            key = quarantined.key,
            reason = quarantined.reason,
        );
        let insertable = InsertableRecord::bind(&quarantined);
        diesel::insert_into(quarantine::table)
            .values(&insertable)
            .on_conflict((quarantine::table_name, quarantine::row_key))
            .do_update()
            .set((
                quarantine::reason.eq(insertable.reason),
                quarantine::content.eq(insertable.content),
                quarantine::quarantined_ms.eq(insertable.quarantined_ms),
            ))
            .execute(self.as_mut())
            .map_err(repo_error)?;
        Ok(())
    }

    fn quarantine_corrupt_tunes(&mut self, quarantined_at: UtcDateTimeMs) -> RepoResult<usize> {
        let records = tune::table
            .load::<QueryableTune>(self.as_mut())
            .map_err(repo_error)?;
        let corrupt_records = find_corrupt_records(records);
        for corrupt in &corrupt_records {
            self.insert_quarantined_record(corrupt, quarantined_at)?;
            diesel::delete(tune::table.filter(tune::tune_id.eq(corrupt.record.tune_id)))
                .execute(self.as_mut())
                .map_err(repo_error)?;
            self.record_changes(ChangeSet::TUNE);
        }
        Ok(corrupt_records.len())
    }

    fn quarantine_corrupt_genres(&mut self, quarantined_at: UtcDateTimeMs) -> RepoResult<usize> {
        let records = genre::table
            .load::<QueryableGenre>(self.as_mut())
            .map_err(repo_error)?;
        let corrupt_records = find_corrupt_records(records);
        for corrupt in &corrupt_records {
            self.insert_quarantined_record(corrupt, quarantined_at)?;
            diesel::delete(genre::table.filter(genre::genre_id.eq(&corrupt.record.genre_id)))
                .execute(self.as_mut())
                .map_err(repo_error)?;
            self.record_changes(ChangeSet::GENRE);
        }
        Ok(corrupt_records.len())
    }

    fn quarantine_corrupt_repertoire_entries(
        &mut self,
        quarantined_at: UtcDateTimeMs,
    ) -> RepoResult<usize> {
        let records = repertoire_entry::table
            .load::<QueryableRepertoireEntry>(self.as_mut())
            .map_err(repo_error)?;
        let corrupt_records = find_corrupt_records(records);
        for corrupt in &corrupt_records {
            self.insert_quarantined_record(corrupt, quarantined_at)?;
            diesel::delete(
                repertoire_entry::table
                    .filter(repertoire_entry::user_id.eq(&corrupt.record.user_id))
                    .filter(repertoire_entry::tune_id.eq(corrupt.record.tune_id)),
            )
            .execute(self.as_mut())
            .map_err(repo_error)?;
            // Might cascade to the practice queue
            self.record_changes(ChangeSet::QUEUE_MEMBERSHIP);
        }
        Ok(corrupt_records.len())
    }

    fn quarantine_corrupt_practice_queue_entries(
        &mut self,
        quarantined_at: UtcDateTimeMs,
    ) -> RepoResult<usize> {
        let records = practice_queue_entry::table
            .load::<QueryablePracticeQueueEntry>(self.as_mut())
            .map_err(repo_error)?;
        let corrupt_records = find_corrupt_records(records);
        for corrupt in &corrupt_records {
            self.insert_quarantined_record(corrupt, quarantined_at)?;
            diesel::delete(
                practice_queue_entry::table
                    .filter(practice_queue_entry::user_id.eq(&corrupt.record.user_id))
                    .filter(practice_queue_entry::tune_id.eq(corrupt.record.tune_id)),
            )
            .execute(self.as_mut())
            .map_err(repo_error)?;
            self.record_changes(ChangeSet::PRACTICE_QUEUE_ENTRY);
        }
        Ok(corrupt_records.len())
    }

    fn quarantine_corrupt_mutation_records(
        &mut self,
        quarantined_at: UtcDateTimeMs,
    ) -> RepoResult<usize> {
        let records = mutation_record::table
            .load::<QueryableMutationRecord>(self.as_mut())
            .map_err(repo_error)?;
        let corrupt_records = find_corrupt_records(records);
        for corrupt in &corrupt_records {
            self.insert_quarantined_record(corrupt, quarantined_at)?;
            diesel::delete(
                mutation_record::table.filter(mutation_record::row_id.eq(corrupt.record.row_id)),
            )
            .execute(self.as_mut())
            .map_err(repo_error)?;
        }
        Ok(corrupt_records.len())
    }

    fn quarantine_corrupt_deferred_deltas(
        &mut self,
        quarantined_at: UtcDateTimeMs,
    ) -> RepoResult<usize> {
        let records = deferred_delta::table
            .load::<QueryableDeferredDelta>(self.as_mut())
            .map_err(repo_error)?;
        let corrupt_records = find_corrupt_records(records);
        for corrupt in &corrupt_records {
            self.insert_quarantined_record(corrupt, quarantined_at)?;
            diesel::delete(
                deferred_delta::table.filter(deferred_delta::row_id.eq(corrupt.record.row_id)),
            )
            .execute(self.as_mut())
            .map_err(repo_error)?;
        }
        Ok(corrupt_records.len())
    }
}

impl QuarantineRepo for crate::Connection<'_> {
    fn quarantine_corrupt_records(&mut self, quarantined_at: UtcDateTimeMs) -> RepoResult<usize> {
        // Queue entries before repertoire entries to avoid quarantining
        // rows that are deleted implicitly by cascading.
        let count = self.quarantine_corrupt_practice_queue_entries(quarantined_at)?
            + self.quarantine_corrupt_repertoire_entries(quarantined_at)?
            + self.quarantine_corrupt_tunes(quarantined_at)?
            + self.quarantine_corrupt_genres(quarantined_at)?
            + self.quarantine_corrupt_mutation_records(quarantined_at)?
            + self.quarantine_corrupt_deferred_deltas(quarantined_at)?;
        Ok(count)
    }

    fn load_quarantined_records(&mut self) -> RepoResult<Vec<QuarantinedRecord>> {
        quarantine::table
            .order_by(quarantine::row_id)
            .load::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)
            .map(|records| records.into_iter().map(Into::into).collect())
    }
}
