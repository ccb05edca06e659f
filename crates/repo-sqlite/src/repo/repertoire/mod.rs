// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tunequeue_core::{RepertoireEntry, TuneId, UserId};
use tunequeue_repo::{queue::EntryRepo as _, repertoire::EntryRepo};

use crate::{
    db::{
        practice_queue_entry::schema::*,
        repertoire_entry::{models::*, schema::*},
    },
    prelude::*,
};

impl EntryRepo for crate::Connection<'_> {
    fn load_repertoire_entry(
        &mut self,
        user_id: &UserId,
        tune_id: TuneId,
    ) -> RepoResult<RepertoireEntry> {
        repertoire_entry::table
            .filter(repertoire_entry::user_id.eq(user_id.as_str()))
            .filter(repertoire_entry::tune_id.eq(tune_id.to_inner()))
            .first::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)
            .and_then(decode_record)
    }

    fn load_repertoire_entries(&mut self, user_id: &UserId) -> RepoResult<Vec<RepertoireEntry>> {
        let records = repertoire_entry::table
            .filter(repertoire_entry::user_id.eq(user_id.as_str()))
            .order_by(repertoire_entry::tune_id)
            .load::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)?;
        Ok(decode_records(records))
    }

    fn load_repertoire_entries_after(
        &mut self,
        after: Option<(&UserId, TuneId)>,
        limit: PaginationLimit,
    ) -> RepoResult<KeysetPage<RepertoireEntry, (UserId, TuneId)>> {
        let mut query = repertoire_entry::table
            .order_by((repertoire_entry::user_id, repertoire_entry::tune_id))
            .limit(keyset_limit(limit))
            .into_boxed();
        if let Some((user_id, tune_id)) = after {
            query = query.filter(
                repertoire_entry::user_id.gt(user_id.as_str()).or(repertoire_entry::user_id
                    .eq(user_id.as_str())
                    .and(repertoire_entry::tune_id.gt(tune_id.to_inner()))),
            );
        }
        let records = query
            .load::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)?;
        let last_key = records.last().map(|record| {
            (
                UserId::new(record.user_id.clone()),
                TuneId::new(record.tune_id),
            )
        });
        Ok(KeysetPage {
            records: decode_records(records),
            last_key,
        })
    }

    fn insert_repertoire_entry(&mut self, entry: &RepertoireEntry) -> RepoResult<bool> {
        let record = InsertableRecord::bind(entry);
        let rows_affected = diesel::insert_or_ignore_into(repertoire_entry::table)
            .values(&record)
            .execute(self.as_mut())
            .map_err(repo_error)?;
        debug_assert!(rows_affected <= 1);
        if rows_affected < 1 {
            return Ok(false);
        }
        self.record_changes(ChangeSet::REPERTOIRE_ENTRY);
        Ok(true)
    }

    fn upsert_repertoire_entry(&mut self, entry: &RepertoireEntry) -> RepoResult<()> {
        let record = InsertableRecord::bind(entry);
        let rows_affected = diesel::insert_into(repertoire_entry::table)
            .values(&record)
            .on_conflict((repertoire_entry::user_id, repertoire_entry::tune_id))
            .do_update()
            .set(&record)
            .execute(self.as_mut())
            .map_err(repo_error)?;
        debug_assert_eq!(1, rows_affected);
        self.record_changes(ChangeSet::REPERTOIRE_ENTRY);
        Ok(())
    }

    fn delete_repertoire_entry(&mut self, user_id: &UserId, tune_id: TuneId) -> RepoResult<bool> {
        if self.contains_practice_queue_entry(user_id, tune_id)? {
            return Err(RepoError::InvariantViolation(format!(
                "tune {tune_id} of user {user_id} is scheduled for review"
            )));
        }
        self.purge_repertoire_entry(user_id, tune_id)
    }

    fn purge_repertoire_entry(&mut self, user_id: &UserId, tune_id: TuneId) -> RepoResult<bool> {
        let queued = self.contains_practice_queue_entry(user_id, tune_id)?;
        let rows_affected = diesel::delete(
            repertoire_entry::table
                .filter(repertoire_entry::user_id.eq(user_id.as_str()))
                .filter(repertoire_entry::tune_id.eq(tune_id.to_inner())),
        )
        .execute(self.as_mut())
        .map_err(repo_error)?;
        debug_assert!(rows_affected <= 1);
        if rows_affected < 1 {
            return Ok(false);
        }
        // The queue entry is deleted by the database
        let mut changes = ChangeSet::REPERTOIRE_ENTRY;
        if queued {
            changes |= ChangeSet::PRACTICE_QUEUE_ENTRY;
        }
        self.record_changes(changes);
        Ok(true)
    }

    fn purge_repertoire_entries_of_tune(&mut self, tune_id: TuneId) -> RepoResult<usize> {
        let queued_count = diesel::delete(
            practice_queue_entry::table
                .filter(practice_queue_entry::tune_id.eq(tune_id.to_inner())),
        )
        .execute(self.as_mut())
        .map_err(repo_error)?;
        let rows_affected = diesel::delete(
            repertoire_entry::table.filter(repertoire_entry::tune_id.eq(tune_id.to_inner())),
        )
        .execute(self.as_mut())
        .map_err(repo_error)?;
        debug_assert!(queued_count <= rows_affected);
        let mut changes = ChangeSet::empty();
        if queued_count > 0 {
            changes |= ChangeSet::PRACTICE_QUEUE_ENTRY;
        }
        if rows_affected > 0 {
            changes |= ChangeSet::REPERTOIRE_ENTRY;
        }
        self.record_changes(changes);
        Ok(rows_affected)
    }
}
