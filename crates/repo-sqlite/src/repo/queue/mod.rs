// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tunequeue_core::{PracticeQueueEntry, TuneId, UserId};
use tunequeue_repo::{queue::EntryRepo, repertoire::EntryRepo as _};

use crate::{
    db::practice_queue_entry::{models::*, schema::*},
    prelude::*,
};

impl crate::Connection<'_> {
    fn check_repertoire_contains(&mut self, entry: &PracticeQueueEntry) -> RepoResult<()> {
        let PracticeQueueEntry {
            user_id, tune_id, ..
        } = entry;
        if self.contains_repertoire_entry(user_id, *tune_id)? {
            return Ok(());
        }
        Err(RepoError::InvariantViolation(format!(
            "tune {tune_id} is not in the repertoire of user {user_id}"
        )))
    }
}

impl EntryRepo for crate::Connection<'_> {
    fn load_practice_queue_entry(
        &mut self,
        user_id: &UserId,
        tune_id: TuneId,
    ) -> RepoResult<PracticeQueueEntry> {
        practice_queue_entry::table
            .filter(practice_queue_entry::user_id.eq(user_id.as_str()))
            .filter(practice_queue_entry::tune_id.eq(tune_id.to_inner()))
            .first::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)
            .and_then(decode_record)
    }

    fn load_practice_queue_entries(
        &mut self,
        user_id: &UserId,
    ) -> RepoResult<Vec<PracticeQueueEntry>> {
        let records = practice_queue_entry::table
            .filter(practice_queue_entry::user_id.eq(user_id.as_str()))
            .order_by(practice_queue_entry::tune_id)
            .load::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)?;
        Ok(decode_records(records))
    }

    fn load_practice_queue_entries_after(
        &mut self,
        after: Option<(&UserId, TuneId)>,
        limit: PaginationLimit,
    ) -> RepoResult<KeysetPage<PracticeQueueEntry, (UserId, TuneId)>> {
        let mut query = practice_queue_entry::table
            .order_by((practice_queue_entry::user_id, practice_queue_entry::tune_id))
            .limit(keyset_limit(limit))
            .into_boxed();
        if let Some((user_id, tune_id)) = after {
            query = query.filter(
                practice_queue_entry::user_id.gt(user_id.as_str()).or(
                    practice_queue_entry::user_id
                        .eq(user_id.as_str())
                        .and(practice_queue_entry::tune_id.gt(tune_id.to_inner())),
                ),
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

    fn insert_practice_queue_entry(&mut self, entry: &PracticeQueueEntry) -> RepoResult<bool> {
        self.check_repertoire_contains(entry)?;
        let record = InsertableRecord::bind(entry);
        let rows_affected = diesel::insert_or_ignore_into(practice_queue_entry::table)
            .values(&record)
            .execute(self.as_mut())
            .map_err(repo_error)?;
        debug_assert!(rows_affected <= 1);
        if rows_affected < 1 {
            return Ok(false);
        }
        self.record_changes(ChangeSet::PRACTICE_QUEUE_ENTRY);
        Ok(true)
    }

    fn upsert_practice_queue_entry(&mut self, entry: &PracticeQueueEntry) -> RepoResult<()> {
        self.check_repertoire_contains(entry)?;
        let record = InsertableRecord::bind(entry);
        let rows_affected = diesel::insert_into(practice_queue_entry::table)
            .values(&record)
            .on_conflict((practice_queue_entry::user_id, practice_queue_entry::tune_id))
            .do_update()
            .set(&record)
            .execute(self.as_mut())
            .map_err(repo_error)?;
        debug_assert_eq!(1, rows_affected);
        self.record_changes(ChangeSet::PRACTICE_QUEUE_ENTRY);
        Ok(())
    }

    fn delete_practice_queue_entry(
        &mut self,
        user_id: &UserId,
        tune_id: TuneId,
    ) -> RepoResult<bool> {
        let rows_affected = diesel::delete(
            practice_queue_entry::table
                .filter(practice_queue_entry::user_id.eq(user_id.as_str()))
                .filter(practice_queue_entry::tune_id.eq(tune_id.to_inner())),
        )
        .execute(self.as_mut())
        .map_err(repo_error)?;
        debug_assert!(rows_affected <= 1);
        if rows_affected < 1 {
            return Ok(false);
        }
        self.record_changes(ChangeSet::PRACTICE_QUEUE_ENTRY);
        Ok(true)
    }
}

#[cfg(test)]
mod tests;
