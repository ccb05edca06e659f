// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tunequeue_core::{Delta, RevisionId, SyncCursor, UserId};
use tunequeue_repo::sync::{DeferredDelta, DeferredDeltaId, SyncRepo};

use crate::{
    db::{
        applied_revision::{models::InsertableRecord as InsertableAppliedRevision, schema::*},
        deferred_delta::{
            models::{
                InsertableRecord as InsertableDeferredDelta,
                QueryableRecord as QueryableDeferredDelta,
            },
            schema::*,
        },
        sync_cursor::{
            models::{
                InsertableRecord as InsertableSyncCursor, QueryableRecord as QueryableSyncCursor,
            },
            schema::*,
        },
    },
    prelude::*,
};

impl SyncRepo for crate::Connection<'_> {
    fn load_sync_cursor(&mut self, user_id: &UserId) -> RepoResult<SyncCursor> {
        sync_cursor::table
            .filter(sync_cursor::user_id.eq(user_id.as_str()))
            .first::<QueryableSyncCursor>(self.as_mut())
            .map_err(repo_error)
            .map(Into::into)
    }

    fn store_sync_cursor(&mut self, cursor: &SyncCursor) -> RepoResult<()> {
        let record = InsertableSyncCursor::bind(cursor);
        let rows_affected = diesel::insert_into(sync_cursor::table)
            .values(&record)
            .on_conflict(sync_cursor::user_id)
            .do_update()
            .set(&record)
            .execute(self.as_mut())
            .map_err(repo_error)?;
        debug_assert_eq!(1, rows_affected);
        Ok(())
    }

    fn is_revision_applied(
        &mut self,
        user_id: &UserId,
        revision_id: &RevisionId,
    ) -> RepoResult<bool> {
        diesel::select(diesel::dsl::exists(
            applied_revision::table
                .filter(applied_revision::user_id.eq(user_id.as_str()))
                .filter(applied_revision::revision_id.eq(revision_id.as_str())),
        ))
        .get_result(self.as_mut())
        .map_err(repo_error)
    }

    fn mark_revision_applied(
        &mut self,
        user_id: &UserId,
        revision_id: &RevisionId,
        applied_at: UtcDateTimeMs,
    ) -> RepoResult<()> {
        let record = InsertableAppliedRevision {
            user_id: user_id.as_str(),
            revision_id: revision_id.as_str(),
            applied_ms: applied_at.unix_timestamp_millis(),
        };
        diesel::insert_or_ignore_into(applied_revision::table)
            .values(&record)
            .execute(self.as_mut())
            .map_err(repo_error)?;
        Ok(())
    }

    fn insert_deferred_delta(
        &mut self,
        user_id: &UserId,
        delta: &Delta,
        deferred_at: UtcDateTimeMs,
    ) -> RepoResult<DeferredDeltaId> {
        let record = InsertableDeferredDelta::try_bind(user_id, delta, deferred_at)?;
        diesel::insert_into(deferred_delta::table)
            .values(&record)
            .returning(deferred_delta::row_id)
            .get_result::<RowId>(self.as_mut())
            .map_err(repo_error)
            .map(Into::into)
    }

    fn load_deferred_deltas(&mut self, user_id: &UserId) -> RepoResult<Vec<DeferredDelta>> {
        let records = deferred_delta::table
            .filter(deferred_delta::user_id.eq(user_id.as_str()))
            .order_by(deferred_delta::row_id)
            .load::<QueryableDeferredDelta>(self.as_mut())
            .map_err(repo_error)?;
        Ok(decode_records(records))
    }

    fn delete_deferred_delta(&mut self, id: DeferredDeltaId) -> RepoResult<()> {
        let rows_affected =
            diesel::delete(deferred_delta::table.filter(deferred_delta::row_id.eq(RowId::from(id))))
                .execute(self.as_mut())
                .map_err(repo_error)?;
        debug_assert!(rows_affected <= 1);
        if rows_affected < 1 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    fn reset_sync_state(&mut self, user_id: &UserId) -> RepoResult<()> {
        diesel::delete(sync_cursor::table.filter(sync_cursor::user_id.eq(user_id.as_str())))
            .execute(self.as_mut())
            .map_err(repo_error)?;
        diesel::delete(
            applied_revision::table.filter(applied_revision::user_id.eq(user_id.as_str())),
        )
        .execute(self.as_mut())
        .map_err(repo_error)?;
        let deferred_count = diesel::delete(
            deferred_delta::table.filter(deferred_delta::user_id.eq(user_id.as_str())),
        )
        .execute(self.as_mut())
        .map_err(repo_error)?;
        if deferred_count > 0 {
            log::info!("Discarded {deferred_count} deferred delta(s) of user {user_id}");
        }
        Ok(())
    }
}
