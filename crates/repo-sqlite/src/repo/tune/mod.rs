// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tunequeue_core::{Tune, TuneId};
use tunequeue_repo::tune::{CatalogFilter, EntityRepo};

use crate::{
    db::tune::{models::*, schema::*},
    prelude::*,
};

impl EntityRepo for crate::Connection<'_> {
    fn upsert_tune(&mut self, tune: &Tune) -> RepoResult<bool> {
        match self.load_tune(tune.id) {
            Ok(stored) if stored == *tune => return Ok(false),
            Ok(_) | Err(RepoError::NotFound | RepoError::CorruptRecord { .. }) => (),
            Err(err) => return Err(err),
        }
        let record = InsertableRecord::bind(tune);
        let rows_affected = diesel::insert_into(tune::table)
            .values(&record)
            .on_conflict(tune::tune_id)
            .do_update()
            .set(&record)
            .execute(self.as_mut())
            .map_err(repo_error)?;
        debug_assert_eq!(1, rows_affected);
        self.record_changes(ChangeSet::TUNE);
        Ok(true)
    }

    fn load_tune(&mut self, id: TuneId) -> RepoResult<Tune> {
        tune::table
            .filter(tune::tune_id.eq(id.to_inner()))
            .first::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)
            .and_then(decode_record)
    }

    fn tune_exists(&mut self, id: TuneId) -> RepoResult<bool> {
        diesel::select(diesel::dsl::exists(
            tune::table.filter(tune::tune_id.eq(id.to_inner())),
        ))
        .get_result(self.as_mut())
        .map_err(repo_error)
    }

    fn delete_tune(&mut self, id: TuneId) -> RepoResult<()> {
        let rows_affected = diesel::delete(tune::table.filter(tune::tune_id.eq(id.to_inner())))
            .execute(self.as_mut())
            .map_err(repo_error)?;
        debug_assert!(rows_affected <= 1);
        if rows_affected < 1 {
            return Err(RepoError::NotFound);
        }
        self.record_changes(ChangeSet::TUNE);
        Ok(())
    }

    fn load_tunes(
        &mut self,
        filter: &CatalogFilter,
        pagination: Option<&Pagination>,
    ) -> RepoResult<Vec<Tune>> {
        let CatalogFilter {
            genre_id,
            tune_type,
            title_contains,
        } = filter;
        let mut query = tune::table
            .order_by((tune::title, tune::tune_id))
            .into_boxed();
        if let Some(genre_id) = genre_id {
            query = query.filter(tune::genre_id.eq(genre_id.as_str()));
        }
        if let Some(tune_type) = tune_type {
            query = query.filter(tune::tune_type.eq(tune_type.as_str()));
        }
        if let Some(title_contains) = title_contains {
            query = query.filter(
                tune::title
                    .like(escape_like_contains(title_contains))
                    .escape(LIKE_ESCAPE_CHARACTER),
            );
        }
        if let Some((limit, offset)) = pagination.and_then(pagination_limit_offset) {
            query = query.limit(limit).offset(offset);
        }
        let records = query
            .load::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)?;
        Ok(decode_records(records))
    }

    fn load_tunes_after(
        &mut self,
        after: Option<TuneId>,
        limit: PaginationLimit,
    ) -> RepoResult<KeysetPage<Tune, TuneId>> {
        let mut query = tune::table
            .order_by(tune::tune_id)
            .limit(keyset_limit(limit))
            .into_boxed();
        if let Some(after) = after {
            query = query.filter(tune::tune_id.gt(after.to_inner()));
        }
        let records = query
            .load::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)?;
        let last_key = records.last().map(|record| TuneId::new(record.tune_id));
        Ok(KeysetPage {
            records: decode_records(records),
            last_key,
        })
    }
}

#[cfg(test)]
mod tests;
