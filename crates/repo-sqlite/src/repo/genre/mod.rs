// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tunequeue_core::{Genre, GenreId};
use tunequeue_repo::genre::EntityRepo;

use crate::{
    db::{
        genre::{models::*, schema::*},
        tune::schema::*,
    },
    prelude::*,
};

impl EntityRepo for crate::Connection<'_> {
    fn upsert_genre(&mut self, genre: &Genre) -> RepoResult<bool> {
        match self.load_genre(&genre.id) {
            Ok(stored) if stored == *genre => return Ok(false),
            Ok(_) | Err(RepoError::NotFound | RepoError::CorruptRecord { .. }) => (),
            Err(err) => return Err(err),
        }
        let record = InsertableRecord::bind(genre);
        let rows_affected = diesel::insert_into(genre::table)
            .values(&record)
            .on_conflict(genre::genre_id)
            .do_update()
            .set(&record)
            .execute(self.as_mut())
            .map_err(repo_error)?;
        debug_assert_eq!(1, rows_affected);
        self.record_changes(ChangeSet::GENRE);
        Ok(true)
    }

    fn load_genre(&mut self, id: &GenreId) -> RepoResult<Genre> {
        genre::table
            .filter(genre::genre_id.eq(id.as_str()))
            .first::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)
            .and_then(decode_record)
    }

    fn delete_genre(&mut self, id: &GenreId) -> RepoResult<()> {
        let rows_affected = diesel::delete(genre::table.filter(genre::genre_id.eq(id.as_str())))
            .execute(self.as_mut())
            .map_err(repo_error)?;
        debug_assert!(rows_affected <= 1);
        if rows_affected < 1 {
            return Err(RepoError::NotFound);
        }
        self.record_changes(ChangeSet::GENRE);
        Ok(())
    }

    fn load_genres_after(
        &mut self,
        after: Option<&GenreId>,
        limit: PaginationLimit,
    ) -> RepoResult<KeysetPage<Genre, GenreId>> {
        let mut query = genre::table
            .order_by(genre::genre_id)
            .limit(keyset_limit(limit))
            .into_boxed();
        if let Some(after) = after {
            query = query.filter(genre::genre_id.gt(after.as_str()));
        }
        let records = query
            .load::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)?;
        let last_key = records
            .last()
            .map(|record| GenreId::new(record.genre_id.clone()));
        Ok(KeysetPage {
            records: decode_records(records),
            last_key,
        })
    }

    fn load_referenced_genres(&mut self) -> RepoResult<Vec<Genre>> {
        let referenced_genre_ids = tune::table
            .select(tune::genre_id)
            .filter(tune::genre_id.is_not_null())
            .distinct();
        let records = genre::table
            .filter(genre::genre_id.nullable().eq_any(referenced_genre_ids))
            .order_by((genre::name, genre::genre_id))
            .load::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)?;
        Ok(decode_records(records))
    }
}
