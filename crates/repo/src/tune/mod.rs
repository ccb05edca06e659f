// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tunequeue_core::{GenreId, Tune, TuneId};

use crate::prelude::*;

/// Criteria for selecting tunes from the catalog.
///
/// All given criteria must match. An empty filter matches all tunes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub genre_id: Option<GenreId>,

    pub tune_type: Option<String>,

    /// Case-insensitive substring of the title
    pub title_contains: Option<String>,
}

impl CatalogFilter {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        let Self {
            genre_id,
            tune_type,
            title_contains,
        } = self;
        genre_id.is_none() && tune_type.is_none() && title_contains.is_none()
    }
}

pub trait EntityRepo {
    /// Returns `true` if the tune has been created or modified.
    fn upsert_tune(&mut self, tune: &Tune) -> RepoResult<bool>;

    fn load_tune(&mut self, id: TuneId) -> RepoResult<Tune>;

    fn tune_exists(&mut self, id: TuneId) -> RepoResult<bool>;

    /// Delete a tune from the catalog.
    ///
    /// Entries of users that refer to the tune are not affected.
    fn delete_tune(&mut self, id: TuneId) -> RepoResult<()>;

    /// Load tunes from the catalog, ordered by title and id.
    fn load_tunes(
        &mut self,
        filter: &CatalogFilter,
        pagination: Option<&Pagination>,
    ) -> RepoResult<Vec<Tune>>;

    /// Load the next page of tunes, ordered by id and starting
    /// after the given id.
    fn load_tunes_after(
        &mut self,
        after: Option<TuneId>,
        limit: PaginationLimit,
    ) -> RepoResult<KeysetPage<Tune, TuneId>>;
}
