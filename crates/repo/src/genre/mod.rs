// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tunequeue_core::{Genre, GenreId};

use crate::prelude::*;

pub trait EntityRepo {
    /// Returns `true` if the genre has been created or modified.
    fn upsert_genre(&mut self, genre: &Genre) -> RepoResult<bool>;

    fn load_genre(&mut self, id: &GenreId) -> RepoResult<Genre>;

    fn delete_genre(&mut self, id: &GenreId) -> RepoResult<()>;

    fn load_genres_after(
        &mut self,
        after: Option<&GenreId>,
        limit: PaginationLimit,
    ) -> RepoResult<KeysetPage<Genre, GenreId>>;

    /// Genres that are referenced by at least one tune of the catalog,
    /// ordered by name and id.
    fn load_referenced_genres(&mut self) -> RepoResult<Vec<Genre>>;
}
