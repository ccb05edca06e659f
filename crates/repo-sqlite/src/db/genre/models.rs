// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use semval::prelude::*;
use tunequeue_core::{Genre, GenreId};

use super::schema::*;
use crate::prelude::*;

#[derive(Debug, Clone, Queryable)]
pub(crate) struct QueryableRecord {
    pub(crate) genre_id: String,
    pub(crate) name: String,
}

impl StoredRecord for QueryableRecord {
    type Decoded = Genre;

    const TABLE_NAME: &'static str = "genre";

    fn row_key(&self) -> String {
        self.genre_id.clone()
    }

    fn decode(self) -> anyhow::Result<Genre> {
        let Self { genre_id, name } = self;
        let genre = Genre {
            id: GenreId::new(genre_id),
            name,
        };
        if let Err(err) = genre.validate() {
            anyhow::bail!("invalid genre: {err:?}");
        }
        Ok(genre)
    }
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = genre, primary_key(genre_id))]
pub(crate) struct InsertableRecord<'a> {
    pub(crate) genre_id: &'a str,
    pub(crate) name: &'a str,
}

impl<'a> InsertableRecord<'a> {
    pub(crate) fn bind(genre: &'a Genre) -> Self {
        let Genre { id, name } = genre;
        Self {
            genre_id: id.as_str(),
            name,
        }
    }
}
