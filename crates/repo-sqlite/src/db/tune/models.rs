// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use semval::prelude::*;
use tunequeue_core::{GenreId, Tune, TuneId};

use super::schema::*;
use crate::prelude::*;

#[derive(Debug, Clone, Queryable)]
pub(crate) struct QueryableRecord {
    pub(crate) tune_id: i64,
    pub(crate) title: String,
    pub(crate) genre_id: Option<String>,
    pub(crate) tune_type: Option<String>,
    pub(crate) mode: Option<String>,
}

impl StoredRecord for QueryableRecord {
    type Decoded = Tune;

    const TABLE_NAME: &'static str = "tune";

    fn row_key(&self) -> String {
        self.tune_id.to_string()
    }

    fn decode(self) -> anyhow::Result<Tune> {
        let Self {
            tune_id,
            title,
            genre_id,
            tune_type,
            mode,
        } = self;
        let tune = Tune {
            id: TuneId::new(tune_id),
            title,
            genre_id: genre_id.map(GenreId::new),
            tune_type,
            mode,
        };
        if let Err(err) = tune.validate() {
            anyhow::bail!("invalid tune: {err:?}");
        }
        Ok(tune)
    }
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = tune, primary_key(tune_id), treat_none_as_null = true)]
pub(crate) struct InsertableRecord<'a> {
    pub(crate) tune_id: i64,
    pub(crate) title: &'a str,
    pub(crate) genre_id: Option<&'a str>,
    pub(crate) tune_type: Option<&'a str>,
    pub(crate) mode: Option<&'a str>,
}

impl<'a> InsertableRecord<'a> {
    pub(crate) fn bind(tune: &'a Tune) -> Self {
        let Tune {
            id,
            title,
            genre_id,
            tune_type,
            mode,
        } = tune;
        Self {
            tune_id: id.to_inner(),
            title,
            genre_id: genre_id.as_ref().map(GenreId::as_str),
            tune_type: tune_type.as_deref(),
            mode: mode.as_deref(),
        }
    }
}
