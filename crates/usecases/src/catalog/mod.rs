// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tunequeue_core::{RepertoireEntry, Tune, UserId};
use tunequeue_repo::{
    repertoire::EntryRepo as RepertoireRepo,
    tune::{CatalogFilter, EntityRepo as TuneRepo},
};

use super::*;

pub fn load_catalog<Repo>(
    repo: &mut Repo,
    filter: &CatalogFilter,
    pagination: Option<&Pagination>,
) -> RepoResult<Vec<Tune>>
where
    Repo: TuneRepo,
{
    repo.load_tunes(filter, pagination)
}

pub fn load_repertoire<Repo>(repo: &mut Repo, user_id: &UserId) -> RepoResult<Vec<RepertoireEntry>>
where
    Repo: RepertoireRepo,
{
    repo.load_repertoire_entries(user_id)
}
