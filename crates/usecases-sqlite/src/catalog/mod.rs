// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tunequeue_core::{RepertoireEntry, Tune, UserId};
use tunequeue_repo::tune::CatalogFilter;

use super::*;

pub fn load_catalog(
    connection: &mut DbConnection,
    filter: &CatalogFilter,
    pagination: Option<&Pagination>,
) -> Result<Vec<Tune>> {
    read_transaction(connection, |repo| {
        uc::catalog::load_catalog(repo, filter, pagination)
    })
}

pub fn load_repertoire(
    connection: &mut DbConnection,
    user_id: &UserId,
) -> Result<Vec<RepertoireEntry>> {
    read_transaction(connection, |repo| uc::catalog::load_repertoire(repo, user_id))
}
