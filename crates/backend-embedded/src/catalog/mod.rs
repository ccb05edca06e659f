// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tunequeue_core::{RepertoireEntry, Tune};
use tunequeue_repo::{prelude::Pagination, tune::CatalogFilter};
use tunequeue_usecases_sqlite::catalog as uc;

use crate::prelude::*;

pub async fn load_catalog(
    db_gatekeeper: &Gatekeeper,
    filter: CatalogFilter,
    pagination: Option<Pagination>,
) -> Result<Vec<Tune>> {
    db_gatekeeper
        .spawn_blocking_read_task(move |mut pooled_connection, _abort_flag| {
            let connection = &mut *pooled_connection;
            uc::load_catalog(connection, &filter, pagination.as_ref())
        })
        .await
        .map_err(Into::into)
        .unwrap_or_else(Err)
}

pub async fn load_repertoire(
    db_gatekeeper: &Gatekeeper,
    user_id: UserId,
) -> Result<Vec<RepertoireEntry>> {
    db_gatekeeper
        .spawn_blocking_read_task(move |mut pooled_connection, _abort_flag| {
            let connection = &mut *pooled_connection;
            uc::load_repertoire(connection, &user_id)
        })
        .await
        .map_err(Into::into)
        .unwrap_or_else(Err)
}
