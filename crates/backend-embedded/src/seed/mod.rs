// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tunequeue_core::util::clock::UtcDateTimeMs;
use tunequeue_usecases_sqlite::seed as uc;

use crate::prelude::*;

pub use tunequeue_usecases_sqlite::seed::SeedData;

pub async fn reset_and_seed(
    db_gatekeeper: &Gatekeeper,
    user_id: UserId,
    seed: SeedData,
    mark_synced: bool,
) -> Result<Committed<()>> {
    db_gatekeeper
        .spawn_blocking_write_task(move |mut pooled_connection, abort_flag| {
            let connection = &mut *pooled_connection;
            uc::reset_and_seed(
                connection,
                &user_id,
                seed,
                mark_synced,
                UtcDateTimeMs::now(),
                &abort_flag,
            )
        })
        .await
        .map_err(Into::into)
        .unwrap_or_else(Err)
}

pub async fn clear(db_gatekeeper: &Gatekeeper, user_id: UserId) -> Result<Committed<usize>> {
    db_gatekeeper
        .spawn_blocking_write_task(move |mut pooled_connection, _abort_flag| {
            let connection = &mut *pooled_connection;
            uc::clear(connection, &user_id)
        })
        .await
        .map_err(Into::into)
        .unwrap_or_else(Err)
}
