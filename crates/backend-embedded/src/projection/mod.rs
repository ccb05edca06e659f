// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tunequeue_core::{PracticeQueue, util::clock::UtcDateTimeMs};
use tunequeue_usecases_sqlite::projection as uc;

use crate::prelude::*;

pub use tunequeue_usecases_sqlite::projection::{GenreFacets, GenreFacetsState};

pub async fn compute_queue(
    db_gatekeeper: &Gatekeeper,
    user_id: UserId,
    as_of: UtcDateTimeMs,
) -> Result<PracticeQueue> {
    db_gatekeeper
        .spawn_blocking_read_task(move |mut pooled_connection, _abort_flag| {
            let connection = &mut *pooled_connection;
            uc::compute_queue(connection, &user_id, as_of)
        })
        .await
        .map_err(Into::into)
        .unwrap_or_else(Err)
}

pub async fn available_genres(db_gatekeeper: &Gatekeeper, user_id: UserId) -> Result<GenreFacets> {
    db_gatekeeper
        .spawn_blocking_read_task(move |mut pooled_connection, _abort_flag| {
            let connection = &mut *pooled_connection;
            uc::available_genres(connection, &user_id)
        })
        .await
        .map_err(Into::into)
        .unwrap_or_else(Err)
}
