// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tunequeue_core::{DeltaBatch, util::clock::UtcDateTimeMs};
use tunequeue_usecases_sqlite::sync as uc;

use crate::prelude::*;

pub use tunequeue_usecases_sqlite::sync::Outcome;

pub async fn apply_delta_batch(
    db_gatekeeper: &Gatekeeper,
    user_id: UserId,
    batch: DeltaBatch,
) -> Result<Committed<Outcome>> {
    db_gatekeeper
        .spawn_blocking_write_task(move |mut pooled_connection, _abort_flag| {
            let connection = &mut *pooled_connection;
            uc::apply_delta_batch(connection, &user_id, &batch, UtcDateTimeMs::now())
        })
        .await
        .map_err(Into::into)
        .unwrap_or_else(Err)
}

pub async fn load_cursor(db_gatekeeper: &Gatekeeper, user_id: UserId) -> Result<Option<String>> {
    db_gatekeeper
        .spawn_blocking_read_task(move |mut pooled_connection, _abort_flag| {
            let connection = &mut *pooled_connection;
            uc::load_cursor(connection, &user_id)
        })
        .await
        .map_err(Into::into)
        .unwrap_or_else(Err)
}
