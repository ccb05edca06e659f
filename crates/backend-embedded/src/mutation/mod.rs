// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::collections::BTreeSet;

use tunequeue_core::{IdempotencyKey, MutationKind, MutationRecord, util::clock::UtcDateTimeMs};
use tunequeue_usecases_sqlite::mutation as uc;

use crate::prelude::*;

pub use tunequeue_usecases_sqlite::mutation::{Appended, Settled};

pub async fn append(
    db_gatekeeper: &Gatekeeper,
    user_id: UserId,
    kind: MutationKind,
    targets: BTreeSet<TuneId>,
) -> Result<Committed<Appended>> {
    db_gatekeeper
        .spawn_blocking_write_task(move |mut pooled_connection, _abort_flag| {
            let connection = &mut *pooled_connection;
            uc::append(connection, &user_id, kind, targets, UtcDateTimeMs::now())
        })
        .await
        .map_err(Into::into)
        .unwrap_or_else(Err)
}

pub async fn mark_in_flight(
    db_gatekeeper: &Gatekeeper,
    key: IdempotencyKey,
) -> Result<MutationRecord> {
    db_gatekeeper
        .spawn_blocking_write_task(move |mut pooled_connection, _abort_flag| {
            let connection = &mut *pooled_connection;
            uc::mark_in_flight(connection, &key, UtcDateTimeMs::now())
        })
        .await
        .map_err(Into::into)
        .unwrap_or_else(Err)
}

pub async fn reschedule(
    db_gatekeeper: &Gatekeeper,
    key: IdempotencyKey,
    next_attempt_at: UtcDateTimeMs,
    reason: String,
) -> Result<MutationRecord> {
    db_gatekeeper
        .spawn_blocking_write_task(move |mut pooled_connection, _abort_flag| {
            let connection = &mut *pooled_connection;
            uc::reschedule(
                connection,
                &key,
                next_attempt_at,
                reason,
                UtcDateTimeMs::now(),
            )
        })
        .await
        .map_err(Into::into)
        .unwrap_or_else(Err)
}

pub async fn mark_acknowledged(
    db_gatekeeper: &Gatekeeper,
    key: IdempotencyKey,
) -> Result<Committed<Settled>> {
    db_gatekeeper
        .spawn_blocking_write_task(move |mut pooled_connection, _abort_flag| {
            let connection = &mut *pooled_connection;
            uc::mark_acknowledged(connection, &key, UtcDateTimeMs::now())
        })
        .await
        .map_err(Into::into)
        .unwrap_or_else(Err)
}

pub async fn mark_failed(
    db_gatekeeper: &Gatekeeper,
    key: IdempotencyKey,
    reason: String,
) -> Result<Committed<Settled>> {
    db_gatekeeper
        .spawn_blocking_write_task(move |mut pooled_connection, _abort_flag| {
            let connection = &mut *pooled_connection;
            uc::mark_failed(connection, &key, reason, UtcDateTimeMs::now())
        })
        .await
        .map_err(Into::into)
        .unwrap_or_else(Err)
}

pub async fn load_pending_records(
    db_gatekeeper: &Gatekeeper,
    user_id: UserId,
) -> Result<Vec<MutationRecord>> {
    db_gatekeeper
        .spawn_blocking_read_task(move |mut pooled_connection, _abort_flag| {
            let connection = &mut *pooled_connection;
            uc::load_pending_records(connection, &user_id)
        })
        .await
        .map_err(Into::into)
        .unwrap_or_else(Err)
}

pub async fn load_unsettled_records(
    db_gatekeeper: &Gatekeeper,
    user_id: UserId,
) -> Result<Vec<MutationRecord>> {
    db_gatekeeper
        .spawn_blocking_read_task(move |mut pooled_connection, _abort_flag| {
            let connection = &mut *pooled_connection;
            uc::load_unsettled_records(connection, &user_id)
        })
        .await
        .map_err(Into::into)
        .unwrap_or_else(Err)
}

pub async fn load_failed_records(
    db_gatekeeper: &Gatekeeper,
    user_id: UserId,
) -> Result<Vec<MutationRecord>> {
    db_gatekeeper
        .spawn_blocking_read_task(move |mut pooled_connection, _abort_flag| {
            let connection = &mut *pooled_connection;
            uc::load_failed_records(connection, &user_id)
        })
        .await
        .map_err(Into::into)
        .unwrap_or_else(Err)
}

pub async fn reset_in_flight(db_gatekeeper: &Gatekeeper, user_id: UserId) -> Result<usize> {
    db_gatekeeper
        .spawn_blocking_write_task(move |mut pooled_connection, _abort_flag| {
            let connection = &mut *pooled_connection;
            uc::reset_in_flight(connection, &user_id, UtcDateTimeMs::now())
        })
        .await
        .map_err(Into::into)
        .unwrap_or_else(Err)
}

pub async fn retry_failed(
    db_gatekeeper: &Gatekeeper,
    user_id: UserId,
    key: IdempotencyKey,
) -> Result<Committed<Appended>> {
    db_gatekeeper
        .spawn_blocking_write_task(move |mut pooled_connection, _abort_flag| {
            let connection = &mut *pooled_connection;
            uc::retry_failed(connection, &user_id, &key, UtcDateTimeMs::now())
        })
        .await
        .map_err(Into::into)
        .unwrap_or_else(Err)
}

pub async fn dismiss_failed(
    db_gatekeeper: &Gatekeeper,
    user_id: UserId,
    key: IdempotencyKey,
) -> Result<MutationRecord> {
    db_gatekeeper
        .spawn_blocking_write_task(move |mut pooled_connection, _abort_flag| {
            let connection = &mut *pooled_connection;
            uc::dismiss_failed(connection, &user_id, &key)
        })
        .await
        .map_err(Into::into)
        .unwrap_or_else(Err)
}
