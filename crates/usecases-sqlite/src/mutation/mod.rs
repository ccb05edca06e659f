// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::collections::BTreeSet;

use tunequeue_core::{
    IdempotencyKey, MutationKind, MutationRecord, TuneId, UserId, util::clock::UtcDateTimeMs,
};

use super::*;

mod uc {
    pub(super) use tunequeue_usecases::{
        mutation::*,
        sync::{Outcome, apply_deferred_deltas},
    };
}

pub use tunequeue_usecases::mutation::Appended;

/// A record that has been acknowledged or failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settled {
    pub record: MutationRecord,

    /// Remote changes that have been parked while the record was
    /// unsettled and are applied now.
    pub reapplied: uc::Outcome,
}

/// Validate and append a new record, applying its optimistic effect.
pub fn append(
    connection: &mut DbConnection,
    user_id: &UserId,
    kind: MutationKind,
    targets: BTreeSet<TuneId>,
    now: UtcDateTimeMs,
) -> Result<Committed<Appended>> {
    write_transaction(connection, |repo| {
        let targets = uc::validate_targets(repo, user_id, kind, targets)?;
        uc::append(repo, user_id.clone(), kind, targets, now)
    })
}

pub fn mark_in_flight(
    connection: &mut DbConnection,
    key: &IdempotencyKey,
    now: UtcDateTimeMs,
) -> Result<MutationRecord> {
    write_transaction(connection, |repo| uc::mark_in_flight(repo, key, now))
        .map(|committed| committed.outcome)
}

pub fn reschedule(
    connection: &mut DbConnection,
    key: &IdempotencyKey,
    next_attempt_at: UtcDateTimeMs,
    reason: String,
    now: UtcDateTimeMs,
) -> Result<MutationRecord> {
    write_transaction(connection, |repo| {
        uc::reschedule(repo, key, next_attempt_at, reason, now)
    })
    .map(|committed| committed.outcome)
}

/// Acknowledge a record and apply the remote changes that have
/// been parked because of it.
pub fn mark_acknowledged(
    connection: &mut DbConnection,
    key: &IdempotencyKey,
    now: UtcDateTimeMs,
) -> Result<Committed<Settled>> {
    write_transaction(connection, |repo| {
        let record = uc::mark_acknowledged(repo, key, now)?;
        let reapplied = uc::apply_deferred_deltas(repo, &record.user_id)?;
        Ok::<_, Error>(Settled { record, reapplied })
    })
}

/// Fail a record, roll back its optimistic effect, and apply the
/// remote changes that have been parked because of it.
pub fn mark_failed(
    connection: &mut DbConnection,
    key: &IdempotencyKey,
    reason: String,
    now: UtcDateTimeMs,
) -> Result<Committed<Settled>> {
    write_transaction(connection, |repo| {
        let record = uc::mark_failed(repo, key, reason, now)?;
        let reapplied = uc::apply_deferred_deltas(repo, &record.user_id)?;
        Ok::<_, Error>(Settled { record, reapplied })
    })
}

pub fn load_pending_records(
    connection: &mut DbConnection,
    user_id: &UserId,
) -> Result<Vec<MutationRecord>> {
    read_transaction(connection, |repo| uc::load_pending_records(repo, user_id))
}

pub fn load_unsettled_records(
    connection: &mut DbConnection,
    user_id: &UserId,
) -> Result<Vec<MutationRecord>> {
    read_transaction(connection, |repo| uc::load_unsettled_records(repo, user_id))
}

pub fn load_failed_records(
    connection: &mut DbConnection,
    user_id: &UserId,
) -> Result<Vec<MutationRecord>> {
    read_transaction(connection, |repo| uc::load_failed_records(repo, user_id))
}

pub fn reset_in_flight(
    connection: &mut DbConnection,
    user_id: &UserId,
    now: UtcDateTimeMs,
) -> Result<usize> {
    write_transaction(connection, |repo| uc::reset_in_flight(repo, user_id, now))
        .map(|committed| committed.outcome)
}

pub fn retry_failed(
    connection: &mut DbConnection,
    user_id: &UserId,
    key: &IdempotencyKey,
    now: UtcDateTimeMs,
) -> Result<Committed<Appended>> {
    write_transaction(connection, |repo| uc::retry_failed(repo, user_id, key, now))
}

pub fn dismiss_failed(
    connection: &mut DbConnection,
    user_id: &UserId,
    key: &IdempotencyKey,
) -> Result<MutationRecord> {
    write_transaction(connection, |repo| uc::dismiss_failed(repo, user_id, key))
        .map(|committed| committed.outcome)
}

#[cfg(test)]
mod tests;
