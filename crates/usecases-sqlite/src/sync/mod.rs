// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tunequeue_core::{DeltaBatch, UserId, util::clock::UtcDateTimeMs};

use super::*;

pub use tunequeue_usecases::sync::Outcome;

/// Apply a batch of remote changes and store the new cursor
/// atomically.
pub fn apply_delta_batch(
    connection: &mut DbConnection,
    user_id: &UserId,
    batch: &DeltaBatch,
    now: UtcDateTimeMs,
) -> Result<Committed<Outcome>> {
    write_transaction(connection, |repo| {
        uc::sync::apply_delta_batch(repo, user_id, batch, now)
    })
}

pub fn load_cursor(connection: &mut DbConnection, user_id: &UserId) -> Result<Option<String>> {
    read_transaction(connection, |repo| uc::sync::load_cursor(repo, user_id))
}

#[cfg(test)]
mod tests;
