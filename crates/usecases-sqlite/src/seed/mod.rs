// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::sync::atomic::AtomicBool;

use tunequeue_core::{UserId, util::clock::UtcDateTimeMs};

use super::*;

pub use tunequeue_usecases::seed::SeedData;

/// Replace the local contents of the store, bypassing the
/// mutation log.
pub fn reset_and_seed(
    connection: &mut DbConnection,
    user_id: &UserId,
    seed: SeedData,
    mark_synced: bool,
    now: UtcDateTimeMs,
    abort_flag: &AtomicBool,
) -> Result<Committed<()>> {
    let input = uc::seed::validate_input(seed)?;
    write_transaction(connection, |repo| {
        uc::seed::reset_and_seed(repo, user_id, input, mark_synced, now, abort_flag)
    })
}

pub fn clear(connection: &mut DbConnection, user_id: &UserId) -> Result<Committed<usize>> {
    write_transaction(connection, |repo| uc::seed::clear(repo, user_id))
}
