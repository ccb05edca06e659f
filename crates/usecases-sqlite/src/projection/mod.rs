// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tunequeue_core::{PracticeQueue, UserId, util::clock::UtcDateTimeMs};

use super::*;

pub use tunequeue_usecases::projection::{GenreFacets, GenreFacetsState};

pub fn compute_queue(
    connection: &mut DbConnection,
    user_id: &UserId,
    as_of: UtcDateTimeMs,
) -> Result<PracticeQueue> {
    read_transaction(connection, |repo| {
        uc::projection::compute_queue(repo, user_id, as_of)
    })
}

pub fn available_genres(connection: &mut DbConnection, user_id: &UserId) -> Result<GenreFacets> {
    read_transaction(connection, |repo| {
        uc::projection::available_genres(repo, user_id)
    })
}
