// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tunequeue_core::{PracticeQueueEntry, TuneId, UserId};

use crate::prelude::*;

/// Practice queue entries of users.
///
/// Implementations must reject writes of entries for tunes that are
/// not in the repertoire of the user with
/// [`RepoError::InvariantViolation`].
pub trait EntryRepo {
    user_tune_entry_repo_trait_common_functions!(
        PracticeQueueEntry,
        practice_queue_entry,
        practice_queue_entries
    );

    /// Returns `false` if the tune is already queued.
    fn insert_practice_queue_entry(&mut self, entry: &PracticeQueueEntry) -> RepoResult<bool>;

    fn upsert_practice_queue_entry(&mut self, entry: &PracticeQueueEntry) -> RepoResult<()>;

    /// Returns `false` if the tune was not queued.
    fn delete_practice_queue_entry(&mut self, user_id: &UserId, tune_id: TuneId)
    -> RepoResult<bool>;
}
