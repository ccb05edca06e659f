// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tunequeue_core::{RepertoireEntry, TuneId, UserId};

use crate::prelude::*;

pub trait EntryRepo {
    user_tune_entry_repo_trait_common_functions!(
        RepertoireEntry,
        repertoire_entry,
        repertoire_entries
    );

    /// Returns `false` if the entry already exists.
    fn insert_repertoire_entry(&mut self, entry: &RepertoireEntry) -> RepoResult<bool>;

    fn upsert_repertoire_entry(&mut self, entry: &RepertoireEntry) -> RepoResult<()>;

    /// Delete a repertoire entry that is not scheduled for review.
    ///
    /// Fails with [`RepoError::InvariantViolation`] if the tune is still
    /// in the practice queue of the user. Returns `false` if no entry
    /// exists.
    fn delete_repertoire_entry(&mut self, user_id: &UserId, tune_id: TuneId) -> RepoResult<bool>;

    /// Delete a repertoire entry together with the corresponding
    /// practice queue entry.
    fn purge_repertoire_entry(&mut self, user_id: &UserId, tune_id: TuneId) -> RepoResult<bool>;

    /// Delete the repertoire and practice queue entries of all users
    /// that refer to the given tune.
    fn purge_repertoire_entries_of_tune(&mut self, tune_id: TuneId) -> RepoResult<usize>;
}
