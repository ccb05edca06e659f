// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tunequeue_core::{Delta, RevisionId, SyncCursor, UserId, util::clock::UtcDateTimeMs};

use crate::prelude::*;

record_id_newtype!(DeferredDeltaId);

/// A remote change that has been parked while conflicting
/// with unsettled local mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeferredDelta {
    pub id: DeferredDeltaId,

    pub user_id: UserId,

    pub delta: Delta,

    pub deferred_at: UtcDateTimeMs,
}

pub trait SyncRepo {
    fn load_sync_cursor(&mut self, user_id: &UserId) -> RepoResult<SyncCursor>;

    fn store_sync_cursor(&mut self, cursor: &SyncCursor) -> RepoResult<()>;

    fn is_revision_applied(
        &mut self,
        user_id: &UserId,
        revision_id: &RevisionId,
    ) -> RepoResult<bool>;

    fn mark_revision_applied(
        &mut self,
        user_id: &UserId,
        revision_id: &RevisionId,
        applied_at: UtcDateTimeMs,
    ) -> RepoResult<()>;

    fn insert_deferred_delta(
        &mut self,
        user_id: &UserId,
        delta: &Delta,
        deferred_at: UtcDateTimeMs,
    ) -> RepoResult<DeferredDeltaId>;

    /// Load the deferred deltas of a user in the order they
    /// have been received.
    fn load_deferred_deltas(&mut self, user_id: &UserId) -> RepoResult<Vec<DeferredDelta>>;

    fn delete_deferred_delta(&mut self, id: DeferredDeltaId) -> RepoResult<()>;

    /// Forget everything that has been received from the remote
    /// for a user, i.e. the cursor, the applied revisions, and
    /// the deferred deltas.
    fn reset_sync_state(&mut self, user_id: &UserId) -> RepoResult<()>;
}
