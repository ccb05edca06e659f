// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tunequeue_core::{
    IdempotencyKey, MutationRecord, MutationState, UserId, util::clock::UtcDateTimeMs,
};

use crate::prelude::*;

record_id_newtype!(RecordId);

pub type RecordHeader = crate::RecordHeader<RecordId>;

/// Check if a stored record could be replaced by an updated version.
///
/// Unsettled records might be updated while staying in the same state,
/// e.g. when rescheduling a pending record for a later attempt.
/// Settled records are never modified. Neither are the targets nor
/// the snapshots of removed entries.
pub fn check_record_update(stored: &MutationRecord, updated: &MutationRecord) -> RepoResult<()> {
    debug_assert_eq!(stored.key, updated.key);
    if stored.user_id != updated.user_id
        || stored.kind != updated.kind
        || stored.targets != updated.targets
        || stored.removed != updated.removed
    {
        return Err(RepoError::Conflict);
    }
    let permitted = if stored.state == updated.state {
        stored.state.is_unsettled()
    } else {
        stored.state.can_transition_to(updated.state)
    };
    if !permitted {
        log::warn!(
            "Rejecting transition of mutation record {key} from {from} to {to}",
            key = stored.key,
            from = stored.state,
            to = updated.state,
        );
        return Err(RepoError::Conflict);
    }
    Ok(())
}

/// Durable storage of the mutation log.
///
/// Records are ordered by insertion, i.e. by their [`RecordId`].
pub trait RecordRepo {
    /// Append a new record to the log.
    ///
    /// Fails with [`RepoError::Conflict`] if a record with the same
    /// idempotency key already exists.
    fn insert_mutation_record(&mut self, record: &MutationRecord) -> RepoResult<RecordHeader>;

    fn load_mutation_record(
        &mut self,
        key: &IdempotencyKey,
    ) -> RepoResult<(RecordHeader, MutationRecord)>;

    /// Replace a stored record with an updated version.
    ///
    /// See also: [`check_record_update()`]
    fn update_mutation_record(&mut self, updated: &MutationRecord) -> RepoResult<()>;

    fn delete_mutation_record(&mut self, key: &IdempotencyKey) -> RepoResult<()>;

    /// Load the records of a user in any of the given states,
    /// oldest first.
    fn load_mutation_records(
        &mut self,
        user_id: &UserId,
        states: &[MutationState],
        collector: &mut dyn ReservableRecordCollector<Header = RecordHeader, Record = MutationRecord>,
    ) -> RepoResult<()>;

    /// Put all records of a user that are stuck in flight back
    /// into the pending state.
    ///
    /// Returns the number of affected records.
    fn reset_in_flight_mutation_records(
        &mut self,
        user_id: &UserId,
        updated_at: UtcDateTimeMs,
    ) -> RepoResult<usize>;
}
