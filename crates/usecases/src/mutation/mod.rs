// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The mutation log: user intent that is pending reconciliation.
//!
//! Appending a record applies its optimistic effect on the local
//! entities within the same transaction. The effect is undone when
//! the record finally fails.

use std::collections::BTreeSet;

use semval::IsValid as _;

use tunequeue_core::{
    Entity, IdempotencyKey, MutationKind, MutationRecord, MutationState, PracticeQueueEntry,
    RepertoireEntry, TuneId, UserId, util::clock::UtcDateTimeMs,
};
use tunequeue_repo::{
    mutation::{RecordHeader, RecordRepo},
    queue::EntryRepo as QueueRepo,
    repertoire::EntryRepo as RepertoireRepo,
    tune::EntityRepo as TuneRepo,
};

use super::*;

/// The outcome of appending a new record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appended {
    pub header: RecordHeader,

    pub record: MutationRecord,

    /// Number of targets that are in the desired state afterwards.
    ///
    /// Always equals the number of targets.
    pub affected_count: usize,
}

#[derive(Debug)]
pub struct ValidatedTargets(BTreeSet<TuneId>);

/// Check that the targets of a new record are applicable.
pub fn validate_targets<Repo>(
    repo: &mut Repo,
    user_id: &UserId,
    kind: MutationKind,
    targets: BTreeSet<TuneId>,
) -> Result<ValidatedTargets>
where
    Repo: TuneRepo + RepertoireRepo + QueueRepo,
{
    if targets.is_empty() {
        return Err(InputError(anyhow::anyhow!("no tunes selected")).into());
    }
    for &tune_id in &targets {
        match kind {
            MutationKind::AddToRepertoire => {
                if !repo.tune_exists(tune_id)? {
                    return Err(
                        InputError(anyhow::anyhow!("tune {tune_id} is not in the catalog")).into(),
                    );
                }
            }
            MutationKind::AddToReview => {
                if !repo.contains_repertoire_entry(user_id, tune_id)? {
                    return Err(InputError(anyhow::anyhow!(
                        "tune {tune_id} is not in the repertoire"
                    ))
                    .into());
                }
            }
            MutationKind::RemoveFromRepertoire => {
                if repo.contains_practice_queue_entry(user_id, tune_id)? {
                    return Err(InputError(anyhow::anyhow!(
                        "tune {tune_id} must be removed from review first"
                    ))
                    .into());
                }
            }
            MutationKind::RemoveFromReview | MutationKind::CompleteReview => (),
        }
    }
    Ok(ValidatedTargets(targets))
}

/// Apply the local effect of a record on a single tune.
///
/// Tunes whose local state has changed are added to the effect.
/// Deleted entries are captured in the record.
fn apply_effect<Repo>(
    repo: &mut Repo,
    record: &mut MutationRecord,
    tune_id: TuneId,
    now: UtcDateTimeMs,
) -> RepoResult<()>
where
    Repo: RepertoireRepo + QueueRepo,
{
    let user_id = &record.user_id;
    match record.kind {
        MutationKind::AddToRepertoire => {
            let entry = RepertoireEntry::new(user_id.clone(), tune_id, now);
            if repo.insert_repertoire_entry(&entry)? {
                record.effect.insert(tune_id);
            }
        }
        MutationKind::RemoveFromRepertoire => {
            if let Some(entry) = repo.load_repertoire_entry(user_id, tune_id).optional()? {
                repo.delete_repertoire_entry(user_id, tune_id)?;
                record.effect.insert(tune_id);
                record.removed.push(Entity::RepertoireEntry(entry));
            }
        }
        MutationKind::AddToReview => {
            let entry = PracticeQueueEntry::new(user_id.clone(), tune_id, now);
            if repo.insert_practice_queue_entry(&entry)? {
                record.effect.insert(tune_id);
            }
        }
        MutationKind::RemoveFromReview | MutationKind::CompleteReview => {
            if let Some(entry) = repo.load_practice_queue_entry(user_id, tune_id).optional()? {
                repo.delete_practice_queue_entry(user_id, tune_id)?;
                record.effect.insert(tune_id);
                record.removed.push(Entity::PracticeQueueEntry(entry));
            }
        }
    }
    Ok(())
}

/// Append a new record and apply its optimistic effect.
///
/// Only the given targets are affected.
pub fn append<Repo>(
    repo: &mut Repo,
    user_id: UserId,
    kind: MutationKind,
    targets: ValidatedTargets,
    now: UtcDateTimeMs,
) -> Result<Appended>
where
    Repo: RecordRepo + RepertoireRepo + QueueRepo,
{
    let ValidatedTargets(targets) = targets;
    let mut record = MutationRecord::new(user_id, kind, targets.clone(), now);
    for tune_id in targets {
        apply_effect(repo, &mut record, tune_id, now)?;
    }
    debug_assert!(record.is_valid());
    let header = repo.insert_mutation_record(&record)?;
    log::debug!(
        "Appended mutation record {key}: {kind} {count} tune(s) with {effect_count} change(s)",
        key = record.key,
        count = record.targets.len(),
        effect_count = record.effect.len(),
    );
    let affected_count = record.targets.len();
    Ok(Appended {
        header,
        record,
        affected_count,
    })
}

const ALL_STATES: [MutationState; 4] = [
    MutationState::Pending,
    MutationState::InFlight,
    MutationState::Acknowledged,
    MutationState::Failed,
];

/// The membership of a tune that remains after a record has failed.
///
/// Decided by the latest other record for the same tune and the same
/// kind of membership that has not failed. Without such a record the
/// membership before the earliest failed record that changed it
/// applies.
fn remaining_membership(
    records: &[MutationRecord],
    failed: &MutationRecord,
    tune_id: TuneId,
) -> bool {
    let mut intent = None;
    let mut baseline = None;
    for record in records.iter().filter(|record| {
        record.targets_tune(tune_id) && record.kind.affects_queue() == failed.kind.affects_queue()
    }) {
        if record.key == failed.key || record.state == MutationState::Failed {
            if baseline.is_none() && record.effect.contains(&tune_id) {
                baseline = Some(!record.kind.adds_membership());
            }
        } else {
            intent = Some(record.kind.adds_membership());
        }
    }
    intent
        .or(baseline)
        .unwrap_or_else(|| !failed.kind.adds_membership())
}

/// Snapshots of deleted entries, most relevant first.
fn removed_entries<'a>(
    records: &'a [MutationRecord],
    failed: &'a MutationRecord,
    tune_id: TuneId,
) -> impl Iterator<Item = &'a Entity> {
    std::iter::once(failed)
        .chain(records.iter().rev())
        .filter_map(move |record| record.removed_entry(tune_id))
}

fn restore_repertoire_membership<Repo>(
    repo: &mut Repo,
    records: &[MutationRecord],
    failed: &MutationRecord,
    tune_id: TuneId,
) -> RepoResult<()>
where
    Repo: RepertoireRepo + QueueRepo,
{
    let user_id = &failed.user_id;
    let member = remaining_membership(records, failed, tune_id);
    if member == repo.contains_repertoire_entry(user_id, tune_id)? {
        return Ok(());
    }
    if !member {
        // Might have been queued in the meantime
        repo.purge_repertoire_entry(user_id, tune_id)?;
        return Ok(());
    }
    let entry = removed_entries(records, failed, tune_id)
        .find_map(|entity| match entity {
            Entity::RepertoireEntry(entry) => Some(entry.clone()),
            _ => None,
        })
        .unwrap_or_else(|| RepertoireEntry::new(user_id.clone(), tune_id, failed.created_at));
    repo.insert_repertoire_entry(&entry)?;
    Ok(())
}

fn restore_queue_membership<Repo>(
    repo: &mut Repo,
    records: &[MutationRecord],
    failed: &MutationRecord,
    tune_id: TuneId,
) -> RepoResult<()>
where
    Repo: RepertoireRepo + QueueRepo,
{
    let user_id = &failed.user_id;
    let queued = remaining_membership(records, failed, tune_id);
    if queued == repo.contains_practice_queue_entry(user_id, tune_id)? {
        return Ok(());
    }
    if !queued {
        repo.delete_practice_queue_entry(user_id, tune_id)?;
        return Ok(());
    }
    if !repo.contains_repertoire_entry(user_id, tune_id)? {
        log::warn!(
            "Cannot restore tune {tune_id} in the practice queue of user {user_id} without a repertoire entry"
        );
        return Ok(());
    }
    let entry = removed_entries(records, failed, tune_id)
        .find_map(|entity| match entity {
            Entity::PracticeQueueEntry(entry) => Some(entry.clone()),
            _ => None,
        })
        .unwrap_or_else(|| {
            PracticeQueueEntry::new(user_id.clone(), tune_id, failed.created_at)
        });
    repo.insert_practice_queue_entry(&entry)?;
    Ok(())
}

/// Undo the optimistic effect of a failed record.
///
/// The local state of the affected tunes is reconciled with the
/// remaining records in the log. Deleted entries are restored from
/// their snapshots.
pub fn rollback<Repo>(repo: &mut Repo, failed: &MutationRecord) -> RepoResult<()>
where
    Repo: RecordRepo + RepertoireRepo + QueueRepo,
{
    let records = load_records_in_states(repo, &failed.user_id, &ALL_STATES)?;
    for &tune_id in &failed.effect {
        if failed.kind.affects_queue() {
            restore_queue_membership(repo, &records, failed, tune_id)?;
        } else {
            restore_repertoire_membership(repo, &records, failed, tune_id)?;
        }
    }
    log::info!(
        "Rolled back {kind} of {count} tune(s) for mutation record {key}",
        kind = failed.kind,
        count = failed.effect.len(),
        key = failed.key,
    );
    Ok(())
}

fn load_record<Repo>(repo: &mut Repo, key: &IdempotencyKey) -> RepoResult<MutationRecord>
where
    Repo: RecordRepo,
{
    repo.load_mutation_record(key).map(|(_, record)| record)
}

pub fn mark_in_flight<Repo>(
    repo: &mut Repo,
    key: &IdempotencyKey,
    now: UtcDateTimeMs,
) -> RepoResult<MutationRecord>
where
    Repo: RecordRepo,
{
    let mut record = load_record(repo, key)?;
    record.state = MutationState::InFlight;
    record.attempt_count = record.attempt_count.saturating_add(1);
    record.next_attempt_at = None;
    record.updated_at = now;
    repo.update_mutation_record(&record)?;
    Ok(record)
}

/// Settle a record after the remote confirmed it.
///
/// Acknowledging a record twice has no effect.
pub fn mark_acknowledged<Repo>(
    repo: &mut Repo,
    key: &IdempotencyKey,
    now: UtcDateTimeMs,
) -> RepoResult<MutationRecord>
where
    Repo: RecordRepo,
{
    let mut record = load_record(repo, key)?;
    if record.state == MutationState::Acknowledged {
        log::debug!("Mutation record {key} has already been acknowledged");
        return Ok(record);
    }
    record.state = MutationState::Acknowledged;
    record.failure_reason = None;
    record.updated_at = now;
    repo.update_mutation_record(&record)?;
    Ok(record)
}

/// Put an in-flight record back into the pending state after
/// a transient failure.
pub fn reschedule<Repo>(
    repo: &mut Repo,
    key: &IdempotencyKey,
    next_attempt_at: UtcDateTimeMs,
    reason: String,
    now: UtcDateTimeMs,
) -> RepoResult<MutationRecord>
where
    Repo: RecordRepo,
{
    let mut record = load_record(repo, key)?;
    record.state = MutationState::Pending;
    record.next_attempt_at = Some(next_attempt_at);
    record.failure_reason = Some(reason);
    record.updated_at = now;
    repo.update_mutation_record(&record)?;
    Ok(record)
}

/// Settle a record that will never be confirmed by the remote
/// and roll back its optimistic effect.
///
/// Failing a record twice has no effect.
pub fn mark_failed<Repo>(
    repo: &mut Repo,
    key: &IdempotencyKey,
    reason: String,
    now: UtcDateTimeMs,
) -> RepoResult<MutationRecord>
where
    Repo: RecordRepo + RepertoireRepo + QueueRepo,
{
    let mut record = load_record(repo, key)?;
    if record.state.is_terminal() {
        if record.state == MutationState::Failed {
            log::debug!("Mutation record {key} has already failed");
            return Ok(record);
        }
        return Err(RepoError::Conflict);
    }
    log::error!(
        "Mutation record {key} failed after {attempt_count} attempt(s): {reason}",
        attempt_count = record.attempt_count,
    );
    record.state = MutationState::Failed;
    record.failure_reason = Some(reason);
    record.next_attempt_at = None;
    record.updated_at = now;
    repo.update_mutation_record(&record)?;
    rollback(repo, &record)?;
    Ok(record)
}

fn load_records_in_states<Repo>(
    repo: &mut Repo,
    user_id: &UserId,
    states: &[MutationState],
) -> RepoResult<Vec<MutationRecord>>
where
    Repo: RecordRepo,
{
    let mut collector: Vec<(RecordHeader, MutationRecord)> = Vec::new();
    repo.load_mutation_records(user_id, states, &mut collector)?;
    Ok(collector.into_iter().map(|(_, record)| record).collect())
}

/// Pending records of a user, oldest first.
pub fn load_pending_records<Repo>(
    repo: &mut Repo,
    user_id: &UserId,
) -> RepoResult<Vec<MutationRecord>>
where
    Repo: RecordRepo,
{
    load_records_in_states(repo, user_id, &[MutationState::Pending])
}

/// Records of a user that are not yet confirmed or refuted, oldest first.
pub fn load_unsettled_records<Repo>(
    repo: &mut Repo,
    user_id: &UserId,
) -> RepoResult<Vec<MutationRecord>>
where
    Repo: RecordRepo,
{
    load_records_in_states(
        repo,
        user_id,
        &[MutationState::Pending, MutationState::InFlight],
    )
}

pub fn load_failed_records<Repo>(
    repo: &mut Repo,
    user_id: &UserId,
) -> RepoResult<Vec<MutationRecord>>
where
    Repo: RecordRepo,
{
    load_records_in_states(repo, user_id, &[MutationState::Failed])
}

/// Returns the number of records that have been reset.
pub fn reset_in_flight<Repo>(
    repo: &mut Repo,
    user_id: &UserId,
    now: UtcDateTimeMs,
) -> RepoResult<usize>
where
    Repo: RecordRepo,
{
    let count = repo.reset_in_flight_mutation_records(user_id, now)?;
    if count > 0 {
        log::info!("Resending {count} interrupted mutation record(s) of user {user_id}");
    }
    Ok(count)
}

fn load_failed_record<Repo>(
    repo: &mut Repo,
    user_id: &UserId,
    key: &IdempotencyKey,
) -> Result<MutationRecord>
where
    Repo: RecordRepo,
{
    let record = load_record(repo, key)?;
    if &record.user_id != user_id || record.state != MutationState::Failed {
        return Err(InputError(anyhow::anyhow!("no failed mutation record {key}")).into());
    }
    Ok(record)
}

/// Replace a failed record with a new attempt.
///
/// The new record has the same kind and targets, but a fresh
/// idempotency key.
pub fn retry_failed<Repo>(
    repo: &mut Repo,
    user_id: &UserId,
    key: &IdempotencyKey,
    now: UtcDateTimeMs,
) -> Result<Appended>
where
    Repo: RecordRepo + TuneRepo + RepertoireRepo + QueueRepo,
{
    let failed = load_failed_record(repo, user_id, key)?;
    let targets = validate_targets(repo, user_id, failed.kind, failed.targets)?;
    repo.delete_mutation_record(key)?;
    append(repo, failed.user_id, failed.kind, targets, now)
}

/// Remove a failed record from the log.
pub fn dismiss_failed<Repo>(
    repo: &mut Repo,
    user_id: &UserId,
    key: &IdempotencyKey,
) -> Result<MutationRecord>
where
    Repo: RecordRepo,
{
    let failed = load_failed_record(repo, user_id, key)?;
    repo.delete_mutation_record(key)?;
    Ok(failed)
}
