// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::collections::HashSet;

use semval::IsValid as _;

use tunequeue_core::{
    Delta, DeltaBatch, DeltaChange, Entity, EntityKey, MutationRecord, RevisionId, SyncCursor,
    UserId, util::clock::UtcDateTimeMs,
};
use tunequeue_repo::{
    genre::EntityRepo as GenreRepo,
    mutation::RecordRepo,
    queue::EntryRepo as QueueRepo,
    repertoire::EntryRepo as RepertoireRepo,
    sync::{DeferredDelta, SyncRepo},
    tune::EntityRepo as TuneRepo,
};

use super::*;

use crate::mutation::load_unsettled_records;

/// Check if a remote change would overwrite the optimistic
/// effect of an unsettled local record.
#[must_use]
pub fn conflicts_with(record: &MutationRecord, change: &DeltaChange) -> bool {
    debug_assert!(record.state.is_unsettled());
    match change.key() {
        EntityKey::Genre { .. } => false,
        EntityKey::Tune { tune_id } => {
            // Deleting a tune deletes all entries of users
            matches!(change, DeltaChange::Delete(_)) && record.targets_tune(tune_id)
        }
        EntityKey::RepertoireEntry { user_id, tune_id } => {
            user_id == record.user_id
                && record.targets_tune(tune_id)
                && (record.kind.affects_repertoire()
                    // Deleting a repertoire entry also deletes the queue entry
                    || (matches!(change, DeltaChange::Delete(_)) && record.kind.affects_queue()))
        }
        EntityKey::PracticeQueueEntry { user_id, tune_id } => {
            user_id == record.user_id && record.targets_tune(tune_id) && record.kind.affects_queue()
        }
    }
}

/// Outcome of applying remote changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub applied_count: usize,

    /// Changes that have been received before.
    pub duplicate_count: usize,

    /// Changes that could not be applied.
    pub skipped_count: usize,

    /// Changes that have been parked until conflicting local
    /// records are settled.
    pub deferred: Vec<RevisionId>,
}

/// The result of applying a single change.
enum Applied {
    Applied,
    Skipped,
}

fn is_ignored_for_user(user_id: &UserId, key: &EntityKey) -> bool {
    key.user_id().is_some_and(|owner| owner != user_id)
}

fn invalid_entity(entity: &Entity) -> bool {
    match entity {
        Entity::Tune(tune) => !tune.is_valid(),
        Entity::Genre(genre) => !genre.is_valid(),
        Entity::RepertoireEntry(_) => false,
        Entity::PracticeQueueEntry(entry) => !entry.schedule.is_valid(),
    }
}

fn apply_change<Repo>(
    repo: &mut Repo,
    revision_id: &RevisionId,
    change: &DeltaChange,
) -> RepoResult<Applied>
where
    Repo: TuneRepo + GenreRepo + RepertoireRepo + QueueRepo,
{
    match change {
        DeltaChange::Upsert(entity) => {
            if invalid_entity(entity) {
                log::warn!("Skipping invalid remote change {revision_id}: {entity:?}");
                return Ok(Applied::Skipped);
            }
            match entity {
                Entity::Tune(tune) => {
                    repo.upsert_tune(tune)?;
                }
                Entity::Genre(genre) => {
                    repo.upsert_genre(genre)?;
                }
                Entity::RepertoireEntry(entry) => {
                    repo.upsert_repertoire_entry(entry)?;
                }
                Entity::PracticeQueueEntry(entry) => {
                    if !repo.contains_repertoire_entry(&entry.user_id, entry.tune_id)? {
                        log::warn!(
                            "Skipping remote change {revision_id}: tune {tune_id} is not in the repertoire of user {user_id}",
                            tune_id = entry.tune_id,
                            user_id = entry.user_id,
                        );
                        return Ok(Applied::Skipped);
                    }
                    repo.upsert_practice_queue_entry(entry)?;
                }
            }
        }
        DeltaChange::Delete(key) => match key {
            EntityKey::Tune { tune_id } => {
                let purged_count = repo.purge_repertoire_entries_of_tune(*tune_id)?;
                if purged_count > 0 {
                    log::info!("Purged {purged_count} repertoire entries of deleted tune {tune_id}");
                }
                repo.delete_tune(*tune_id).optional()?;
            }
            EntityKey::Genre { genre_id } => {
                repo.delete_genre(genre_id).optional()?;
            }
            EntityKey::RepertoireEntry { user_id, tune_id } => {
                repo.purge_repertoire_entry(user_id, *tune_id)?;
            }
            EntityKey::PracticeQueueEntry { user_id, tune_id } => {
                repo.delete_practice_queue_entry(user_id, *tune_id)?;
            }
        },
    }
    Ok(Applied::Applied)
}

fn defer<Repo>(
    repo: &mut Repo,
    user_id: &UserId,
    delta: &Delta,
    now: UtcDateTimeMs,
) -> RepoResult<()>
where
    Repo: SyncRepo,
{
    repo.insert_deferred_delta(user_id, delta, now)?;
    log::info!(
        "Conflict resolved: deferring remote change {revision_id} of {key} until local mutations are settled",
        revision_id = delta.revision_id,
        key = delta.change.key(),
    );
    Ok(())
}

/// Apply a batch of remote changes and advance the cursor.
///
/// Must be invoked within a single transaction. Changes that have
/// already been applied are ignored, i.e. batches might be delivered
/// more than once.
pub fn apply_delta_batch<Repo>(
    repo: &mut Repo,
    user_id: &UserId,
    batch: &DeltaBatch,
    now: UtcDateTimeMs,
) -> Result<Outcome>
where
    Repo: TuneRepo + GenreRepo + RepertoireRepo + QueueRepo + RecordRepo + SyncRepo,
{
    let DeltaBatch { deltas, cursor } = batch;
    let unsettled_records = load_unsettled_records(repo, user_id)?;
    // Changes of entities with parked changes are parked as well
    // to preserve their order.
    let mut deferred_keys = repo
        .load_deferred_deltas(user_id)?
        .into_iter()
        .map(|deferred| deferred.delta.change.key())
        .collect::<HashSet<_>>();
    let mut outcome = Outcome::default();
    for delta in deltas {
        let Delta {
            revision_id,
            change,
        } = delta;
        if repo.is_revision_applied(user_id, revision_id)? {
            log::debug!("Ignoring duplicate remote change {revision_id}");
            outcome.duplicate_count += 1;
            continue;
        }
        let key = change.key();
        if is_ignored_for_user(user_id, &key) {
            log::debug!("Ignoring remote change {revision_id} of {key} owned by another user");
            outcome.skipped_count += 1;
        } else if deferred_keys.contains(&key)
            || unsettled_records
                .iter()
                .any(|record| conflicts_with(record, change))
        {
            defer(repo, user_id, delta, now)?;
            deferred_keys.insert(key);
            outcome.deferred.push(revision_id.clone());
        } else {
            match apply_change(repo, revision_id, change)? {
                Applied::Applied => outcome.applied_count += 1,
                Applied::Skipped => outcome.skipped_count += 1,
            }
        }
        repo.mark_revision_applied(user_id, revision_id, now)?;
    }
    repo.store_sync_cursor(&SyncCursor {
        user_id: user_id.clone(),
        cursor: cursor.clone(),
        updated_at: now,
    })?;
    log::debug!(
        "Applied {applied} of {total} remote change(s) for user {user_id}",
        applied = outcome.applied_count,
        total = deltas.len(),
    );
    Ok(outcome)
}

/// Re-apply parked remote changes that no longer conflict with
/// unsettled local records, in the order they have been received.
///
/// Must be invoked within the same transaction that settles a record.
pub fn apply_deferred_deltas<Repo>(repo: &mut Repo, user_id: &UserId) -> Result<Outcome>
where
    Repo: TuneRepo + GenreRepo + RepertoireRepo + QueueRepo + RecordRepo + SyncRepo,
{
    let deferred_deltas = repo.load_deferred_deltas(user_id)?;
    let mut outcome = Outcome::default();
    if deferred_deltas.is_empty() {
        return Ok(outcome);
    }
    let unsettled_records = load_unsettled_records(repo, user_id)?;
    let mut still_deferred_keys = HashSet::new();
    for DeferredDelta { id, delta, .. } in deferred_deltas {
        let Delta {
            revision_id,
            change,
        } = &delta;
        let key = change.key();
        if still_deferred_keys.contains(&key)
            || unsettled_records
                .iter()
                .any(|record| conflicts_with(record, change))
        {
            still_deferred_keys.insert(key);
            outcome.deferred.push(revision_id.clone());
            continue;
        }
        log::info!("Applying deferred remote change {revision_id} of {key}");
        match apply_change(repo, revision_id, change)? {
            Applied::Applied => outcome.applied_count += 1,
            Applied::Skipped => outcome.skipped_count += 1,
        }
        repo.delete_deferred_delta(id)?;
    }
    Ok(outcome)
}

/// The cursor for the next pull, if any.
///
/// A store that has been seeded as synchronized has an empty cursor
/// and pulls from the beginning.
pub fn load_cursor<Repo>(repo: &mut Repo, user_id: &UserId) -> RepoResult<Option<String>>
where
    Repo: SyncRepo,
{
    repo.load_sync_cursor(user_id).optional().map(|cursor| {
        cursor
            .map(|SyncCursor { cursor, .. }| cursor)
            .filter(|cursor| !cursor.is_empty())
    })
}

/// Check if the local store has ever been synchronized with the
/// remote.
pub fn is_synchronized<Repo>(repo: &mut Repo, user_id: &UserId) -> RepoResult<bool>
where
    Repo: SyncRepo,
{
    repo.load_sync_cursor(user_id)
        .optional()
        .map(|cursor| cursor.is_some())
}
