// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Deterministic initialization of the local store.
//!
//! Bypasses the mutation log and the remote. Intended for test
//! harnesses that need reproducible scenarios.

use std::sync::atomic::{AtomicBool, Ordering};

use semval::Validate as _;

use tunequeue_core::{
    Entity, EntityKey, EntityKind, Genre, MutationRecord, MutationState, PracticeQueueEntry,
    RepertoireEntry, SyncCursor, Tune, TuneId, UserId, util::clock::UtcDateTimeMs,
};
use tunequeue_repo::{
    genre::EntityRepo as GenreRepo,
    mutation::{RecordHeader, RecordRepo},
    queue::EntryRepo as QueueRepo,
    repertoire::EntryRepo as RepertoireRepo,
    store::EntityStore,
    sync::SyncRepo,
    tune::EntityRepo as TuneRepo,
};

use super::*;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedData {
    pub genres: Vec<Genre>,

    pub tunes: Vec<Tune>,

    /// Tunes in the repertoire of the user.
    pub repertoire: Vec<TuneId>,

    /// Tunes of the repertoire that are under review.
    pub practice_queue: Vec<TuneId>,
}

#[derive(Debug)]
pub struct ValidatedInput(SeedData);

pub fn validate_input(seed: SeedData) -> InputResult<ValidatedInput> {
    for genre in &seed.genres {
        if let Err(err) = genre.validate() {
            return Err(anyhow::anyhow!("Invalid genre {id}: {err:?}", id = genre.id).into());
        }
    }
    for tune in &seed.tunes {
        if let Err(err) = tune.validate() {
            return Err(anyhow::anyhow!("Invalid tune {id}: {err:?}", id = tune.id).into());
        }
    }
    if let Some(tune_id) = seed
        .repertoire
        .iter()
        .find(|tune_id| !seed.tunes.iter().any(|tune| tune.id == **tune_id))
    {
        return Err(anyhow::anyhow!("Repertoire tune {tune_id} is not in the catalog").into());
    }
    if let Some(tune_id) = seed
        .practice_queue
        .iter()
        .find(|tune_id| !seed.repertoire.contains(tune_id))
    {
        return Err(anyhow::anyhow!("Queued tune {tune_id} is not in the repertoire").into());
    }
    Ok(ValidatedInput(seed))
}

fn collect_keys<Repo>(
    repo: &mut Repo,
    kind: EntityKind,
    user_id: &UserId,
) -> RepoResult<Vec<EntityKey>>
where
    Repo: EntityStore,
{
    repo.scan(kind, |entity: &Entity| {
        entity.key().user_id().is_none_or(|owner| owner == user_id)
    })
    .map(|entity| entity.map(|entity| entity.key()))
    .collect()
}

/// Delete the catalog and all local state of a user.
///
/// Returns the number of deleted entities.
pub fn clear<Repo>(repo: &mut Repo, user_id: &UserId) -> RepoResult<usize>
where
    Repo: TuneRepo + GenreRepo + RepertoireRepo + QueueRepo + RecordRepo + SyncRepo,
{
    let mut deleted_count = 0;
    // Queue entries before repertoire entries
    for kind in [
        EntityKind::PracticeQueueEntry,
        EntityKind::RepertoireEntry,
        EntityKind::Tune,
        EntityKind::Genre,
    ] {
        let keys = collect_keys(repo, kind, user_id)?;
        for key in &keys {
            EntityStore::delete(repo, key)?;
        }
        deleted_count += keys.len();
    }
    let mut records: Vec<(RecordHeader, MutationRecord)> = Vec::new();
    repo.load_mutation_records(
        user_id,
        &[
            MutationState::Pending,
            MutationState::InFlight,
            MutationState::Acknowledged,
            MutationState::Failed,
        ],
        &mut records,
    )?;
    for (_, record) in &records {
        repo.delete_mutation_record(&record.key)?;
    }
    repo.reset_sync_state(user_id)?;
    log::info!(
        "Cleared {deleted_count} entities and {record_count} mutation record(s) of user {user_id}",
        record_count = records.len(),
    );
    Ok(deleted_count)
}

/// Replace the local store contents with seed data.
///
/// If `mark_synced` is set the store is considered synchronized
/// with the remote afterwards, i.e. projections leave their
/// loading state.
///
/// Fails with [`RepoError::Aborted`] when `abort_flag` is raised
/// while inserting the catalog.
pub fn reset_and_seed<Repo>(
    repo: &mut Repo,
    user_id: &UserId,
    input: ValidatedInput,
    mark_synced: bool,
    now: UtcDateTimeMs,
    abort_flag: &AtomicBool,
) -> Result<()>
where
    Repo: TuneRepo + GenreRepo + RepertoireRepo + QueueRepo + RecordRepo + SyncRepo,
{
    let ValidatedInput(SeedData {
        genres,
        tunes,
        repertoire,
        practice_queue,
    }) = input;
    clear(repo, user_id)?;
    for genre in &genres {
        repo.upsert_genre(genre)?;
    }
    for tune in &tunes {
        if abort_flag.load(Ordering::Relaxed) {
            log::info!("Aborting seed of user {user_id}");
            return Err(RepoError::Aborted.into());
        }
        repo.upsert_tune(tune)?;
    }
    for &tune_id in &repertoire {
        repo.upsert_repertoire_entry(&RepertoireEntry::new(user_id.clone(), tune_id, now))?;
    }
    for &tune_id in &practice_queue {
        repo.upsert_practice_queue_entry(&PracticeQueueEntry::new(
            user_id.clone(),
            tune_id,
            now,
        ))?;
    }
    if mark_synced {
        repo.store_sync_cursor(&SyncCursor {
            user_id: user_id.clone(),
            cursor: String::new(),
            updated_at: now,
        })?;
    }
    log::info!(
        "Seeded {tune_count} tune(s) and {genre_count} genre(s) with {repertoire_count} repertoire and {queue_count} queue entries for user {user_id}",
        tune_count = tunes.len(),
        genre_count = genres.len(),
        repertoire_count = repertoire.len(),
        queue_count = practice_queue.len(),
    );
    Ok(())
}
