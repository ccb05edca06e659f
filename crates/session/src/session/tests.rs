// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{
    collections::BTreeSet,
    num::{NonZeroU32, NonZeroU64},
    sync::{Arc, Mutex as StdMutex},
};

use test_log::test;

use tunequeue_backend_embedded::{projection::GenreFacetsState, storage::DatabaseConfig};
use tunequeue_core::{Delta, DeltaBatch, DeltaChange, Entity, Genre};
use tunequeue_remote::{RemoteError, RemoteResult};
use tunequeue_storage_sqlite::connection::{
    Config as ConnectionConfig, Storage, pool::Config as PoolConfig,
};

use super::*;

use crate::{Environment, settings::BackoffSettings};

type TestResult<T> = anyhow::Result<T>;

const REPERTOIRE: [i64; 6] = [66, 70, 72, 3497, 54, 55];

#[derive(Debug, Default)]
struct FakeRemoteState {
    posted: Vec<IdempotencyKey>,
    acknowledged: BTreeSet<IdempotencyKey>,
    queue: BTreeSet<TuneId>,
    transient_failures: usize,
    lost_acknowledgements: usize,
    reject_reason: Option<String>,
    deltas: Vec<Delta>,
    pulled_cursors: Vec<Option<String>>,
}

/// An in-memory remote that deduplicates records by their key.
#[derive(Debug, Default, Clone)]
struct FakeRemote(Arc<StdMutex<FakeRemoteState>>);

impl FakeRemote {
    fn modify(&self, modify: impl FnOnce(&mut FakeRemoteState)) {
        modify(&mut self.0.lock().unwrap());
    }

    fn posted(&self) -> Vec<IdempotencyKey> {
        self.0.lock().unwrap().posted.clone()
    }

    fn queue(&self) -> BTreeSet<TuneId> {
        self.0.lock().unwrap().queue.clone()
    }

    fn pulled_cursors(&self) -> Vec<Option<String>> {
        self.0.lock().unwrap().pulled_cursors.clone()
    }
}

impl Remote for FakeRemote {
    async fn post_mutation(&self, record: &MutationRecord) -> RemoteResult<()> {
        let mut state = self.0.lock().unwrap();
        state.posted.push(record.key);
        if state.transient_failures > 0 {
            state.transient_failures -= 1;
            return Err(RemoteError::transient(anyhow::anyhow!(
                "503 Service Unavailable"
            )));
        }
        if let Some(reason) = &state.reject_reason {
            return Err(RemoteError::Rejected {
                reason: reason.clone(),
            });
        }
        if state.acknowledged.insert(record.key) && record.kind == MutationKind::AddToReview {
            state.queue.extend(record.targets.iter().copied());
        }
        if state.lost_acknowledgements > 0 {
            state.lost_acknowledgements -= 1;
            return Err(RemoteError::transient(anyhow::anyhow!("connection reset")));
        }
        Ok(())
    }

    async fn pull_deltas(
        &self,
        _user_id: &UserId,
        cursor: Option<&str>,
    ) -> RemoteResult<DeltaBatch> {
        let mut state = self.0.lock().unwrap();
        state.pulled_cursors.push(cursor.map(ToOwned::to_owned));
        let start = cursor
            .and_then(|cursor| cursor.parse::<usize>().ok())
            .unwrap_or(0)
            .min(state.deltas.len());
        Ok(DeltaBatch {
            deltas: state.deltas[start..].to_vec(),
            cursor: state.deltas.len().to_string(),
        })
    }
}

fn sync_settings() -> SyncSettings {
    SyncSettings {
        remote_url: None,
        request_timeout_millis: NonZeroU64::new(5_000).unwrap(),
        backoff: BackoffSettings {
            base_delay_millis: NonZeroU64::new(1).unwrap(),
            max_delay_millis: NonZeroU64::new(10).unwrap(),
            max_attempts: NonZeroU32::new(3).unwrap(),
        },
        // Only on request
        pull_interval_millis: NonZeroU64::new(3_600_000).unwrap(),
        drain_poll_interval_millis: NonZeroU64::new(3_600_000).unwrap(),
    }
}

fn database_config(storage: Storage) -> DatabaseConfig {
    DatabaseConfig {
        connection: ConnectionConfig {
            storage,
            pool: PoolConfig::default(),
        },
        migrate_schema: true,
    }
}

fn new_genre(id: &str, name: &str) -> Genre {
    Genre {
        id: id.into(),
        name: name.to_owned(),
    }
}

fn new_tune(id: i64) -> Tune {
    Tune {
        id: TuneId::new(id),
        title: format!("Tune #{id}"),
        genre_id: Some("irish".into()),
        tune_type: Some("reel".to_owned()),
        mode: None,
    }
}

fn tune_ids(ids: &[i64]) -> Vec<TuneId> {
    ids.iter().copied().map(TuneId::new).collect()
}

fn seed_data() -> SeedData {
    SeedData {
        genres: vec![new_genre("irish", "Irish Traditional")],
        tunes: REPERTOIRE.iter().copied().map(new_tune).collect(),
        repertoire: tune_ids(&REPERTOIRE),
        practice_queue: Vec::new(),
    }
}

struct Fixture {
    env: Environment,
    session: Session<FakeRemote>,
}

impl Fixture {
    async fn start(storage: Storage, remote: FakeRemote) -> TestResult<Self> {
        let env = Environment::commission(database_config(storage))?;
        let session = Session::start(
            env.handle().clone(),
            remote,
            "u1".into(),
            sync_settings(),
        )
        .await?;
        Ok(Self { env, session })
    }

    async fn start_seeded(remote: FakeRemote) -> TestResult<Self> {
        let fixture = Self::start(Storage::InMemory, remote).await?;
        fixture.session.seed(seed_data(), true).await?;
        Ok(fixture)
    }

    async fn queued_tune_ids(&self) -> TestResult<Vec<TuneId>> {
        let queue = self
            .session
            .get_practice_queue(UtcDateTimeMs::now())
            .await?;
        Ok(queue.tune_ids().collect())
    }

    async fn teardown(self) {
        let Self { env, session } = self;
        session.teardown().await;
        env.decommission();
    }
}

#[test(tokio::test)]
async fn practice_queue_matches_selection_after_reload() -> TestResult<()> {
    let tempdir = tempfile::tempdir()?;
    let storage = Storage::File {
        path: tempdir.path().join("tunequeue.sqlite"),
    };
    let remote = FakeRemote::default();

    let fixture = Fixture::start(storage.clone(), remote.clone()).await?;
    fixture.session.seed(seed_data(), true).await?;
    let added = fixture.session.add_to_review(tune_ids(&[66, 70, 72])).await?;
    assert_eq!(3, added.added_count);
    // Visible immediately
    assert_eq!(tune_ids(&[66, 70, 72]), fixture.queued_tune_ids().await?);

    fixture.session.wait_for_idle().await?;
    assert_eq!(SyncState::Idle, fixture.session.sync_state());
    assert_eq!(vec![added.key], remote.posted());
    fixture.teardown().await;

    let fixture = Fixture::start(storage, remote.clone()).await?;
    assert_eq!(tune_ids(&[66, 70, 72]), fixture.queued_tune_ids().await?);
    assert_eq!(
        REPERTOIRE.len(),
        fixture.session.get_repertoire().await?.len()
    );
    fixture.session.wait_for_idle().await?;
    // Nothing left to send
    assert_eq!(1, remote.posted().len());
    fixture.teardown().await;
    Ok(())
}

#[test(tokio::test)]
async fn retry_once_after_transient_failure() -> TestResult<()> {
    let remote = FakeRemote::default();
    remote.modify(|state| state.transient_failures = 1);
    let fixture = Fixture::start_seeded(remote.clone()).await?;

    let added = fixture.session.add_to_review(tune_ids(&[66, 70, 72])).await?;
    fixture.session.wait_for_idle().await?;

    assert_eq!(vec![added.key, added.key], remote.posted());
    assert_eq!(tune_ids(&[66, 70, 72]), fixture.queued_tune_ids().await?);
    assert!(fixture.session.failed_mutations().await?.is_empty());
    fixture.teardown().await;
    Ok(())
}

#[test(tokio::test)]
async fn resending_acknowledged_record_is_harmless() -> TestResult<()> {
    let remote = FakeRemote::default();
    remote.modify(|state| state.lost_acknowledgements = 1);
    let fixture = Fixture::start_seeded(remote.clone()).await?;

    let added = fixture.session.add_to_review(tune_ids(&[66, 70, 72])).await?;
    fixture.session.wait_for_idle().await?;

    assert_eq!(vec![added.key, added.key], remote.posted());
    assert_eq!(
        tune_ids(&[66, 70, 72]).into_iter().collect::<BTreeSet<_>>(),
        remote.queue()
    );
    assert_eq!(3, fixture.queued_tune_ids().await?.len());
    fixture.teardown().await;
    Ok(())
}

#[test(tokio::test)]
async fn give_up_after_max_attempts() -> TestResult<()> {
    let remote = FakeRemote::default();
    remote.modify(|state| state.transient_failures = usize::MAX);
    let fixture = Fixture::start_seeded(remote.clone()).await?;

    let added = fixture.session.add_to_review(tune_ids(&[66])).await?;
    fixture.session.wait_for_idle().await?;

    assert_eq!(3, remote.posted().len());
    assert!(fixture.queued_tune_ids().await?.is_empty());
    let failed = fixture.session.failed_mutations().await?;
    assert_eq!(1, failed.len());
    assert_eq!(added.key, failed[0].key);
    fixture.teardown().await;
    Ok(())
}

#[test(tokio::test)]
async fn rejected_mutation_is_rolled_back_and_can_be_retried() -> TestResult<()> {
    let remote = FakeRemote::default();
    remote.modify(|state| state.reject_reason = Some("tune is archived".to_owned()));
    let fixture = Fixture::start_seeded(remote.clone()).await?;

    let added = fixture.session.add_to_review(tune_ids(&[66])).await?;
    fixture.session.wait_for_idle().await?;

    assert_eq!(1, remote.posted().len());
    assert!(fixture.queued_tune_ids().await?.is_empty());
    let failed = fixture.session.failed_mutations().await?;
    assert_eq!(1, failed.len());
    assert_eq!(added.key, failed[0].key);
    assert!(
        failed[0]
            .failure_reason
            .as_deref()
            .is_some_and(|reason| reason.contains("tune is archived"))
    );

    remote.modify(|state| state.reject_reason = None);
    let retried = fixture.session.retry_failed(added.key).await?;
    assert_ne!(added.key, retried.key);
    assert_eq!(tune_ids(&[66]), fixture.queued_tune_ids().await?);
    fixture.session.wait_for_idle().await?;
    assert_eq!(tune_ids(&[66]), fixture.queued_tune_ids().await?);
    assert!(fixture.session.failed_mutations().await?.is_empty());
    fixture.teardown().await;
    Ok(())
}

#[test(tokio::test)]
async fn reject_invalid_selection_without_sending() -> TestResult<()> {
    let remote = FakeRemote::default();
    let fixture = Fixture::start_seeded(remote.clone()).await?;

    // Not in the repertoire
    assert!(fixture.session.add_to_review(tune_ids(&[1])).await.is_err());
    fixture.session.add_to_review(tune_ids(&[66])).await?;
    assert!(
        fixture
            .session
            .remove_from_repertoire(tune_ids(&[66]))
            .await
            .is_err()
    );
    fixture.session.wait_for_idle().await?;
    assert_eq!(1, remote.posted().len());

    fixture.session.complete_review(tune_ids(&[66])).await?;
    assert!(fixture.queued_tune_ids().await?.is_empty());
    fixture.session.remove_from_repertoire(tune_ids(&[66])).await?;
    fixture.session.wait_for_idle().await?;
    assert_eq!(3, remote.posted().len());
    assert_eq!(
        REPERTOIRE.len() - 1,
        fixture.session.get_repertoire().await?.len()
    );
    fixture.teardown().await;
    Ok(())
}

#[test(tokio::test)]
async fn genres_become_available_after_first_pull() -> TestResult<()> {
    let remote = FakeRemote::default();
    remote.modify(|state| {
        state.deltas = vec![
            Delta {
                revision_id: "r1".into(),
                change: DeltaChange::Upsert(Entity::Genre(new_genre(
                    "irish",
                    "Irish Traditional",
                ))),
            },
            Delta {
                revision_id: "r2".into(),
                change: DeltaChange::Upsert(Entity::Tune(new_tune(66))),
            },
        ];
    });
    let fixture = Fixture::start(Storage::InMemory, remote).await?;
    assert_eq!(
        GenreFacetsState::Loading,
        fixture.session.available_genres().await?.state
    );

    let synchronized = fixture.session.synchronize().await?;
    assert_eq!(2, synchronized.pulled.applied_count);

    let facets = fixture.session.available_genres().await?;
    assert_eq!(GenreFacetsState::Ready, facets.state);
    assert_eq!(vec![new_genre("irish", "Irish Traditional")], facets.genres);
    assert_eq!(
        1,
        fixture
            .session
            .get_catalog(Default::default(), None)
            .await?
            .len()
    );

    // Nothing new
    let synchronized = fixture.session.synchronize().await?;
    assert_eq!(0, synchronized.pulled.applied_count);
    fixture.teardown().await;
    Ok(())
}

#[test(tokio::test)]
async fn pull_on_request() -> TestResult<()> {
    let remote = FakeRemote::default();
    let fixture = Fixture::start(Storage::InMemory, remote).await?;

    fixture.session.request_pull();
    fixture.session.wait_for_idle().await?;
    assert_eq!(
        GenreFacetsState::Empty,
        fixture.session.available_genres().await?.state
    );
    fixture.teardown().await;
    Ok(())
}

#[test(tokio::test)]
async fn interrupted_record_is_resent_before_later_records() -> TestResult<()> {
    let remote = FakeRemote::default();
    let fixture = Fixture::start_seeded(remote.clone()).await?;
    fixture.session.wait_for_idle().await?;
    let db_gatekeeper = fixture.env.handle().db_gatekeeper();

    // Appended without requesting a drain
    let first = tunequeue_backend_embedded::mutation::append(
        db_gatekeeper,
        "u1".into(),
        MutationKind::AddToReview,
        tune_ids(&[66]).into_iter().collect(),
    )
    .await?
    .outcome
    .record;
    let second = tunequeue_backend_embedded::mutation::append(
        db_gatekeeper,
        "u1".into(),
        MutationKind::AddToReview,
        tune_ids(&[70]).into_iter().collect(),
    )
    .await?
    .outcome
    .record;
    // Left in flight after settling the previous attempt failed
    tunequeue_backend_embedded::mutation::mark_in_flight(db_gatekeeper, first.key).await?;

    let synchronized = fixture.session.synchronize().await?;
    assert_eq!(2, synchronized.drained.acknowledged_count);
    assert_eq!(vec![first.key, second.key], remote.posted());
    assert!(
        tunequeue_backend_embedded::mutation::load_unsettled_records(
            db_gatekeeper,
            "u1".into()
        )
        .await?
        .is_empty()
    );
    fixture.teardown().await;
    Ok(())
}

#[test(tokio::test)]
async fn first_pull_after_seeding_starts_without_cursor() -> TestResult<()> {
    let remote = FakeRemote::default();
    let fixture = Fixture::start_seeded(remote.clone()).await?;

    fixture.session.synchronize().await?;
    fixture.session.synchronize().await?;
    assert_eq!(
        vec![None, Some("0".to_owned())],
        remote.pulled_cursors()
    );
    fixture.teardown().await;
    Ok(())
}
