// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{collections::BTreeSet, sync::Arc};

use discro::Subscriber;
use tokio::{
    sync::{Mutex, Notify},
    task::JoinHandle,
};

use tunequeue_backend_embedded::{
    mutation::{self, Appended},
    projection::GenreFacets,
    seed::SeedData,
    sync::Outcome,
};
use tunequeue_core::{
    IdempotencyKey, MutationKind, MutationRecord, PracticeQueue, RepertoireEntry, Tune, TuneId,
    UserId, util::clock::UtcDateTimeMs,
};
use tunequeue_remote::Remote;
use tunequeue_repo::{prelude::Pagination, tune::CatalogFilter};

use crate::{
    Handle, JoinedTask, Observable, projection::Projections, settings::SyncSettings,
    sync::{self, DrainOutcome, SyncState, SyncStatus},
};

/// State that is shared with the background tasks.
pub(crate) struct Shared<R> {
    pub(crate) handle: Handle,
    pub(crate) remote: R,
    pub(crate) user_id: UserId,
    pub(crate) settings: SyncSettings,
    pub(crate) status: Observable<SyncStatus>,
    pub(crate) projections: Projections,
    pub(crate) drain_notify: Notify,
    pub(crate) pull_notify: Notify,
    pub(crate) drain_lock: Mutex<()>,
    pub(crate) pull_lock: Mutex<()>,
}

impl<R> Shared<R> {
    fn request_drain(&self) {
        self.status.modify(|status| {
            if status.drain_requested {
                return false;
            }
            status.drain_requested = true;
            true
        });
        self.drain_notify.notify_one();
    }

    fn request_pull(&self) {
        self.status.modify(|status| {
            if status.pull_requested {
                return false;
            }
            status.pull_requested = true;
            true
        });
        self.pull_notify.notify_one();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddedToReview {
    pub key: IdempotencyKey,

    /// Number of selected tunes that are under review now.
    pub added_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synchronized {
    pub drained: DrainOutcome,

    pub pulled: Outcome,
}

/// The session of a single user.
///
/// Local changes are visible immediately and are sent to the remote
/// in the background. Aborts all background tasks when dropped.
#[allow(missing_debug_implementations)]
pub struct Session<R> {
    shared: Arc<Shared<R>>,
    tasks: Vec<JoinHandle<()>>,
}

impl<R> Session<R>
where
    R: Remote,
{
    /// Start a new session and its background tasks.
    ///
    /// Mutation records that have been interrupted while in flight
    /// are sent again.
    pub async fn start(
        handle: Handle,
        remote: R,
        user_id: UserId,
        settings: SyncSettings,
    ) -> anyhow::Result<Self> {
        log::info!("Starting session of user {user_id}");
        let reset_count =
            mutation::reset_in_flight(handle.db_gatekeeper(), user_id.clone()).await?;
        if reset_count > 0 {
            log::info!("Resending {reset_count} interrupted mutation record(s)");
        }
        let shared = Arc::new(Shared {
            handle,
            remote,
            user_id,
            settings,
            status: Default::default(),
            projections: Default::default(),
            drain_notify: Notify::new(),
            pull_notify: Notify::new(),
            drain_lock: Mutex::new(()),
            pull_lock: Mutex::new(()),
        });
        let tasks = vec![
            tokio::spawn(sync::tasklet::drain_mutation_log(Arc::clone(&shared))),
            tokio::spawn(sync::tasklet::pull_remote_changes(Arc::clone(&shared))),
        ];
        // Pick up records that are left over from a previous session
        shared.request_drain();
        Ok(Self { shared, tasks })
    }

    /// Abort all background tasks.
    ///
    /// Unsettled mutation records are resent by the next session.
    pub async fn teardown(mut self) {
        log::info!("Tearing down session of user {}", self.shared.user_id);
        for task in self.tasks.drain(..) {
            task.abort();
            if let JoinedTask::Panicked(err) = JoinedTask::join(task).await {
                log::error!("Background task panicked: {err}");
            }
        }
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.shared.user_id
    }

    #[must_use]
    pub fn remote(&self) -> &R {
        &self.shared.remote
    }

    #[must_use]
    pub fn projections(&self) -> &Projections {
        &self.shared.projections
    }

    pub async fn get_catalog(
        &self,
        filter: CatalogFilter,
        pagination: Option<Pagination>,
    ) -> anyhow::Result<Vec<Tune>> {
        tunequeue_backend_embedded::catalog::load_catalog(
            self.shared.handle.db_gatekeeper(),
            filter,
            pagination,
        )
        .await
        .map_err(Into::into)
    }

    pub async fn get_repertoire(&self) -> anyhow::Result<Vec<RepertoireEntry>> {
        tunequeue_backend_embedded::catalog::load_repertoire(
            self.shared.handle.db_gatekeeper(),
            self.shared.user_id.clone(),
        )
        .await
        .map_err(Into::into)
    }

    pub async fn get_practice_queue(&self, as_of: UtcDateTimeMs) -> anyhow::Result<PracticeQueue> {
        let Shared {
            handle,
            user_id,
            projections,
            ..
        } = &*self.shared;
        projections.practice_queue(handle, user_id, as_of).await
    }

    pub async fn available_genres(&self) -> anyhow::Result<GenreFacets> {
        let Shared {
            handle,
            user_id,
            projections,
            ..
        } = &*self.shared;
        projections.genre_facets(handle, user_id).await
    }

    /// Append a new mutation record and apply it locally.
    ///
    /// The record is sent to the remote in the background.
    pub async fn append_mutation(
        &self,
        kind: MutationKind,
        tune_ids: impl IntoIterator<Item = TuneId>,
    ) -> anyhow::Result<Appended> {
        let targets = tune_ids.into_iter().collect::<BTreeSet<_>>();
        let committed = mutation::append(
            self.shared.handle.db_gatekeeper(),
            self.shared.user_id.clone(),
            kind,
            targets,
        )
        .await?;
        log::debug!(
            "Appended mutation record {key} ({kind})",
            key = committed.outcome.record.key
        );
        self.shared.projections.invalidate(committed.changes);
        self.shared.request_drain();
        Ok(committed.outcome)
    }

    /// Put the selected tunes of the repertoire under review.
    pub async fn add_to_review(
        &self,
        tune_ids: impl IntoIterator<Item = TuneId>,
    ) -> anyhow::Result<AddedToReview> {
        let Appended {
            record,
            affected_count,
            ..
        } = self
            .append_mutation(MutationKind::AddToReview, tune_ids)
            .await?;
        Ok(AddedToReview {
            key: record.key,
            added_count: affected_count,
        })
    }

    pub async fn remove_from_review(
        &self,
        tune_ids: impl IntoIterator<Item = TuneId>,
    ) -> anyhow::Result<MutationRecord> {
        self.append_mutation(MutationKind::RemoveFromReview, tune_ids)
            .await
            .map(|appended| appended.record)
    }

    pub async fn complete_review(
        &self,
        tune_ids: impl IntoIterator<Item = TuneId>,
    ) -> anyhow::Result<MutationRecord> {
        self.append_mutation(MutationKind::CompleteReview, tune_ids)
            .await
            .map(|appended| appended.record)
    }

    pub async fn add_to_repertoire(
        &self,
        tune_ids: impl IntoIterator<Item = TuneId>,
    ) -> anyhow::Result<MutationRecord> {
        self.append_mutation(MutationKind::AddToRepertoire, tune_ids)
            .await
            .map(|appended| appended.record)
    }

    /// Tunes that are under review must be removed from review first.
    pub async fn remove_from_repertoire(
        &self,
        tune_ids: impl IntoIterator<Item = TuneId>,
    ) -> anyhow::Result<MutationRecord> {
        self.append_mutation(MutationKind::RemoveFromRepertoire, tune_ids)
            .await
            .map(|appended| appended.record)
    }

    /// Mutation records that have been rejected or could not be
    /// delivered.
    pub async fn failed_mutations(&self) -> anyhow::Result<Vec<MutationRecord>> {
        mutation::load_failed_records(
            self.shared.handle.db_gatekeeper(),
            self.shared.user_id.clone(),
        )
        .await
        .map_err(Into::into)
    }

    /// Repeat a failed mutation with a new record.
    pub async fn retry_failed(&self, key: IdempotencyKey) -> anyhow::Result<MutationRecord> {
        let committed = mutation::retry_failed(
            self.shared.handle.db_gatekeeper(),
            self.shared.user_id.clone(),
            key,
        )
        .await?;
        self.shared.projections.invalidate(committed.changes);
        self.shared.request_drain();
        Ok(committed.outcome.record)
    }

    pub async fn dismiss_failed(&self, key: IdempotencyKey) -> anyhow::Result<MutationRecord> {
        mutation::dismiss_failed(
            self.shared.handle.db_gatekeeper(),
            self.shared.user_id.clone(),
            key,
        )
        .await
        .map_err(Into::into)
    }

    #[must_use]
    pub fn sync_state(&self) -> SyncState {
        self.shared.status.read().state()
    }

    #[must_use]
    pub fn subscribe_sync_status_changed(&self) -> Subscriber<SyncStatus> {
        self.shared.status.subscribe_changed()
    }

    /// Wait until all pending synchronization requests have been
    /// processed.
    pub async fn wait_for_idle(&self) -> anyhow::Result<()> {
        let mut subscriber = self.shared.status.subscribe_changed();
        loop {
            if subscriber.read_ack().is_idle() {
                return Ok(());
            }
            subscriber
                .changed()
                .await
                .map_err(|_| anyhow::anyhow!("session has been torn down"))?;
        }
    }

    /// Request to pull remote changes in the background.
    pub fn request_pull(&self) {
        self.shared.request_pull();
    }

    /// Send all unsettled mutation records and pull remote changes
    /// afterwards.
    pub async fn synchronize(&self) -> anyhow::Result<Synchronized> {
        let drained = sync::run_drain_cycle(&self.shared).await?;
        let pulled = sync::run_pull_cycle(&self.shared).await?;
        Ok(Synchronized { drained, pulled })
    }

    /// Replace all local data, bypassing synchronization.
    ///
    /// Only intended for tests and demos.
    pub async fn seed(&self, seed: SeedData, mark_synced: bool) -> anyhow::Result<()> {
        log::info!("Seeding local store of user {}", self.shared.user_id);
        tunequeue_backend_embedded::seed::reset_and_seed(
            self.shared.handle.db_gatekeeper(),
            self.shared.user_id.clone(),
            seed,
            mark_synced,
        )
        .await?;
        self.shared.projections.invalidate_all();
        Ok(())
    }
}

impl<R> Drop for Session<R> {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests;
