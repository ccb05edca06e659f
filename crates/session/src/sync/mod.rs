// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Reconciliation of the mutation log and remote changes.
//!
//! The mutation log is drained strictly in order. A record that is
//! waiting for its next attempt blocks all subsequent records.

use std::{future::Future, time::Duration};

use tunequeue_backend_embedded::{mutation, sync::Outcome};
use tunequeue_core::{MutationRecord, MutationState, util::clock::UtcDateTimeMs};
use tunequeue_remote::{Remote, RemoteError, RemoteResult};

use crate::session::Shared;

pub(crate) mod tasklet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Draining,
    Pulling,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStatus {
    /// New mutation records have been appended.
    pub drain_requested: bool,

    pub draining: bool,

    pub pull_requested: bool,

    pub pulling: bool,
}

impl SyncStatus {
    /// Draining takes precedence over pulling.
    #[must_use]
    pub const fn state(&self) -> SyncState {
        if self.drain_requested || self.draining {
            SyncState::Draining
        } else if self.pull_requested || self.pulling {
            SyncState::Pulling
        } else {
            SyncState::Idle
        }
    }

    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self.state(), SyncState::Idle)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainOutcome {
    pub acknowledged_count: usize,

    pub retried_count: usize,

    pub failed_count: usize,
}

async fn with_timeout<T>(
    timeout: Duration,
    request: impl Future<Output = RemoteResult<T>>,
) -> RemoteResult<T> {
    tokio::time::timeout(timeout, request)
        .await
        .map_err(RemoteError::transient)
        .and_then(|result| result)
}

/// Send a single record that has just been marked as in flight.
async fn deliver<R: Remote>(
    shared: &Shared<R>,
    record: MutationRecord,
    outcome: &mut DrainOutcome,
) -> anyhow::Result<()> {
    let db_gatekeeper = shared.handle.db_gatekeeper();
    let settings = &shared.settings;
    let MutationRecord {
        key,
        kind,
        attempt_count,
        ..
    } = record;
    log::debug!("Sending mutation record {key} ({kind}), attempt #{attempt_count}");
    match with_timeout(
        settings.request_timeout(),
        shared.remote.post_mutation(&record),
    )
    .await
    {
        Ok(()) => {
            let settled = mutation::mark_acknowledged(db_gatekeeper, key).await?;
            log::info!("Mutation record {key} ({kind}) has been acknowledged");
            shared.projections.invalidate(settled.changes);
            outcome.acknowledged_count += 1;
        }
        Err(err) if err.is_transient() && !settings.backoff.is_exhausted(attempt_count) => {
            let delay = settings.backoff.delay(attempt_count);
            log::warn!("Resending mutation record {key} in {delay:?}: {err}");
            let next_attempt_at = UtcDateTimeMs::now().saturating_add_duration(delay);
            mutation::reschedule(db_gatekeeper, key, next_attempt_at, err.to_string()).await?;
            outcome.retried_count += 1;
        }
        Err(err) => {
            log::error!(
                "Mutation record {key} ({kind}) failed after {attempt_count} attempt(s): {err}"
            );
            let settled = mutation::mark_failed(db_gatekeeper, key, err.to_string()).await?;
            shared.projections.invalidate(settled.changes);
            outcome.failed_count += 1;
        }
    }
    Ok(())
}

async fn drain_unsettled_records<R: Remote>(shared: &Shared<R>) -> anyhow::Result<DrainOutcome> {
    let db_gatekeeper = shared.handle.db_gatekeeper();
    let mut outcome = DrainOutcome::default();
    loop {
        let Some(record) = mutation::load_unsettled_records(db_gatekeeper, shared.user_id.clone())
            .await?
            .into_iter()
            .next()
        else {
            return Ok(outcome);
        };
        if record.state == MutationState::InFlight {
            // Settling the previous attempt has failed
            log::warn!("Resending interrupted mutation record {key}", key = record.key);
        } else if let Some(next_attempt_at) = record.next_attempt_at {
            let delay = next_attempt_at.duration_since(UtcDateTimeMs::now());
            if !delay.is_zero() {
                log::debug!(
                    "Waiting {delay:?} before resending mutation record {key}",
                    key = record.key
                );
                tokio::time::sleep(delay).await;
            }
        }
        let record = mutation::mark_in_flight(db_gatekeeper, record.key).await?;
        deliver(shared, record, &mut outcome).await?;
    }
}

/// Send all unsettled mutation records.
///
/// Records that are still in flight after an interrupted cycle are
/// resent first. Only a single drain cycle runs at any time.
pub(crate) async fn run_drain_cycle<R: Remote>(
    shared: &Shared<R>,
) -> anyhow::Result<DrainOutcome> {
    let _drain_guard = shared.drain_lock.lock().await;
    shared.status.modify(|status| {
        // Requests that arrive from now on need another cycle
        status.drain_requested = false;
        status.draining = true;
        true
    });
    let result = drain_unsettled_records(shared).await;
    shared.status.modify(|status| {
        status.draining = false;
        true
    });
    let outcome = result?;
    if outcome != DrainOutcome::default() {
        log::info!("Drained mutation log: {outcome:?}");
    }
    Ok(outcome)
}

/// Fetch and apply remote changes since the last pull.
///
/// Only a single pull cycle runs at any time.
pub(crate) async fn run_pull_cycle<R: Remote>(shared: &Shared<R>) -> anyhow::Result<Outcome> {
    let _pull_guard = shared.pull_lock.lock().await;
    shared.status.modify(|status| {
        status.pull_requested = false;
        status.pulling = true;
        true
    });
    let result = pull_remote_changes(shared).await;
    shared.status.modify(|status| {
        status.pulling = false;
        true
    });
    result
}

async fn pull_remote_changes<R: Remote>(shared: &Shared<R>) -> anyhow::Result<Outcome> {
    let db_gatekeeper = shared.handle.db_gatekeeper();
    let user_id = &shared.user_id;
    let cursor =
        tunequeue_backend_embedded::sync::load_cursor(db_gatekeeper, user_id.clone()).await?;
    log::debug!("Pulling remote changes since {cursor:?}");
    let batch = with_timeout(
        shared.settings.request_timeout(),
        shared.remote.pull_deltas(user_id, cursor.as_deref()),
    )
    .await?;
    let committed =
        tunequeue_backend_embedded::sync::apply_delta_batch(db_gatekeeper, user_id.clone(), batch)
            .await?;
    shared.projections.invalidate_synchronized(committed.changes);
    log::info!("Pulled remote changes: {outcome:?}", outcome = committed.outcome);
    Ok(committed.outcome)
}
