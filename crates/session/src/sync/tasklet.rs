// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{future::Future, sync::Arc};

use tokio::time::{Instant, MissedTickBehavior};

use tunequeue_remote::Remote;

use super::{run_drain_cycle, run_pull_cycle};
use crate::session::Shared;

/// Drain the mutation log when requested or periodically.
///
/// Runs until aborted.
pub(crate) fn drain_mutation_log<R: Remote>(
    shared: Arc<Shared<R>>,
) -> impl Future<Output = ()> + Send + 'static {
    async move {
        log::debug!("Starting drain_mutation_log");
        let poll_interval = shared.settings.drain_poll_interval();
        loop {
            tokio::select! {
                () = shared.drain_notify.notified() => (),
                () = tokio::time::sleep(poll_interval) => (),
            }
            if let Err(err) = run_drain_cycle(&shared).await {
                log::warn!("Failed to drain mutation log: {err:#}");
            }
        }
    }
}

/// Pull remote changes when requested or periodically.
///
/// Runs until aborted.
pub(crate) fn pull_remote_changes<R: Remote>(
    shared: Arc<Shared<R>>,
) -> impl Future<Output = ()> + Send + 'static {
    async move {
        log::debug!("Starting pull_remote_changes");
        let period = shared.settings.pull_interval();
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                () = shared.pull_notify.notified() => (),
                _ = interval.tick() => (),
            }
            if let Err(err) = run_pull_cycle(&shared).await {
                log::warn!("Failed to pull remote changes: {err:#}");
            }
        }
    }
}
