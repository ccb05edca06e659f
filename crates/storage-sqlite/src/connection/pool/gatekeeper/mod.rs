// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{
    num::NonZeroU64,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use tokio::{sync::RwLock, task::spawn_blocking, time::timeout};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

use super::{ConnectionPool, PooledConnection, get_pooled_connection};

/// Serializes database access of asynchronous tasks.
///
/// Only a single writer is allowed to access the `SQLite` database at
/// any given time, while multiple readers may run concurrently. Readers
/// never observe uncommitted writes.
///
/// All connection handlers are executed on blocking worker threads.
#[allow(missing_debug_implementations)]
pub struct Gatekeeper {
    connection_pool: RwLock<ConnectionPool>,
    acquire_read_timeout: Duration,
    acquire_write_timeout: Duration,
    pending_requests: Arc<PendingRequests>,
    abort_current_task_flag: Arc<AtomicBool>,
    decommissioned: AtomicBool,
}

#[derive(Debug, Default)]
struct PendingRequests {
    read: AtomicUsize,
    write: AtomicUsize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AccessMode {
    Read,
    Write,
}

impl AccessMode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

/// Counts a pending request until dropped.
struct PendingRequestScope {
    pending_requests: Arc<PendingRequests>,
    mode: AccessMode,
}

impl PendingRequestScope {
    fn counter(pending_requests: &PendingRequests, mode: AccessMode) -> &AtomicUsize {
        match mode {
            AccessMode::Read => &pending_requests.read,
            AccessMode::Write => &pending_requests.write,
        }
    }

    fn enter(pending_requests: Arc<PendingRequests>, mode: AccessMode) -> Self {
        let before = Self::counter(&pending_requests, mode).fetch_add(1, Ordering::Relaxed);
        log::debug!(
            "Starting {mode} request: {count} pending {mode} request(s)",
            mode = mode.as_str(),
            count = before + 1,
        );
        Self {
            pending_requests,
            mode,
        }
    }
}

impl Drop for PendingRequestScope {
    fn drop(&mut self) {
        let before =
            Self::counter(&self.pending_requests, self.mode).fetch_sub(1, Ordering::Relaxed);
        debug_assert!(before > 0);
        log::debug!(
            "Finished {mode} request: {count} pending {mode} request(s)",
            mode = self.mode.as_str(),
            count = before - 1,
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PendingTasks {
    pub read: usize,
    pub write: usize,
}

impl Gatekeeper {
    #[must_use]
    pub fn new(connection_pool: ConnectionPool, config: Config) -> Self {
        let Config {
            acquire_read_timeout_millis,
            acquire_write_timeout_millis,
        } = config;
        Self {
            connection_pool: RwLock::new(connection_pool),
            acquire_read_timeout: Duration::from_millis(acquire_read_timeout_millis.get()),
            acquire_write_timeout: Duration::from_millis(acquire_write_timeout_millis.get()),
            pending_requests: Default::default(),
            abort_current_task_flag: Default::default(),
            decommissioned: AtomicBool::new(false),
        }
    }

    /// Reject all subsequent requests.
    ///
    /// Tasks that are already running are not affected.
    pub fn decommission(&self) {
        log::info!("Decommissioning database gatekeeper");
        self.decommissioned.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_decommissioned(&self) -> bool {
        self.decommissioned.load(Ordering::Acquire)
    }

    fn check_not_decommissioned(&self) -> Result<()> {
        if self.is_decommissioned() {
            return Err(Error::Decommissioned);
        }
        Ok(())
    }

    fn acquire_timeout_error() -> Error {
        Error::TaskTimeout {
            reason: "database is locked".to_owned(),
        }
    }

    fn prepare_task(&self) -> Arc<AtomicBool> {
        let abort_current_task_flag = Arc::clone(&self.abort_current_task_flag);
        // Every task gets the chance to run when ready
        abort_current_task_flag.store(false, Ordering::Release);
        abort_current_task_flag
    }

    pub async fn spawn_blocking_read_task<H, R>(&self, connection_handler: H) -> Result<R>
    where
        H: FnOnce(PooledConnection, Arc<AtomicBool>) -> R + Send + 'static,
        R: Send + 'static,
    {
        self.check_not_decommissioned()?;
        let _pending_request =
            PendingRequestScope::enter(Arc::clone(&self.pending_requests), AccessMode::Read);
        let guard = timeout(self.acquire_read_timeout, self.connection_pool.read())
            .await
            .map_err(|_| Self::acquire_timeout_error())?;
        self.check_not_decommissioned()?;
        let abort_current_task_flag = self.prepare_task();
        // The guard is held until the task has finished
        run_blocking_task(
            ConnectionPool::clone(&guard),
            abort_current_task_flag,
            connection_handler,
        )
        .await
    }

    pub async fn spawn_blocking_write_task<H, R>(&self, connection_handler: H) -> Result<R>
    where
        H: FnOnce(PooledConnection, Arc<AtomicBool>) -> R + Send + 'static,
        R: Send + 'static,
    {
        self.check_not_decommissioned()?;
        let _pending_request =
            PendingRequestScope::enter(Arc::clone(&self.pending_requests), AccessMode::Write);
        let guard = timeout(self.acquire_write_timeout, self.connection_pool.write())
            .await
            .map_err(|_| Self::acquire_timeout_error())?;
        self.check_not_decommissioned()?;
        let abort_current_task_flag = self.prepare_task();
        // The guard is held until the task has finished
        run_blocking_task(
            ConnectionPool::clone(&guard),
            abort_current_task_flag,
            connection_handler,
        )
        .await
    }

    #[must_use]
    pub fn pending_tasks(&self) -> PendingTasks {
        PendingTasks {
            read: self.pending_requests.read.load(Ordering::Relaxed),
            write: self.pending_requests.write.load(Ordering::Relaxed),
        }
    }

    /// Ask the currently running task to stop early.
    ///
    /// Long-running tasks are supposed to check the flag that is passed
    /// to their connection handler periodically.
    pub fn abort_current_task(&self) {
        self.abort_current_task_flag.store(true, Ordering::Release);
    }
}

async fn run_blocking_task<H, R>(
    connection_pool: ConnectionPool,
    abort_current_task_flag: Arc<AtomicBool>,
    connection_handler: H,
) -> Result<R>
where
    H: FnOnce(PooledConnection, Arc<AtomicBool>) -> R + Send + 'static,
    R: Send + 'static,
{
    // Obtaining a pooled connection blocks while all connections
    // are occupied by concurrent readers.
    spawn_blocking(move || {
        let connection = get_pooled_connection(&connection_pool)?;
        Ok(connection_handler(connection, abort_current_task_flag))
    })
    .await?
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    pub acquire_read_timeout_millis: NonZeroU64,
    pub acquire_write_timeout_millis: NonZeroU64,
}

pub const DEFAULT_ACQUIRE_READ_TIMEOUT_MILLIS: NonZeroU64 = NonZeroU64::new(10_000).unwrap();

pub const DEFAULT_ACQUIRE_WRITE_TIMEOUT_MILLIS: NonZeroU64 = NonZeroU64::new(30_000).unwrap();

impl Default for Config {
    fn default() -> Self {
        Self {
            acquire_read_timeout_millis: DEFAULT_ACQUIRE_READ_TIMEOUT_MILLIS,
            acquire_write_timeout_millis: DEFAULT_ACQUIRE_WRITE_TIMEOUT_MILLIS,
        }
    }
}
