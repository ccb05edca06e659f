// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use discro::{Publisher, Ref, Subscriber};
use tokio::task::JoinHandle;

mod environment;
pub use self::environment::{Environment, Handle};

/// Cached read models
pub mod projection;

/// Per-user sessions
pub mod session;
pub use self::session::{AddedToReview, Session, Synchronized};

/// Settings management
pub mod settings;
pub use self::settings::Settings;

/// Background synchronization with the remote
pub mod sync;
pub use self::sync::{SyncState, SyncStatus};

pub type ObservableRef<'a, T> = Ref<'a, T>;

/// Manages the mutable, observable state
#[derive(Debug, Default)]
pub struct Observable<T> {
    publisher: Publisher<T>,
}

impl<T> Observable<T> {
    #[must_use]
    pub fn new(initial_value: T) -> Self {
        let publisher = Publisher::new(initial_value);
        Self { publisher }
    }

    #[must_use]
    pub fn read(&self) -> ObservableRef<'_, T> {
        self.publisher.read()
    }

    #[must_use]
    pub fn subscribe_changed(&self) -> Subscriber<T> {
        self.publisher.subscribe_changed()
    }

    #[allow(clippy::must_use_candidate)]
    pub fn modify(&self, modify: impl FnOnce(&mut T) -> bool) -> bool {
        self.publisher.modify(modify)
    }
}

#[derive(Debug)]
pub enum JoinedTask<T> {
    Completed(T),
    Cancelled,
    Panicked(anyhow::Error),
}

impl<T> JoinedTask<T> {
    pub async fn join(handle: JoinHandle<T>) -> Self {
        match handle.await {
            Ok(output) => Self::Completed(output),
            Err(err) => {
                if err.is_cancelled() {
                    Self::Cancelled
                } else {
                    debug_assert!(err.is_panic());
                    Self::Panicked(err.into())
                }
            }
        }
    }
}
