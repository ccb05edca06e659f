// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Local-first practice queue with remote synchronization.
//!
//! Re-exports the sub-crates of the workspace, selected by features.

pub use tunequeue_core as core;

#[cfg(feature = "repo")]
pub use tunequeue_repo as repo;

#[cfg(feature = "usecases")]
pub use tunequeue_usecases as usecases;

#[cfg(feature = "sqlite")]
pub mod sqlite {
    pub use tunequeue_repo_sqlite as repo;
    pub use tunequeue_storage_sqlite as storage;
    pub use tunequeue_usecases_sqlite as usecases;
}

#[cfg(feature = "backend-embedded")]
pub use tunequeue_backend_embedded as backend_embedded;

#[cfg(feature = "remote")]
pub use tunequeue_remote as remote;

#[cfg(feature = "session")]
pub use tunequeue_session as session;
