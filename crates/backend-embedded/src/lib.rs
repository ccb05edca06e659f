// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

pub mod catalog;
pub mod mutation;
pub mod projection;
pub mod seed;
pub mod storage;
pub mod sync;

pub type Error = tunequeue_usecases_sqlite::Error;
pub type Result<T> = std::result::Result<T, Error>;

pub use tunequeue_storage_sqlite::connection::pool::gatekeeper::Gatekeeper;
pub use tunequeue_usecases_sqlite::Committed;

pub mod prelude {
    pub use tunequeue_core::{TuneId, UserId};

    pub use super::{Committed, Error, Gatekeeper, Result};
}
