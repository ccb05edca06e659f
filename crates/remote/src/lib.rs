// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The remote source of record.
//!
//! Local mutations are posted one at a time, identified by their
//! idempotency key. Remote changes are pulled incrementally, starting
//! from an opaque cursor.

use std::future::Future;

use thiserror::Error;

use tunequeue_core::{DeltaBatch, MutationRecord, UserId};

pub mod json;

#[cfg(feature = "webapi")]
pub mod webapi;

#[derive(Error, Debug)]
pub enum RemoteError {
    /// The request might succeed when repeated later, e.g. after
    /// a timeout or a connection failure.
    #[error("transient failure: {0}")]
    Transient(anyhow::Error),

    /// The remote refused the request and will do so again.
    #[error("rejected: {reason}")]
    Rejected { reason: String },
}

impl RemoteError {
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    pub fn transient(err: impl Into<anyhow::Error>) -> Self {
        Self::Transient(err.into())
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Status codes that indicate a temporary unavailability.
///
/// All other unsuccessful responses are permanent rejections.
#[must_use]
pub const fn is_transient_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500..=599)
}

pub trait Remote: Send + Sync + 'static {
    /// Submit a local mutation.
    ///
    /// Succeeds if the remote acknowledged the mutation. Posting the
    /// same record repeatedly is harmless.
    fn post_mutation(
        &self,
        record: &MutationRecord,
    ) -> impl Future<Output = RemoteResult<()>> + Send;

    /// Fetch the changes of the remote since `cursor`.
    ///
    /// Starts from the beginning if no cursor is given.
    fn pull_deltas(
        &self,
        user_id: &UserId,
        cursor: Option<&str>,
    ) -> impl Future<Output = RemoteResult<DeltaBatch>> + Send;
}

#[cfg(test)]
mod tests;
