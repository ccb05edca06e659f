// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tunequeue_core::util::clock::UtcDateTimeMs;

#[macro_use]
mod macros;

pub mod genre;
pub mod mutation;
pub mod quarantine;
pub mod queue;
pub mod repertoire;
pub mod store;
pub mod sync;
pub mod tune;

pub type RecordId = i64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordHeader<Id> {
    pub id: Id,
    pub created_at: UtcDateTimeMs,
    pub updated_at: UtcDateTimeMs,
}

pub mod prelude {
    use thiserror::Error;
    use tunequeue_core::ChangeSet;

    pub type PaginationOffset = u64;

    pub type PaginationLimit = u64;

    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct Pagination {
        pub limit: Option<PaginationLimit>,
        pub offset: Option<PaginationOffset>,
    }

    impl Pagination {
        #[must_use]
        pub const fn is_paginated(&self) -> bool {
            self.offset.is_some() || self.limit.is_some()
        }

        #[must_use]
        pub fn mandatory_limit(&self) -> PaginationLimit {
            self.limit.unwrap_or(PaginationLimit::MAX)
        }
    }

    /// A page of records that has been fetched in key order.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct KeysetPage<T, K> {
        pub records: Vec<T>,

        /// Key of the last row that has been examined, including
        /// corrupt rows that have been skipped.
        ///
        /// `None` if no more rows are available.
        pub last_key: Option<K>,
    }

    impl<T, K> KeysetPage<T, K> {
        #[must_use]
        pub const fn exhausted() -> Self {
            Self {
                records: Vec::new(),
                last_key: None,
            }
        }
    }

    pub trait RecordCollector {
        type Header;
        type Record;

        /// Collect a new element
        fn collect(&mut self, header: Self::Header, record: Self::Record);
    }

    impl<H, R> RecordCollector for Vec<(H, R)> {
        type Header = H;
        type Record = R;

        fn collect(&mut self, header: Self::Header, record: Self::Record) {
            self.push((header, record));
        }
    }

    pub trait ReservableRecordCollector: RecordCollector {
        /// Reserve additional capacity for new elements
        fn reserve(&mut self, additional: usize);
    }

    impl<H, R> ReservableRecordCollector for Vec<(H, R)> {
        fn reserve(&mut self, additional: usize) {
            Vec::reserve(self, additional);
        }
    }

    /// Accumulates the entity kinds that have been written.
    ///
    /// Every write through a repository records the affected kinds.
    /// The accumulated change set is handed over to the projections
    /// after the surrounding transaction has been committed.
    pub trait ChangeTracker {
        fn record_changes(&mut self, changes: ChangeSet);

        #[must_use]
        fn pending_changes(&self) -> ChangeSet;

        /// Reset and return the accumulated changes
        fn take_changes(&mut self) -> ChangeSet;
    }

    #[derive(Error, Debug)]
    pub enum RepoError {
        #[error("not found")]
        NotFound,

        #[error("conflict")]
        Conflict,

        #[error("invariant violated: {0}")]
        InvariantViolation(String),

        #[error("corrupt record {key}: {reason}")]
        CorruptRecord { key: String, reason: String },

        #[error("storage full")]
        StorageFull,

        #[error("aborted")]
        Aborted,

        #[error(transparent)]
        Other(#[from] anyhow::Error),
    }

    pub type RepoResult<T> = Result<T, RepoError>;

    pub trait OptionalRepoResult<T> {
        fn optional(self) -> RepoResult<Option<T>>;
    }

    impl<T> OptionalRepoResult<T> for Result<T, RepoError> {
        fn optional(self) -> RepoResult<Option<T>> {
            self.map_or_else(
                |err| {
                    if matches!(err, RepoError::NotFound) {
                        Ok(None)
                    } else {
                        Err(err)
                    }
                },
                |val| Ok(Some(val)),
            )
        }
    }
}
