// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

// Importing all enum variants into a narrow, local scope is acceptable.
#![allow(clippy::enum_glob_use)]

use diesel::Connection as _;
use thiserror::Error;

use tunequeue_core::ChangeSet;
use tunequeue_repo::prelude::*;
use tunequeue_repo_sqlite::{
    DbConnection,
    prelude::{Connection as RepoConnection, DieselTransactionError},
};
use tunequeue_storage_sqlite::Error as StorageError;
use tunequeue_usecases as uc;

pub mod catalog;
pub mod database;
pub mod mutation;
pub mod projection;
pub mod seed;
pub mod sync;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Input(anyhow::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    DatabaseMigration(anyhow::Error),

    #[error(transparent)]
    Repository(#[from] RepoError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl<E> From<DieselTransactionError<E>> for Error
where
    E: Into<Error>,
{
    fn from(err: DieselTransactionError<E>) -> Self {
        err.into_inner().into()
    }
}

impl From<uc::Error> for Error {
    fn from(err: uc::Error) -> Self {
        use uc::Error::*;
        match err {
            Input(uc::InputError(err)) => Self::Input(err),
            Repository(err) => Self::Repository(err),
            Other(err) => Self::Other(err),
        }
    }
}

impl From<uc::InputError> for Error {
    fn from(err: uc::InputError) -> Self {
        let uc::InputError(err) = err;
        Self::Input(err)
    }
}

pub type TransactionError = DieselTransactionError<Error>;

impl From<Error> for TransactionError {
    fn from(err: Error) -> Self {
        Self::new(err)
    }
}

fn transaction_error<E>(err: E) -> TransactionError
where
    E: Into<Error>,
{
    TransactionError::from(err.into())
}

pub type Result<T> = std::result::Result<T, Error>;

/// The outcome of a committed write transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed<T> {
    pub outcome: T,

    /// Kinds of entities that have been modified.
    pub changes: ChangeSet,
}

impl<T> Committed<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Committed<U> {
        let Self { outcome, changes } = self;
        Committed {
            outcome: f(outcome),
            changes,
        }
    }
}

/// Run a use case within an exclusive transaction.
///
/// All writes are rolled back if the use case fails.
fn write_transaction<T, E>(
    connection: &mut DbConnection,
    op: impl FnOnce(&mut RepoConnection<'_>) -> std::result::Result<T, E>,
) -> Result<Committed<T>>
where
    E: Into<Error>,
{
    connection
        .immediate_transaction::<_, TransactionError, _>(|connection| {
            let mut repo = RepoConnection::new(connection);
            let outcome = op(&mut repo).map_err(transaction_error)?;
            let changes = repo.take_changes();
            Ok(Committed { outcome, changes })
        })
        .map_err(Into::into)
}

/// Run a use case within a read-only transaction.
fn read_transaction<T, E>(
    connection: &mut DbConnection,
    op: impl FnOnce(&mut RepoConnection<'_>) -> std::result::Result<T, E>,
) -> Result<T>
where
    E: Into<Error>,
{
    connection
        .transaction::<_, TransactionError, _>(|connection| {
            let mut repo = RepoConnection::new(connection);
            op(&mut repo).map_err(transaction_error)
        })
        .map_err(Into::into)
}
