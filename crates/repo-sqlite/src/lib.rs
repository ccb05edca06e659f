// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

// Using wildcard imports consciously is acceptable.
#![allow(clippy::wildcard_imports)]
// Importing all enum variants into a narrow, local scope is acceptable.
#![allow(clippy::enum_glob_use)]
// Suppress warnings for diesel AsChangeset
#![allow(clippy::ref_option_ref)]

use diesel::{
    QueryResult,
    connection::SimpleConnection as _,
    migration::{MigrationVersion, Result as MigrationResult},
};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness as _, embed_migrations};

pub type DbBackend = diesel::sqlite::Sqlite;
pub type DbConnection = diesel::sqlite::SqliteConnection;

pub mod prelude {
    pub(crate) use diesel::{prelude::*, result::Error as DieselError};
    use std::ops::{Deref, DerefMut};
    pub(crate) use tunequeue_core::{ChangeSet, util::clock::*};
    pub(crate) use tunequeue_repo::prelude::*;

    pub(crate) use crate::util::*;

    pub use crate::{DbBackend, DbConnection};

    pub use diesel::Connection as _;

    /// A database connection that records the changes of all
    /// writes.
    #[allow(missing_debug_implementations)]
    pub struct Connection<'db> {
        db: &'db mut DbConnection,
        changes: ChangeSet,
    }

    impl<'db> Connection<'db> {
        pub fn new(db: &'db mut DbConnection) -> Self {
            Self {
                db,
                changes: ChangeSet::empty(),
            }
        }
    }

    impl<'db> From<&'db mut DbConnection> for Connection<'db> {
        fn from(db: &'db mut DbConnection) -> Self {
            Self::new(db)
        }
    }

    impl AsRef<DbConnection> for Connection<'_> {
        fn as_ref(&self) -> &DbConnection {
            self.db
        }
    }

    impl AsMut<DbConnection> for Connection<'_> {
        fn as_mut(&mut self) -> &mut DbConnection {
            self.db
        }
    }

    impl Deref for Connection<'_> {
        type Target = DbConnection;

        fn deref(&self) -> &Self::Target {
            self.as_ref()
        }
    }

    impl DerefMut for Connection<'_> {
        fn deref_mut(&mut self) -> &mut Self::Target {
            self.as_mut()
        }
    }

    impl ChangeTracker for Connection<'_> {
        fn record_changes(&mut self, changes: ChangeSet) {
            self.changes |= changes;
        }

        fn pending_changes(&self) -> ChangeSet {
            self.changes
        }

        fn take_changes(&mut self) -> ChangeSet {
            std::mem::take(&mut self.changes)
        }
    }

    const SQLITE_FULL_MESSAGE: &str = "database or disk is full";

    pub(crate) fn repo_error(err: DieselError) -> RepoError {
        use diesel::result::DatabaseErrorKind;
        use DieselError::*;
        match err {
            NotFound => RepoError::NotFound,
            DatabaseError(DatabaseErrorKind::UniqueViolation, _) => RepoError::Conflict,
            DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                RepoError::InvariantViolation(info.message().to_owned())
            }
            DatabaseError(_, info) if info.message().contains(SQLITE_FULL_MESSAGE) => {
                RepoError::StorageFull
            }
            err => anyhow::Error::from(err).into(),
        }
    }

    #[derive(Debug)]
    pub struct DieselTransactionError<E>(E);

    impl<E> DieselTransactionError<E> {
        pub const fn new(inner: E) -> Self {
            Self(inner)
        }

        pub fn into_inner(self) -> E {
            let Self(inner) = self;
            inner
        }
    }

    impl<E> From<DieselError> for DieselTransactionError<E>
    where
        E: From<RepoError>,
    {
        fn from(err: DieselError) -> Self {
            Self(repo_error(err).into())
        }
    }

    impl<E> From<RepoError> for DieselTransactionError<E>
    where
        E: From<RepoError>,
    {
        fn from(err: RepoError) -> Self {
            Self(err.into())
        }
    }

    pub(crate) use tunequeue_repo::RecordId as RowId;

}

pub mod repo;

mod db;
mod util;

use prelude::Connection;

/// Configure the database engine
///
/// The implementation of the repositories and use cases relies on a proper
/// configuration of the database engine, e.g. on cascading deletes.
///
/// Some values like the text encoding can only be changed once after the
/// database has initially been created.
pub fn initialize_database(connection: &mut DbConnection) -> QueryResult<()> {
    connection.batch_execute(
        r"
PRAGMA journal_mode = WAL;        -- better write-concurrency
PRAGMA synchronous = NORMAL;      -- fsync only in critical moments, safe for journal_mode = WAL
PRAGMA wal_autocheckpoint = 1000; -- write WAL changes back every 1000 pages (default)
PRAGMA wal_checkpoint(TRUNCATE);  -- free some space by truncating possibly massive WAL files from the last run
PRAGMA secure_delete = 0;         -- avoid some disk I/O
PRAGMA automatic_index = 1;       -- detect and log missing indexes
PRAGMA encoding = 'UTF-8';
",
    )?;
    configure_connection(connection)
}

/// Configure a single connection
///
/// Unlike the settings applied by [`initialize_database()`] these
/// settings are not persistent and must be applied to each new
/// connection, e.g. when acquired from a connection pool.
pub fn configure_connection(connection: &mut DbConnection) -> QueryResult<()> {
    connection.batch_execute(
        r"
PRAGMA foreign_keys = 1;          -- check foreign key constraints
PRAGMA recursive_triggers = 1;    -- for recursive ON CASCADE DELETE actions
PRAGMA busy_timeout = 5000;       -- wait for locks held by other processes
",
    )
}

const EMBEDDED_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub fn run_migrations(connection: &mut DbConnection) -> MigrationResult<Vec<MigrationVersion<'_>>> {
    connection.run_pending_migrations(EMBEDDED_MIGRATIONS)
}
