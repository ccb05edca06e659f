// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::num::NonZeroU32;

use diesel::{
    Connection as _, QueryResult, SqliteConnection,
    r2d2::{self, CustomizeConnection},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Result;

use super::Storage;

pub type ConnectionManager = r2d2::ConnectionManager<SqliteConnection>;

pub type ConnectionPool = r2d2::Pool<ConnectionManager>;

pub type PooledConnection = r2d2::PooledConnection<ConnectionManager>;

#[cfg(feature = "tokio")]
pub mod gatekeeper;

/// Prepares each new connection before it is handed out by the pool.
///
/// Per-connection pragmas like `foreign_keys` are not persistent
/// and must be applied whenever the pool opens a connection.
#[derive(Debug, Clone, Copy)]
pub struct InitConnection(pub fn(&mut SqliteConnection) -> QueryResult<()>);

impl CustomizeConnection<SqliteConnection, r2d2::Error> for InitConnection {
    fn on_acquire(&self, connection: &mut SqliteConnection) -> std::result::Result<(), r2d2::Error> {
        let Self(init) = self;
        init(connection).map_err(r2d2::Error::QueryError)
    }
}

pub fn create_connection_pool(
    storage: &Storage,
    max_size: NonZeroU32,
    init_connection: Option<InitConnection>,
) -> Result<ConnectionPool> {
    let connection_string = storage.connection_string();
    let mut builder = ConnectionPool::builder();
    if storage.is_in_memory() {
        // Each connection to an in-memory database opens a separate,
        // empty database. A single connection must be kept alive for
        // the whole lifetime of the pool.
        if max_size.get() > 1 {
            log::info!(
                "Limiting connection pool size from {max_size} to 1 for in-memory storage"
            );
        }
        builder = builder.max_size(1).idle_timeout(None).max_lifetime(None);
    } else {
        // Establish a test connection before creating the connection pool to fail early.
        // If the given file is inaccessible r2d2 would retry multiple times and log
        // errors instead of returning an error immediately.
        drop(SqliteConnection::establish(&connection_string)?);
        builder = builder.max_size(max_size.get());
    }
    if let Some(init_connection) = init_connection {
        builder = builder.connection_customizer(Box::new(init_connection));
    }
    let manager = ConnectionManager::new(connection_string);
    let pool = builder.build(manager)?;
    Ok(pool)
}

pub fn get_pooled_connection(pool: &ConnectionPool) -> Result<PooledConnection> {
    pool.get().map_err(Into::into)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Maximum number of concurrent readers.
    pub max_size: NonZeroU32,

    #[cfg(feature = "tokio")]
    pub gatekeeper: self::gatekeeper::Config,
}

pub const DEFAULT_MAX_SIZE: NonZeroU32 = NonZeroU32::new(8).unwrap();

impl Default for Config {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            #[cfg(feature = "tokio")]
            gatekeeper: Default::default(),
        }
    }
}

#[cfg(test)]
mod tests;
