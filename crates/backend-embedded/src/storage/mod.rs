// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use tunequeue_core::util::clock::UtcDateTimeMs;
use tunequeue_repo::quarantine::QuarantinedRecord;
use tunequeue_storage_sqlite::connection::{
    Config as ConnectionConfig,
    pool::{InitConnection, create_connection_pool, gatekeeper::Gatekeeper, get_pooled_connection},
};

use crate::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DatabaseConfig {
    pub connection: ConnectionConfig,
    pub migrate_schema: bool,
}

pub fn commission_database(config: &DatabaseConfig) -> anyhow::Result<Gatekeeper> {
    // The maximum size of the pool defines the maximum number of
    // allowed readers while writers require exclusive access.
    log::info!(
        "Creating SQLite connection pool of max. size {max_size} for {storage}",
        max_size = config.connection.pool.max_size,
        storage = config.connection.storage,
    );
    let connection_pool = create_connection_pool(
        &config.connection.storage,
        config.connection.pool.max_size,
        Some(InitConnection(tunequeue_repo_sqlite::configure_connection)),
    )?;

    log::info!("Initializing database");
    tunequeue_repo_sqlite::initialize_database(&mut *get_pooled_connection(&connection_pool)?)?;

    if config.migrate_schema {
        log::info!("Migrating database schema");
        tunequeue_usecases_sqlite::database::migrate_schema(&mut *get_pooled_connection(
            &connection_pool,
        )?)?;
    }

    let quarantined_count = tunequeue_usecases_sqlite::database::quarantine_corrupt_records(
        &mut *get_pooled_connection(&connection_pool)?,
        UtcDateTimeMs::now(),
    )?
    .outcome;
    if quarantined_count > 0 {
        log::warn!("Quarantined {quarantined_count} corrupt record(s)");
    }

    let gatekeeper = Gatekeeper::new(connection_pool, config.connection.pool.gatekeeper);

    Ok(gatekeeper)
}

pub async fn load_quarantined_records(
    db_gatekeeper: &Gatekeeper,
) -> Result<Vec<QuarantinedRecord>> {
    db_gatekeeper
        .spawn_blocking_read_task(move |mut pooled_connection, _abort_flag| {
            let connection = &mut *pooled_connection;
            tunequeue_usecases_sqlite::database::load_quarantined_records(connection)
        })
        .await
        .map_err(Into::into)
        .unwrap_or_else(Err)
}
