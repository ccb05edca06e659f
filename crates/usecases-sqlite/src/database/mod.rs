// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tunequeue_core::util::clock::UtcDateTimeMs;
use tunequeue_repo::quarantine::{QuarantineRepo as _, QuarantinedRecord};
use tunequeue_repo_sqlite::run_migrations;

use super::*;

pub fn migrate_schema(connection: &mut DbConnection) -> Result<()> {
    for migration_version in run_migrations(connection)
        .map_err(|err| anyhow::anyhow!(err))
        .map_err(Error::DatabaseMigration)?
    {
        log::info!("Applied migration '{migration_version}'");
    }
    Ok(())
}

/// Move all rows that could not be decoded into the quarantine.
///
/// Returns the number of quarantined rows.
pub fn quarantine_corrupt_records(
    connection: &mut DbConnection,
    quarantined_at: UtcDateTimeMs,
) -> Result<Committed<usize>> {
    write_transaction(connection, |repo| {
        repo.quarantine_corrupt_records(quarantined_at)
    })
}

pub fn load_quarantined_records(connection: &mut DbConnection) -> Result<Vec<QuarantinedRecord>> {
    read_transaction(connection, |repo| repo.load_quarantined_records())
}
