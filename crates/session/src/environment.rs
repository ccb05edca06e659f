// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::sync::Arc;

use tunequeue_backend_embedded::{Gatekeeper, storage::DatabaseConfig};

#[allow(missing_debug_implementations)]
pub struct Environment {
    db_config: DatabaseConfig,
    handle: Handle,
}

impl Environment {
    /// Set up the runtime environment.
    ///
    /// Modifying the database configuration at runtime is not supported.
    pub fn commission(db_config: DatabaseConfig) -> anyhow::Result<Self> {
        log::info!("Commissioning runtime environment");
        let db_gatekeeper = tunequeue_backend_embedded::storage::commission_database(&db_config)?;
        let handle = Handle(Arc::new(db_gatekeeper));
        Ok(Self { db_config, handle })
    }

    /// Prepare for tear down.
    ///
    /// Rejects new database requests. Pending requests could still proceed
    /// until finished. A long-running seed is asked to abort.
    pub fn decommission(&self) {
        log::info!("Decommissioning runtime environment");
        let db_gatekeeper = self.handle.db_gatekeeper();
        db_gatekeeper.decommission();
        db_gatekeeper.abort_current_task();
    }

    #[must_use]
    pub fn db_config(&self) -> &DatabaseConfig {
        &self.db_config
    }

    /// Handle for invoking operations.
    #[must_use]
    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

/// A cheaply `Clone`able and `Send`able handle for invoking operations.
#[derive(Clone)]
#[allow(missing_debug_implementations)]
pub struct Handle(Arc<Gatekeeper>);

impl Handle {
    #[must_use]
    pub fn db_gatekeeper(&self) -> &Gatekeeper {
        &self.0
    }
}
