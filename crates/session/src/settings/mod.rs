// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{
    fs,
    num::{NonZeroU32, NonZeroU64},
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use url::Url;

use tunequeue_backend_embedded::storage::DatabaseConfig;
use tunequeue_storage_sqlite::connection::{
    Config as ConnectionConfig, Storage, pool::Config as PoolConfig,
};

pub const FILE_NAME: &str = "tunequeue_settings";

pub const FILE_SUFFIX: &str = "ron";

pub const DEFAULT_DATABASE_FILE_NAME: &str = "tunequeue";

pub const DEFAULT_DATABASE_FILE_SUFFIX: &str = "sqlite";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseSettings,

    pub sync: SyncSettings,
}

impl Settings {
    /// Load the settings from the given directory.
    ///
    /// Returns the defaults if no settings have been saved yet.
    pub fn load(parent_dir: &Path) -> anyhow::Result<Self> {
        let file_path = new_settings_file_path(parent_dir.to_path_buf());
        log::info!("Loading settings from file: {}", file_path.display());
        match fs::read(&file_path) {
            Ok(bytes) => ron::de::from_bytes(&bytes).map_err(Into::into),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Default::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, parent_dir: &Path) -> anyhow::Result<()> {
        let file_path = new_settings_file_path(parent_dir.to_path_buf());
        log::info!("Saving current settings into file: {}", file_path.display());
        let text = ron::ser::to_string_pretty(self, Default::default())?;
        if let Some(parent_path) = file_path.parent() {
            fs::create_dir_all(parent_path)?;
        }
        fs::write(&file_path, text)?;
        Ok(())
    }

    /// The database configuration.
    ///
    /// Without an explicitly configured storage the database file
    /// is placed into `parent_dir`.
    #[must_use]
    pub fn database_config(&self, parent_dir: &Path) -> DatabaseConfig {
        let DatabaseSettings {
            storage,
            pool,
            migrate_schema,
        } = &self.database;
        let storage = storage.clone().unwrap_or_else(|| {
            let path = default_database_file_path(parent_dir.to_path_buf());
            log::info!("Using default SQLite database: {}", path.display());
            Storage::File { path }
        });
        DatabaseConfig {
            connection: ConnectionConfig {
                storage,
                pool: *pool,
            },
            migrate_schema: *migrate_schema,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<Storage>,

    pub pool: PoolConfig,

    pub migrate_schema: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            storage: None,
            pool: Default::default(),
            migrate_schema: true,
        }
    }
}

pub const DEFAULT_REQUEST_TIMEOUT_MILLIS: NonZeroU64 = NonZeroU64::new(15_000).unwrap();

pub const DEFAULT_PULL_INTERVAL_MILLIS: NonZeroU64 = NonZeroU64::new(60_000).unwrap();

pub const DEFAULT_DRAIN_POLL_INTERVAL_MILLIS: NonZeroU64 = NonZeroU64::new(5_000).unwrap();

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Base URL of the remote API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<Url>,

    /// Upper bound for every single request, including retries
    /// on the transport level.
    pub request_timeout_millis: NonZeroU64,

    pub backoff: BackoffSettings,

    pub pull_interval_millis: NonZeroU64,

    /// Mutation records are sent immediately after being appended.
    /// Polling only picks up leftovers.
    pub drain_poll_interval_millis: NonZeroU64,
}

impl SyncSettings {
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_millis.get())
    }

    #[must_use]
    pub const fn pull_interval(&self) -> Duration {
        Duration::from_millis(self.pull_interval_millis.get())
    }

    #[must_use]
    pub const fn drain_poll_interval(&self) -> Duration {
        Duration::from_millis(self.drain_poll_interval_millis.get())
    }

    #[cfg(feature = "webapi")]
    pub fn connect_web_api(&self) -> anyhow::Result<tunequeue_remote::webapi::WebApi> {
        let remote_url = self
            .remote_url
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("missing remote URL"))?;
        tunequeue_remote::webapi::WebApi::new(remote_url.clone(), self.request_timeout())
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            remote_url: None,
            request_timeout_millis: DEFAULT_REQUEST_TIMEOUT_MILLIS,
            backoff: Default::default(),
            pull_interval_millis: DEFAULT_PULL_INTERVAL_MILLIS,
            drain_poll_interval_millis: DEFAULT_DRAIN_POLL_INTERVAL_MILLIS,
        }
    }
}

pub const DEFAULT_BACKOFF_BASE_DELAY_MILLIS: NonZeroU64 = NonZeroU64::new(500).unwrap();

pub const DEFAULT_BACKOFF_MAX_DELAY_MILLIS: NonZeroU64 = NonZeroU64::new(60_000).unwrap();

pub const DEFAULT_BACKOFF_MAX_ATTEMPTS: NonZeroU32 = NonZeroU32::new(8).unwrap();

/// Exponential backoff for resending mutation records after
/// transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffSettings {
    pub base_delay_millis: NonZeroU64,

    pub max_delay_millis: NonZeroU64,

    /// A record fails permanently after this number of attempts.
    pub max_attempts: NonZeroU32,
}

impl BackoffSettings {
    /// The delay after the given number of unsuccessful attempts.
    ///
    /// The delay doubles with every attempt until it reaches the maximum.
    /// The actual value is picked randomly from the upper half.
    #[must_use]
    pub fn delay(&self, attempt_count: u32) -> Duration {
        let exponent = attempt_count.saturating_sub(1);
        let delay_millis = self
            .base_delay_millis
            .get()
            .saturating_mul(2u64.saturating_pow(exponent))
            .min(self.max_delay_millis.get());
        let jitter_millis = rand::random::<u64>() % (delay_millis / 2 + 1);
        Duration::from_millis(delay_millis - jitter_millis)
    }

    #[must_use]
    pub const fn is_exhausted(&self, attempt_count: u32) -> bool {
        attempt_count >= self.max_attempts.get()
    }
}

impl Default for BackoffSettings {
    fn default() -> Self {
        Self {
            base_delay_millis: DEFAULT_BACKOFF_BASE_DELAY_MILLIS,
            max_delay_millis: DEFAULT_BACKOFF_MAX_DELAY_MILLIS,
            max_attempts: DEFAULT_BACKOFF_MAX_ATTEMPTS,
        }
    }
}

#[must_use]
fn new_settings_file_path(parent_dir: PathBuf) -> PathBuf {
    let mut path_buf = parent_dir;
    path_buf.push(FILE_NAME);
    path_buf.set_extension(FILE_SUFFIX);
    path_buf
}

#[must_use]
fn default_database_file_path(parent_dir: PathBuf) -> PathBuf {
    let mut path_buf = parent_dir;
    path_buf.push(DEFAULT_DATABASE_FILE_NAME);
    path_buf.set_extension(DEFAULT_DATABASE_FILE_SUFFIX);
    path_buf
}
