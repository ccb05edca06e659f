// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{borrow::Cow, fmt, path::PathBuf, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod pool;

const IN_MEMORY_STORAGE: &str = ":memory:";

/// Location of the database.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Storage {
    /// A private, volatile database that vanishes with its last connection
    InMemory,

    File { path: PathBuf },
}

impl Storage {
    #[must_use]
    pub const fn is_in_memory(&self) -> bool {
        matches!(self, Self::InMemory)
    }

    /// The connection string passed to `SQLite`.
    #[must_use]
    pub fn connection_string(&self) -> Cow<'_, str> {
        match self {
            Self::InMemory => Cow::Borrowed(IN_MEMORY_STORAGE),
            Self::File { path } => path.to_string_lossy(),
        }
    }
}

impl fmt::Display for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InMemory => f.write_str(IN_MEMORY_STORAGE),
            Self::File { path } => path.display().fmt(f),
        }
    }
}

impl FromStr for Storage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            anyhow::bail!("empty database storage");
        }
        if s == IN_MEMORY_STORAGE {
            return Ok(Self::InMemory);
        }
        Ok(Self::File { path: s.into() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    pub storage: Storage,

    pub pool: pool::Config,
}
