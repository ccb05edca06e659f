// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use tunequeue_core::util::clock::UtcDateTimeMs;

use crate::prelude::*;

/// A stored row that could not be decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuarantinedRecord {
    /// Name of the table that contained the row
    pub table: String,

    /// Primary key of the row
    pub key: String,

    pub reason: String,

    /// Serialized contents of the row, if available
    pub content: Option<String>,

    pub quarantined_at: UtcDateTimeMs,
}

pub trait QuarantineRepo {
    /// Move all rows that could not be decoded into quarantine.
    ///
    /// Returns the number of quarantined rows.
    fn quarantine_corrupt_records(&mut self, quarantined_at: UtcDateTimeMs) -> RepoResult<usize>;

    fn load_quarantined_records(&mut self) -> RepoResult<Vec<QuarantinedRecord>>;
}
