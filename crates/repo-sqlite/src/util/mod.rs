// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt;

use crate::prelude::*;

/// `LIMIT` and `OFFSET` of a paginated query.
pub(crate) fn pagination_limit_offset(pagination: &Pagination) -> Option<(i64, i64)> {
    if !pagination.is_paginated() {
        return None;
    }
    // SQLite: OFFSET can only be used in conjunction with LIMIT
    let limit = i64::try_from(pagination.mandatory_limit()).unwrap_or(i64::MAX);
    let offset = pagination
        .offset
        .map_or(0, |offset| i64::try_from(offset).unwrap_or(i64::MAX));
    Some((limit, offset))
}

pub(crate) fn keyset_limit(limit: PaginationLimit) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

pub(crate) const LIKE_ESCAPE_CHARACTER: char = '\\';

const LIKE_WILDCARD_CHARACTER: char = '%';
const LIKE_PLACEHOLDER_CHARACTER: char = '_';

const LIKE_ESCAPE_CHARACTER_REPLACEMENT: &str = "\\\\"; // LIKE_ESCAPE_CHARACTER + LIKE_ESCAPE_CHARACTER

const LIKE_WILDCARD_CHARACTER_REPLACEMENT: &str = "\\%"; // LIKE_ESCAPE_CHARACTER + LIKE_WILDCARD_CHARACTER
const LIKE_PLACEHOLDER_CHARACTER_REPLACEMENT: &str = "\\_"; // LIKE_ESCAPE_CHARACTER + LIKE_PLACEHOLDER_CHARACTER

fn escape_like_matches(arg: &str) -> String {
    // The order if replacements matters!
    arg.replace(LIKE_ESCAPE_CHARACTER, LIKE_ESCAPE_CHARACTER_REPLACEMENT)
        .replace(LIKE_WILDCARD_CHARACTER, LIKE_WILDCARD_CHARACTER_REPLACEMENT)
        .replace(
            LIKE_PLACEHOLDER_CHARACTER,
            LIKE_PLACEHOLDER_CHARACTER_REPLACEMENT,
        )
}

pub(crate) fn escape_like_contains(arg: &str) -> String {
    format!(
        "{LIKE_WILDCARD_CHARACTER}{}{LIKE_WILDCARD_CHARACTER}",
        escape_like_matches(arg)
    )
}

/// A row as it is stored in the database.
pub(crate) trait StoredRecord: fmt::Debug + Sized {
    type Decoded;

    const TABLE_NAME: &'static str;

    /// Primary key of the row
    fn row_key(&self) -> String;

    fn decode(self) -> anyhow::Result<Self::Decoded>;
}

fn log_corrupt_record(table_name: &str, row_key: &str, err: &anyhow::Error) {
    log::warn!("Corrupt {table_name} record {row_key}: {err:#}");
}

/// Decode a single, requested record.
pub(crate) fn decode_record<R: StoredRecord>(record: R) -> RepoResult<R::Decoded> {
    let row_key = record.row_key();
    record.decode().map_err(|err| {
        log_corrupt_record(R::TABLE_NAME, &row_key, &err);
        RepoError::CorruptRecord {
            key: format!("{table_name}/{row_key}", table_name = R::TABLE_NAME),
            reason: err.to_string(),
        }
    })
}

/// Decode multiple records and skip all corrupt records.
pub(crate) fn decode_records<R: StoredRecord>(
    records: impl IntoIterator<Item = R>,
) -> Vec<R::Decoded> {
    records
        .into_iter()
        .filter_map(|record| {
            let row_key = record.row_key();
            record
                .decode()
                .map_err(|err| log_corrupt_record(R::TABLE_NAME, &row_key, &err))
                .ok()
        })
        .collect()
}

/// A decoding failure of a stored record.
#[derive(Debug)]
pub(crate) struct CorruptRecord<R> {
    pub(crate) record: R,
    pub(crate) reason: anyhow::Error,
}

/// Find all records that could not be decoded.
pub(crate) fn find_corrupt_records<R>(records: impl IntoIterator<Item = R>) -> Vec<CorruptRecord<R>>
where
    R: StoredRecord + Clone,
{
    records
        .into_iter()
        .filter_map(|record| {
            record
                .clone()
                .decode()
                .err()
                .map(|reason| CorruptRecord { record, reason })
        })
        .collect()
}

#[cfg(test)]
mod tests;
