// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use super::schema::*;
use crate::prelude::*;

#[derive(Debug, Insertable)]
#[diesel(table_name = applied_revision)]
pub(crate) struct InsertableRecord<'a> {
    pub(crate) user_id: &'a str,
    pub(crate) revision_id: &'a str,
    pub(crate) applied_ms: TimestampMillis,
}
