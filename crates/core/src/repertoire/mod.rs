// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::{TuneId, UserId, prelude::*};

/// A tune that a user has chosen to learn or maintain.
///
/// Repertoire entries are not scheduled for review until they
/// are explicitly promoted into the practice queue.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RepertoireEntry {
    pub user_id: UserId,

    pub tune_id: TuneId,

    pub added_at: UtcDateTimeMs,
}

impl RepertoireEntry {
    #[must_use]
    pub fn new(user_id: UserId, tune_id: TuneId, added_at: UtcDateTimeMs) -> Self {
        Self {
            user_id,
            tune_id,
            added_at,
        }
    }
}
