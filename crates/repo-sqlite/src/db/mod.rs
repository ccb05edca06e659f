// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

pub(crate) mod applied_revision;
pub(crate) mod deferred_delta;
pub(crate) mod genre;
pub(crate) mod mutation_record;
pub(crate) mod practice_queue_entry;
pub(crate) mod quarantine;
pub(crate) mod repertoire_entry;
pub(crate) mod sync_cursor;
pub(crate) mod tune;

mod join {
    use crate::db::{
        genre::schema::*, practice_queue_entry::schema::*, repertoire_entry::schema::*,
        tune::schema::*,
    };

    diesel::allow_tables_to_appear_in_same_query!(
        genre,
        tune,
        repertoire_entry,
        practice_queue_entry,
    );
}
