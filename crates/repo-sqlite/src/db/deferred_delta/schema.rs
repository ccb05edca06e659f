// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

diesel::table! {
    deferred_delta (row_id) {
        row_id -> BigInt,
        user_id -> Text,
        revision_id -> Text,
        delta -> Text,
        deferred_ms -> BigInt,
    }
}
