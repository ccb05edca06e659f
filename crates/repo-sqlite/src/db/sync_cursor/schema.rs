// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

diesel::table! {
    sync_cursor (user_id) {
        user_id -> Text,
        cursor -> Text,
        updated_ms -> BigInt,
    }
}
