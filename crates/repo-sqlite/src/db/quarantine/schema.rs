// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

diesel::table! {
    quarantine (row_id) {
        row_id -> BigInt,
        table_name -> Text,
        row_key -> Text,
        reason -> Text,
        content -> Nullable<Text>,
        quarantined_ms -> BigInt,
    }
}
