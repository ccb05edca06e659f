// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

diesel::table! {
    practice_queue_entry (user_id, tune_id) {
        user_id -> Text,
        tune_id -> BigInt,
        added_ms -> BigInt,
        due_ms -> BigInt,
        last_reviewed_ms -> Nullable<BigInt>,
        interval_days -> BigInt,
        review_count -> BigInt,
    }
}
