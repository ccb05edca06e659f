// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

diesel::table! {
    mutation_record (row_id) {
        row_id -> BigInt,
        row_created_ms -> BigInt,
        row_updated_ms -> BigInt,
        idempotency_key -> Text,
        user_id -> Text,
        kind -> Text,
        targets -> Text,
        effect -> Text,
        removed -> Text,
        state -> Text,
        attempt_count -> BigInt,
        next_attempt_ms -> Nullable<BigInt>,
        failure_reason -> Nullable<Text>,
    }
}
