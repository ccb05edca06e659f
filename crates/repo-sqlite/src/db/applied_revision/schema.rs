// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

diesel::table! {
    applied_revision (user_id, revision_id) {
        user_id -> Text,
        revision_id -> Text,
        applied_ms -> BigInt,
    }
}
