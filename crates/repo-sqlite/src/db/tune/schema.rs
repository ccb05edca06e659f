// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

diesel::table! {
    tune (tune_id) {
        tune_id -> BigInt,
        title -> Text,
        genre_id -> Nullable<Text>,
        tune_type -> Nullable<Text>,
        mode -> Nullable<Text>,
    }
}
