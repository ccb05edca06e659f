// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

diesel::table! {
    genre (genre_id) {
        genre_id -> Text,
        name -> Text,
    }
}
