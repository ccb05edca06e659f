// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

pub mod clock;

/// Check that a string is empty or contains only whitespace.
#[must_use]
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}
