// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use super::*;

#[test]
fn escape_like_contains_special_characters() {
    assert_eq!("%a\\%b\\_c\\\\d%", escape_like_contains("a%b_c\\d"));
    assert_eq!("%Reel%", escape_like_contains("Reel"));
}

#[test]
fn pagination_limit_offset_requires_limit_for_offset() {
    assert_eq!(None, pagination_limit_offset(&Pagination::default()));
    assert_eq!(
        Some((i64::MAX, 5)),
        pagination_limit_offset(&Pagination {
            limit: None,
            offset: Some(5),
        })
    );
    assert_eq!(
        Some((10, 0)),
        pagination_limit_offset(&Pagination {
            limit: Some(10),
            offset: None,
        })
    );
}
