// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use super::*;

#[test]
fn classify_status_codes() {
    for status in [408, 429, 500, 502, 503, 504] {
        assert!(is_transient_status(status), "{status}");
    }
    for status in [400, 401, 403, 404, 409, 410, 422] {
        assert!(!is_transient_status(status), "{status}");
    }
}

#[test]
fn only_transient_errors_are_retried() {
    assert!(RemoteError::transient(anyhow::anyhow!("timeout")).is_transient());
    assert!(
        !RemoteError::Rejected {
            reason: "unknown tune".to_owned()
        }
        .is_transient()
    );
}
