// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt;

/// Opaque identifier of a user, assigned by the remote.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct UserId(String);

impl UserId {
    #[must_use]
    pub const fn new(inner: String) -> Self {
        Self(inner)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        let Self(inner) = self;
        inner
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        let Self(inner) = self;
        inner
    }
}

impl From<String> for UserId {
    fn from(from: String) -> Self {
        Self::new(from)
    }
}

impl From<&str> for UserId {
    fn from(from: &str) -> Self {
        Self::new(from.to_owned())
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}
