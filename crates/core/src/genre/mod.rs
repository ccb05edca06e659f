// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt;

use crate::{prelude::*, util::is_blank};

/// Opaque identifier of a genre, assigned by the remote.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct GenreId(String);

impl GenreId {
    #[must_use]
    pub const fn new(inner: String) -> Self {
        Self(inner)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        let Self(inner) = self;
        inner
    }
}

impl From<String> for GenreId {
    fn from(from: String) -> Self {
        Self::new(from)
    }
}

impl From<&str> for GenreId {
    fn from(from: &str) -> Self {
        Self::new(from.to_owned())
    }
}

impl fmt::Display for GenreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Genre {
    pub id: GenreId,

    /// Display name, e.g. "Irish Traditional"
    pub name: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GenreInvalidity {
    IdEmpty,
    NameEmpty,
}

impl Validate for Genre {
    type Invalidity = GenreInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        ValidationContext::new()
            .invalidate_if(is_blank(self.id.as_str()), GenreInvalidity::IdEmpty)
            .invalidate_if(is_blank(&self.name), GenreInvalidity::NameEmpty)
            .into()
    }
}
