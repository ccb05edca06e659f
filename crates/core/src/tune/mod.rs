// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt;

use crate::{GenreId, prelude::*, util::is_blank};

pub type TuneIdValue = i64;

/// Stable identifier of a tune in the catalog.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct TuneId(TuneIdValue);

impl TuneId {
    #[must_use]
    pub const fn new(inner: TuneIdValue) -> Self {
        Self(inner)
    }

    #[must_use]
    pub const fn to_inner(self) -> TuneIdValue {
        let Self(inner) = self;
        inner
    }
}

impl From<TuneIdValue> for TuneId {
    fn from(from: TuneIdValue) -> Self {
        Self::new(from)
    }
}

impl From<TuneId> for TuneIdValue {
    fn from(from: TuneId) -> Self {
        from.to_inner()
    }
}

impl fmt::Display for TuneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_inner().fmt(f)
    }
}

/// A tune of the catalog.
///
/// Tunes are read-only for clients and only change when the
/// remote catalog changes.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tune {
    pub id: TuneId,

    pub title: String,

    pub genre_id: Option<GenreId>,

    /// Rhythm type, e.g. "reel", "jig", or "hornpipe"
    pub tune_type: Option<String>,

    /// Mode or key, e.g. "D major" or "E dorian"
    pub mode: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TuneInvalidity {
    TitleEmpty,
    TuneTypeEmpty,
    ModeEmpty,
}

impl Validate for Tune {
    type Invalidity = TuneInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        ValidationContext::new()
            .invalidate_if(is_blank(&self.title), TuneInvalidity::TitleEmpty)
            .invalidate_if(
                self.tune_type.as_deref().is_some_and(is_blank),
                TuneInvalidity::TuneTypeEmpty,
            )
            .invalidate_if(
                self.mode.as_deref().is_some_and(is_blank),
                TuneInvalidity::ModeEmpty,
            )
            .into()
    }
}

#[cfg(test)]
mod tests;
