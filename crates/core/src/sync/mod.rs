// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt;

use crate::{Entity, EntityKey, UserId, prelude::*};

/// Opaque identifier of a remote change.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct RevisionId(String);

impl RevisionId {
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

impl From<String> for RevisionId {
    fn from(from: String) -> Self {
        Self::new(from)
    }
}

impl From<&str> for RevisionId {
    fn from(from: &str) -> Self {
        Self::new(from.to_owned())
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum DeltaChange {
    Upsert(Entity),
    Delete(EntityKey),
}

impl DeltaChange {
    #[must_use]
    pub fn key(&self) -> EntityKey {
        match self {
            Self::Upsert(entity) => entity.key(),
            Self::Delete(key) => key.clone(),
        }
    }
}

/// A single change of the remote state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Delta {
    pub revision_id: RevisionId,

    pub change: DeltaChange,
}

/// An ordered batch of remote changes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeltaBatch {
    pub deltas: Vec<Delta>,

    /// Resume position for the next pull.
    pub cursor: String,
}

/// Position of the last remote change that has been applied
/// to the local store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncCursor {
    pub user_id: UserId,

    pub cursor: String,

    pub updated_at: UtcDateTimeMs,
}
