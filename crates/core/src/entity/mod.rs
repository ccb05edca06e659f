// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt;

use bitflags::bitflags;
use strum::{AsRefStr, EnumIter, EnumString, IntoStaticStr};

use crate::{Genre, GenreId, PracticeQueueEntry, RepertoireEntry, Tune, TuneId, UserId};

/// Kinds of entities that are held in the local entity store.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, AsRefStr, EnumIter, EnumString, IntoStaticStr,
)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    Tune,
    Genre,
    RepertoireEntry,
    PracticeQueueEntry,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Key of an entity, unique within its kind.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "kind", rename_all = "snake_case")
)]
pub enum EntityKey {
    Tune {
        tune_id: TuneId,
    },
    Genre {
        genre_id: GenreId,
    },
    RepertoireEntry {
        user_id: UserId,
        tune_id: TuneId,
    },
    PracticeQueueEntry {
        user_id: UserId,
        tune_id: TuneId,
    },
}

impl EntityKey {
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Tune { .. } => EntityKind::Tune,
            Self::Genre { .. } => EntityKind::Genre,
            Self::RepertoireEntry { .. } => EntityKind::RepertoireEntry,
            Self::PracticeQueueEntry { .. } => EntityKind::PracticeQueueEntry,
        }
    }

    /// The user that owns the entity.
    ///
    /// Catalog entities are shared by all users.
    #[must_use]
    pub const fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::Tune { .. } | Self::Genre { .. } => None,
            Self::RepertoireEntry { user_id, .. } | Self::PracticeQueueEntry { user_id, .. } => {
                Some(user_id)
            }
        }
    }

    /// The tune that is referenced by the key.
    #[must_use]
    pub const fn tune_id(&self) -> Option<TuneId> {
        match self {
            Self::Genre { .. } => None,
            Self::Tune { tune_id }
            | Self::RepertoireEntry { tune_id, .. }
            | Self::PracticeQueueEntry { tune_id, .. } => Some(*tune_id),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tune { tune_id } => write!(f, "tune/{tune_id}"),
            Self::Genre { genre_id } => write!(f, "genre/{genre_id}"),
            Self::RepertoireEntry { user_id, tune_id } => {
                write!(f, "repertoire_entry/{user_id}/{tune_id}")
            }
            Self::PracticeQueueEntry { user_id, tune_id } => {
                write!(f, "practice_queue_entry/{user_id}/{tune_id}")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "kind", content = "entity", rename_all = "snake_case")
)]
pub enum Entity {
    Tune(Tune),
    Genre(Genre),
    RepertoireEntry(RepertoireEntry),
    PracticeQueueEntry(PracticeQueueEntry),
}

impl Entity {
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Tune(_) => EntityKind::Tune,
            Self::Genre(_) => EntityKind::Genre,
            Self::RepertoireEntry(_) => EntityKind::RepertoireEntry,
            Self::PracticeQueueEntry(_) => EntityKind::PracticeQueueEntry,
        }
    }

    #[must_use]
    pub fn key(&self) -> EntityKey {
        match self {
            Self::Tune(tune) => EntityKey::Tune { tune_id: tune.id },
            Self::Genre(genre) => EntityKey::Genre {
                genre_id: genre.id.clone(),
            },
            Self::RepertoireEntry(entry) => EntityKey::RepertoireEntry {
                user_id: entry.user_id.clone(),
                tune_id: entry.tune_id,
            },
            Self::PracticeQueueEntry(entry) => EntityKey::PracticeQueueEntry {
                user_id: entry.user_id.clone(),
                tune_id: entry.tune_id,
            },
        }
    }
}

bitflags! {
    /// Entity kinds affected by one or more writes.
    ///
    /// Projections use change sets to invalidate cached results.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChangeSet: u8 {
        const TUNE = 0b0001;
        const GENRE = 0b0010;
        const REPERTOIRE_ENTRY = 0b0100;
        const PRACTICE_QUEUE_ENTRY = 0b1000;

        const CATALOG = Self::TUNE.bits() | Self::GENRE.bits();
        const QUEUE_MEMBERSHIP = Self::REPERTOIRE_ENTRY.bits() | Self::PRACTICE_QUEUE_ENTRY.bits();
    }
}

impl From<EntityKind> for ChangeSet {
    fn from(from: EntityKind) -> Self {
        match from {
            EntityKind::Tune => Self::TUNE,
            EntityKind::Genre => Self::GENRE,
            EntityKind::RepertoireEntry => Self::REPERTOIRE_ENTRY,
            EntityKind::PracticeQueueEntry => Self::PRACTICE_QUEUE_ENTRY,
        }
    }
}
