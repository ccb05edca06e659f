// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{collections::BTreeSet, fmt, str::FromStr};

use strum::{AsRefStr, EnumString, IntoStaticStr};
use ulid::Ulid;

use crate::{Entity, TuneId, UserId, prelude::*};

/// Client-generated token that deduplicates retried requests.
///
/// Lexicographically ordered by creation time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct IdempotencyKey(Ulid);

impl IdempotencyKey {
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for IdempotencyKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(inner) = self;
        inner.fmt(f)
    }
}

impl FromStr for IdempotencyKey {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(Self)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, AsRefStr, EnumString, IntoStaticStr)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
#[strum(serialize_all = "kebab-case")]
pub enum MutationKind {
    AddToRepertoire,
    RemoveFromRepertoire,
    AddToReview,
    RemoveFromReview,
    /// The review cycle of a tune is complete and it leaves the queue.
    CompleteReview,
}

impl MutationKind {
    #[must_use]
    pub const fn affects_repertoire(self) -> bool {
        matches!(self, Self::AddToRepertoire | Self::RemoveFromRepertoire)
    }

    #[must_use]
    pub const fn affects_queue(self) -> bool {
        matches!(
            self,
            Self::AddToReview | Self::RemoveFromReview | Self::CompleteReview
        )
    }

    /// Records of this kind supersede a preceding `add-to-review`.
    #[must_use]
    pub const fn supersedes_review(self) -> bool {
        matches!(self, Self::RemoveFromReview | Self::CompleteReview)
    }

    /// Whether the targeted tunes become members of the repertoire
    /// or of the practice queue respectively.
    #[must_use]
    pub const fn adds_membership(self) -> bool {
        match self {
            Self::AddToRepertoire => true,
            Self::RemoveFromRepertoire => false,
            Self::AddToReview | Self::RemoveFromReview | Self::CompleteReview => {
                !self.supersedes_review()
            }
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Reconciliation state of a [`MutationRecord`].
///
/// ```text
/// pending -> in_flight -> acknowledged
///    ^           |
///    +-----------+-------> failed
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, AsRefStr, EnumString, IntoStaticStr)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[strum(serialize_all = "snake_case")]
pub enum MutationState {
    Pending,
    InFlight,
    Acknowledged,
    Failed,
}

impl MutationState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Acknowledged | Self::Failed)
    }

    /// Unsettled records still express the local intent that has
    /// not yet been confirmed or refuted by the remote.
    #[must_use]
    pub const fn is_unsettled(self) -> bool {
        matches!(self, Self::Pending | Self::InFlight)
    }

    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::InFlight | Self::Failed)
                | (
                    Self::InFlight,
                    Self::Pending | Self::Acknowledged | Self::Failed
                )
        )
    }
}

impl fmt::Display for MutationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// An intended change of the local state that needs to be
/// reconciled with the remote.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MutationRecord {
    pub key: IdempotencyKey,

    pub user_id: UserId,

    pub kind: MutationKind,

    pub targets: BTreeSet<TuneId>,

    /// The subset of targets whose local state has been changed
    /// optimistically when appending this record.
    ///
    /// A rollback undoes exactly these changes.
    pub effect: BTreeSet<TuneId>,

    /// Snapshots of the entries that have been deleted optimistically.
    ///
    /// Restored verbatim by a rollback.
    pub removed: Vec<Entity>,

    pub state: MutationState,

    pub attempt_count: u32,

    pub created_at: UtcDateTimeMs,

    pub updated_at: UtcDateTimeMs,

    /// Earliest time for the next delivery attempt.
    pub next_attempt_at: Option<UtcDateTimeMs>,

    pub failure_reason: Option<String>,
}

impl MutationRecord {
    #[must_use]
    pub fn new(
        user_id: UserId,
        kind: MutationKind,
        targets: BTreeSet<TuneId>,
        created_at: UtcDateTimeMs,
    ) -> Self {
        Self {
            key: IdempotencyKey::new(),
            user_id,
            kind,
            targets,
            effect: BTreeSet::new(),
            removed: Vec::new(),
            state: MutationState::Pending,
            attempt_count: 0,
            created_at,
            updated_at: created_at,
            next_attempt_at: None,
            failure_reason: None,
        }
    }

    #[must_use]
    pub fn targets_tune(&self, tune_id: TuneId) -> bool {
        self.targets.contains(&tune_id)
    }

    /// The snapshot of an entry that has been deleted for the given tune.
    #[must_use]
    pub fn removed_entry(&self, tune_id: TuneId) -> Option<&Entity> {
        self.removed
            .iter()
            .find(|entity| entity.key().tune_id() == Some(tune_id))
    }

    fn is_removed_entry_consistent(&self, entity: &Entity) -> bool {
        let key = entity.key();
        let kind_matches = match entity {
            Entity::RepertoireEntry(_) => self.kind == MutationKind::RemoveFromRepertoire,
            Entity::PracticeQueueEntry(_) => self.kind.supersedes_review(),
            Entity::Tune(_) | Entity::Genre(_) => false,
        };
        kind_matches
            && key.user_id() == Some(&self.user_id)
            && key.tune_id().is_some_and(|tune_id| self.effect.contains(&tune_id))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MutationRecordInvalidity {
    TargetsEmpty,
    EffectExceedsTargets,
    RemovedEntryOutsideEffect,
    AttemptsWithoutDelivery,
}

impl Validate for MutationRecord {
    type Invalidity = MutationRecordInvalidity;

    fn validate(&self) -> ValidationResult<Self::Invalidity> {
        ValidationContext::new()
            .invalidate_if(
                self.targets.is_empty(),
                MutationRecordInvalidity::TargetsEmpty,
            )
            .invalidate_if(
                !self.effect.is_subset(&self.targets),
                MutationRecordInvalidity::EffectExceedsTargets,
            )
            .invalidate_if(
                !self
                    .removed
                    .iter()
                    .all(|entity| self.is_removed_entry_consistent(entity)),
                MutationRecordInvalidity::RemovedEntryOutsideEffect,
            )
            .invalidate_if(
                self.state == MutationState::Acknowledged && self.attempt_count == 0,
                MutationRecordInvalidity::AttemptsWithoutDelivery,
            )
            .into()
    }
}

#[cfg(test)]
mod tests;
