// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! JSON representation of the sync protocol.

use serde::{Deserialize, Serialize};

use tunequeue_core::{
    EntityKind, MutationKind, ReviewSchedule, TuneId, UserId, util::clock::UtcDateTimeMs,
};

mod _core {
    pub(super) use tunequeue_core::{
        Delta, DeltaBatch, DeltaChange, Entity, EntityKey, Genre, MutationRecord,
        PracticeQueueEntry, RepertoireEntry, Tune,
    };
}

///////////////////////////////////////////////////////////////////////
// Mutations
///////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MutationRequest {
    pub idempotency_key: String,

    pub operation_kind: MutationKind,

    pub target_ids: Vec<TuneId>,

    pub user_id: UserId,
}

impl From<&_core::MutationRecord> for MutationRequest {
    fn from(from: &_core::MutationRecord) -> Self {
        let _core::MutationRecord {
            key,
            user_id,
            kind,
            targets,
            ..
        } = from;
        Self {
            idempotency_key: key.to_string(),
            operation_kind: *kind,
            target_ids: targets.iter().copied().collect(),
            user_id: user_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationStatus {
    Acknowledged,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    pub status: MutationStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

///////////////////////////////////////////////////////////////////////
// Deltas
///////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaOp {
    Upsert,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delta {
    pub revision_id: String,

    pub entity_kind: EntityKind,

    /// The whole entity for upserts, at least its key fields
    /// for deletes.
    pub entity: serde_json::Value,

    pub op: DeltaOp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltasResponse {
    pub deltas: Vec<Delta>,

    pub cursor: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct Tune {
    id: TuneId,

    title: String,

    #[serde(default)]
    genre_id: Option<String>,

    #[serde(default)]
    tune_type: Option<String>,

    #[serde(default)]
    mode: Option<String>,
}

impl From<Tune> for _core::Tune {
    fn from(from: Tune) -> Self {
        let Tune {
            id,
            title,
            genre_id,
            tune_type,
            mode,
        } = from;
        Self {
            id,
            title,
            genre_id: genre_id.map(Into::into),
            tune_type,
            mode,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct Genre {
    id: String,

    name: String,
}

impl From<Genre> for _core::Genre {
    fn from(from: Genre) -> Self {
        let Genre { id, name } = from;
        Self {
            id: id.into(),
            name,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RepertoireEntry {
    user_id: UserId,

    tune_id: TuneId,

    added_at: UtcDateTimeMs,
}

impl From<RepertoireEntry> for _core::RepertoireEntry {
    fn from(from: RepertoireEntry) -> Self {
        let RepertoireEntry {
            user_id,
            tune_id,
            added_at,
        } = from;
        Self::new(user_id, tune_id, added_at)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct PracticeQueueEntry {
    user_id: UserId,

    tune_id: TuneId,

    added_at: UtcDateTimeMs,

    due_at: UtcDateTimeMs,

    #[serde(default)]
    last_reviewed_at: Option<UtcDateTimeMs>,

    #[serde(default)]
    interval_days: u32,

    #[serde(default)]
    review_count: u32,
}

impl From<PracticeQueueEntry> for _core::PracticeQueueEntry {
    fn from(from: PracticeQueueEntry) -> Self {
        let PracticeQueueEntry {
            user_id,
            tune_id,
            added_at,
            due_at,
            last_reviewed_at,
            interval_days,
            review_count,
        } = from;
        Self {
            user_id,
            tune_id,
            added_at,
            schedule: ReviewSchedule {
                due_at,
                last_reviewed_at,
                interval_days,
                review_count,
            },
        }
    }
}

// Key fields only. Other fields are ignored.
#[derive(Debug, Deserialize)]
struct CatalogKey<T> {
    id: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserTuneKey {
    user_id: UserId,

    tune_id: TuneId,
}

fn decode_entity(kind: EntityKind, entity: serde_json::Value) -> anyhow::Result<_core::Entity> {
    let entity = match kind {
        EntityKind::Tune => _core::Entity::Tune(serde_json::from_value::<Tune>(entity)?.into()),
        EntityKind::Genre => _core::Entity::Genre(serde_json::from_value::<Genre>(entity)?.into()),
        EntityKind::RepertoireEntry => _core::Entity::RepertoireEntry(
            serde_json::from_value::<RepertoireEntry>(entity)?.into(),
        ),
        EntityKind::PracticeQueueEntry => _core::Entity::PracticeQueueEntry(
            serde_json::from_value::<PracticeQueueEntry>(entity)?.into(),
        ),
    };
    Ok(entity)
}

fn decode_key(kind: EntityKind, entity: serde_json::Value) -> anyhow::Result<_core::EntityKey> {
    let key = match kind {
        EntityKind::Tune => {
            let CatalogKey { id } = serde_json::from_value(entity)?;
            _core::EntityKey::Tune { tune_id: id }
        }
        EntityKind::Genre => {
            let CatalogKey::<String> { id } = serde_json::from_value(entity)?;
            _core::EntityKey::Genre {
                genre_id: id.into(),
            }
        }
        EntityKind::RepertoireEntry => {
            let UserTuneKey { user_id, tune_id } = serde_json::from_value(entity)?;
            _core::EntityKey::RepertoireEntry { user_id, tune_id }
        }
        EntityKind::PracticeQueueEntry => {
            let UserTuneKey { user_id, tune_id } = serde_json::from_value(entity)?;
            _core::EntityKey::PracticeQueueEntry { user_id, tune_id }
        }
    };
    Ok(key)
}

impl TryFrom<Delta> for _core::Delta {
    type Error = anyhow::Error;

    fn try_from(from: Delta) -> anyhow::Result<Self> {
        let Delta {
            revision_id,
            entity_kind,
            entity,
            op,
        } = from;
        let change = match op {
            DeltaOp::Upsert => _core::DeltaChange::Upsert(decode_entity(entity_kind, entity)?),
            DeltaOp::Delete => _core::DeltaChange::Delete(decode_key(entity_kind, entity)?),
        };
        Ok(Self {
            revision_id: revision_id.into(),
            change,
        })
    }
}

impl From<DeltasResponse> for _core::DeltaBatch {
    /// Undecodable deltas are skipped.
    fn from(from: DeltasResponse) -> Self {
        let DeltasResponse { deltas, cursor } = from;
        let deltas = deltas
            .into_iter()
            .filter_map(|delta| {
                let revision_id = delta.revision_id.clone();
                _core::Delta::try_from(delta)
                    .inspect_err(|err| {
                        log::warn!("Skipping malformed remote change {revision_id}: {err:#}");
                    })
                    .ok()
            })
            .collect();
        Self { deltas, cursor }
    }
}

#[cfg(test)]
mod tests;
