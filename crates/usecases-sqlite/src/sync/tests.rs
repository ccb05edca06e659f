// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use diesel::connection::SimpleConnection as _;
use test_log::test;

use tunequeue_core::{
    ChangeSet, Delta, DeltaChange, Entity, EntityKey, MutationKind, PracticeQueueEntry,
    RepertoireEntry, RevisionId, TuneId,
};

use super::*;

use crate::{
    projection::{GenreFacetsState, available_genres},
    tests::{Fixture, TestResult, new_genre, new_tune, tune_ids},
};

fn upsert(revision_id: &str, entity: Entity) -> Delta {
    Delta {
        revision_id: revision_id.into(),
        change: DeltaChange::Upsert(entity),
    }
}

fn delete(revision_id: &str, key: EntityKey) -> Delta {
    Delta {
        revision_id: revision_id.into(),
        change: DeltaChange::Delete(key),
    }
}

fn queue_entry_key(fixture: &Fixture, tune_id: i64) -> EntityKey {
    EntityKey::PracticeQueueEntry {
        user_id: fixture.user_id.clone(),
        tune_id: TuneId::new(tune_id),
    }
}

fn initial_batch(fixture: &Fixture) -> DeltaBatch {
    DeltaBatch {
        deltas: vec![
            upsert("r1", Entity::Genre(new_genre("irish", "Irish Traditional"))),
            upsert("r2", Entity::Tune(new_tune(66, "irish"))),
            upsert("r3", Entity::Tune(new_tune(70, "irish"))),
            upsert(
                "r4",
                Entity::RepertoireEntry(RepertoireEntry::new(
                    fixture.user_id.clone(),
                    TuneId::new(66),
                    fixture.now,
                )),
            ),
            upsert(
                "r5",
                Entity::RepertoireEntry(RepertoireEntry::new(
                    fixture.user_id.clone(),
                    TuneId::new(70),
                    fixture.now,
                )),
            ),
        ],
        cursor: "c1".to_owned(),
    }
}

#[test]
fn first_pull_makes_genres_available() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    assert_eq!(
        GenreFacetsState::Loading,
        available_genres(&mut fixture.db, &fixture.user_id)?.state
    );

    let batch = initial_batch(&fixture);
    let committed = apply_delta_batch(&mut fixture.db, &fixture.user_id, &batch, fixture.now)?;
    assert_eq!(5, committed.outcome.applied_count);
    assert!(committed.changes.contains(ChangeSet::CATALOG | ChangeSet::REPERTOIRE_ENTRY));

    assert_eq!(
        Some("c1".to_owned()),
        load_cursor(&mut fixture.db, &fixture.user_id)?
    );
    let facets = available_genres(&mut fixture.db, &fixture.user_id)?;
    assert_eq!(GenreFacetsState::Ready, facets.state);
    assert_eq!(vec![new_genre("irish", "Irish Traditional")], facets.genres);
    Ok(())
}

#[test]
fn empty_catalog_has_no_genres() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let batch = DeltaBatch {
        deltas: vec![upsert(
            "r1",
            Entity::Genre(new_genre("irish", "Irish Traditional")),
        )],
        cursor: "c1".to_owned(),
    };
    apply_delta_batch(&mut fixture.db, &fixture.user_id, &batch, fixture.now)?;
    // Genres without tunes are not available for filtering
    let facets = available_genres(&mut fixture.db, &fixture.user_id)?;
    assert_eq!(GenreFacetsState::Empty, facets.state);
    assert!(facets.genres.is_empty());
    Ok(())
}

#[test]
fn redelivered_batch_is_ignored() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let batch = initial_batch(&fixture);
    apply_delta_batch(&mut fixture.db, &fixture.user_id, &batch, fixture.now)?;

    let committed = apply_delta_batch(&mut fixture.db, &fixture.user_id, &batch, fixture.now)?;
    assert_eq!(0, committed.outcome.applied_count);
    assert_eq!(batch.deltas.len(), committed.outcome.duplicate_count);
    assert_eq!(
        2,
        crate::catalog::load_repertoire(&mut fixture.db, &fixture.user_id)?.len()
    );
    Ok(())
}

#[test]
fn skip_queue_entries_outside_repertoire_and_of_other_users() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let initial = initial_batch(&fixture);
    apply_delta_batch(&mut fixture.db, &fixture.user_id, &initial, fixture.now)?;

    let batch = DeltaBatch {
        deltas: vec![
            upsert("r6", Entity::Tune(new_tune(72, "irish"))),
            // Not in the repertoire
            upsert(
                "r7",
                Entity::PracticeQueueEntry(PracticeQueueEntry::new(
                    fixture.user_id.clone(),
                    TuneId::new(72),
                    fixture.now,
                )),
            ),
            // Another user
            upsert(
                "r8",
                Entity::RepertoireEntry(RepertoireEntry::new(
                    "u2".into(),
                    TuneId::new(72),
                    fixture.now,
                )),
            ),
            upsert(
                "r9",
                Entity::PracticeQueueEntry(PracticeQueueEntry::new(
                    fixture.user_id.clone(),
                    TuneId::new(66),
                    fixture.now,
                )),
            ),
        ],
        cursor: "c2".to_owned(),
    };
    let committed = apply_delta_batch(&mut fixture.db, &fixture.user_id, &batch, fixture.now)?;
    assert_eq!(2, committed.outcome.applied_count);
    assert_eq!(2, committed.outcome.skipped_count);
    assert_eq!(vec![TuneId::new(66)], fixture.queued_tune_ids()?);
    Ok(())
}

#[test]
fn deleting_tune_removes_entries() -> TestResult<()> {
    let mut fixture = Fixture::new_seeded()?;
    crate::mutation::append(
        &mut fixture.db,
        &fixture.user_id,
        MutationKind::AddToReview,
        tune_ids(&[70]),
        fixture.now,
    )?;
    let key = crate::mutation::load_pending_records(&mut fixture.db, &fixture.user_id)?[0]
        .key
        .clone();
    crate::mutation::mark_in_flight(&mut fixture.db, &key, fixture.now)?;
    crate::mutation::mark_acknowledged(&mut fixture.db, &key, fixture.now)?;

    let batch = DeltaBatch {
        deltas: vec![delete(
            "r1",
            EntityKey::Tune {
                tune_id: TuneId::new(70),
            },
        )],
        cursor: "c1".to_owned(),
    };
    apply_delta_batch(&mut fixture.db, &fixture.user_id, &batch, fixture.now)?;

    assert!(fixture.queued_tune_ids()?.is_empty());
    assert!(
        crate::catalog::load_repertoire(&mut fixture.db, &fixture.user_id)?
            .iter()
            .all(|entry| entry.tune_id != TuneId::new(70))
    );
    Ok(())
}

#[test]
fn conflicting_change_is_deferred_until_record_is_settled() -> TestResult<()> {
    let mut fixture = Fixture::new_seeded()?;
    let key = crate::mutation::append(
        &mut fixture.db,
        &fixture.user_id,
        MutationKind::AddToReview,
        tune_ids(&[66, 70]),
        fixture.now,
    )?
    .outcome
    .record
    .key;

    let batch = DeltaBatch {
        deltas: vec![
            delete("r1", queue_entry_key(&fixture, 66)),
            upsert("r2", Entity::Tune(new_tune(66, "scottish"))),
        ],
        cursor: "c1".to_owned(),
    };
    let committed = apply_delta_batch(&mut fixture.db, &fixture.user_id, &batch, fixture.now)?;
    assert_eq!(vec![RevisionId::from("r1")], committed.outcome.deferred);
    assert_eq!(1, committed.outcome.applied_count);
    // Local intent wins for now
    assert_eq!(
        vec![TuneId::new(66), TuneId::new(70)],
        fixture.queued_tune_ids()?
    );

    crate::mutation::mark_in_flight(&mut fixture.db, &key, fixture.now)?;
    let settled = crate::mutation::mark_acknowledged(&mut fixture.db, &key, fixture.now)?;
    assert_eq!(1, settled.outcome.reapplied.applied_count);
    assert!(settled.outcome.reapplied.deferred.is_empty());

    // The remote is authoritative after the record has been settled
    assert_eq!(vec![TuneId::new(70)], fixture.queued_tune_ids()?);
    Ok(())
}

#[test]
fn failed_batch_leaves_cursor_untouched() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let initial = initial_batch(&fixture);
    apply_delta_batch(&mut fixture.db, &fixture.user_id, &initial, fixture.now)?;

    fixture.db.batch_execute("DROP TABLE applied_revision")?;
    let batch = DeltaBatch {
        deltas: vec![upsert("r6", Entity::Tune(new_tune(72, "irish")))],
        cursor: "c2".to_owned(),
    };
    assert!(apply_delta_batch(&mut fixture.db, &fixture.user_id, &batch, fixture.now).is_err());
    assert_eq!(
        Some("c1".to_owned()),
        load_cursor(&mut fixture.db, &fixture.user_id)?
    );
    Ok(())
}
