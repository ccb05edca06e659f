// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use test_log::test;

use tunequeue_core::{ChangeSet, MutationState, PracticeQueueEntry};

use super::*;

use crate::tests::{Fixture, REPERTOIRE, TestResult, tune_ids};

#[test]
fn add_selected_tunes_to_review() -> TestResult<()> {
    let mut fixture = Fixture::new_seeded()?;

    let committed = append(
        &mut fixture.db,
        &fixture.user_id,
        MutationKind::AddToReview,
        tune_ids(&[66, 70, 72]),
        fixture.now,
    )?;
    assert_eq!(3, committed.outcome.affected_count);
    assert_eq!(MutationState::Pending, committed.outcome.record.state);
    assert!(committed.changes.contains(ChangeSet::PRACTICE_QUEUE_ENTRY));

    assert_eq!(
        tune_ids(&[66, 70, 72]).into_iter().collect::<Vec<_>>(),
        fixture.queued_tune_ids()?
    );
    assert_eq!(
        vec![committed.outcome.record.key],
        load_pending_records(&mut fixture.db, &fixture.user_id)?
            .into_iter()
            .map(|record| record.key)
            .collect::<Vec<_>>()
    );
    Ok(())
}

#[test]
fn tunes_already_under_review_count_as_added() -> TestResult<()> {
    let mut fixture = Fixture::new_seeded()?;
    append(
        &mut fixture.db,
        &fixture.user_id,
        MutationKind::AddToReview,
        tune_ids(&[66]),
        fixture.now,
    )?;

    let committed = append(
        &mut fixture.db,
        &fixture.user_id,
        MutationKind::AddToReview,
        tune_ids(&[66, 70]),
        fixture.now,
    )?;
    assert_eq!(2, committed.outcome.affected_count);
    assert_eq!(tune_ids(&[70]), committed.outcome.record.effect);
    assert_eq!(2, fixture.queued_tune_ids()?.len());
    Ok(())
}

#[test]
fn reject_review_of_tunes_outside_repertoire() -> TestResult<()> {
    let mut fixture = Fixture::new_seeded()?;

    let res = append(
        &mut fixture.db,
        &fixture.user_id,
        MutationKind::AddToReview,
        tune_ids(&[66, 100]),
        fixture.now,
    );
    assert!(matches!(res, Err(Error::Input(_))));

    // Nothing has been written
    assert!(fixture.queued_tune_ids()?.is_empty());
    assert!(load_pending_records(&mut fixture.db, &fixture.user_id)?.is_empty());
    Ok(())
}

#[test]
fn reject_empty_selection() -> TestResult<()> {
    let mut fixture = Fixture::new_seeded()?;
    let res = append(
        &mut fixture.db,
        &fixture.user_id,
        MutationKind::AddToReview,
        Default::default(),
        fixture.now,
    );
    assert!(matches!(res, Err(Error::Input(_))));
    Ok(())
}

#[test]
fn reject_removal_from_repertoire_while_under_review() -> TestResult<()> {
    let mut fixture = Fixture::new_seeded()?;
    append(
        &mut fixture.db,
        &fixture.user_id,
        MutationKind::AddToReview,
        tune_ids(&[66]),
        fixture.now,
    )?;

    let res = append(
        &mut fixture.db,
        &fixture.user_id,
        MutationKind::RemoveFromRepertoire,
        tune_ids(&[66, 70]),
        fixture.now,
    );
    assert!(matches!(res, Err(Error::Input(_))));

    let committed = append(
        &mut fixture.db,
        &fixture.user_id,
        MutationKind::RemoveFromRepertoire,
        tune_ids(&[70]),
        fixture.now,
    )?;
    assert_eq!(1, committed.outcome.affected_count);
    assert_eq!(
        REPERTOIRE.len() - 1,
        crate::catalog::load_repertoire(&mut fixture.db, &fixture.user_id)?.len()
    );
    Ok(())
}

#[test]
fn acknowledge_record_twice() -> TestResult<()> {
    let mut fixture = Fixture::new_seeded()?;
    let key = append(
        &mut fixture.db,
        &fixture.user_id,
        MutationKind::AddToReview,
        tune_ids(&[66, 70, 72]),
        fixture.now,
    )?
    .outcome
    .record
    .key;

    let in_flight = mark_in_flight(&mut fixture.db, &key, fixture.now)?;
    assert_eq!(MutationState::InFlight, in_flight.state);
    assert_eq!(1, in_flight.attempt_count);

    let settled = mark_acknowledged(&mut fixture.db, &key, fixture.now)?;
    assert_eq!(MutationState::Acknowledged, settled.outcome.record.state);
    let settled = mark_acknowledged(&mut fixture.db, &key, fixture.now)?;
    assert_eq!(MutationState::Acknowledged, settled.outcome.record.state);

    assert_eq!(3, fixture.queued_tune_ids()?.len());
    assert!(load_unsettled_records(&mut fixture.db, &fixture.user_id)?.is_empty());
    Ok(())
}

#[test]
fn failed_record_rolls_back_its_own_effect() -> TestResult<()> {
    let mut fixture = Fixture::new_seeded()?;
    append(
        &mut fixture.db,
        &fixture.user_id,
        MutationKind::AddToReview,
        tune_ids(&[66]),
        fixture.now,
    )?;
    let key = append(
        &mut fixture.db,
        &fixture.user_id,
        MutationKind::AddToReview,
        tune_ids(&[66, 70]),
        fixture.now,
    )?
    .outcome
    .record
    .key;
    mark_in_flight(&mut fixture.db, &key, fixture.now)?;

    let settled = mark_failed(&mut fixture.db, &key, "rejected".to_owned(), fixture.now)?;
    assert_eq!(MutationState::Failed, settled.outcome.record.state);
    assert!(settled.changes.contains(ChangeSet::PRACTICE_QUEUE_ENTRY));

    // Only the effect of the failed record has been undone
    assert_eq!(vec![TuneId::new(66)], fixture.queued_tune_ids()?);
    let failed = load_failed_records(&mut fixture.db, &fixture.user_id)?;
    assert_eq!(1, failed.len());
    assert_eq!(Some("rejected"), failed[0].failure_reason.as_deref());
    Ok(())
}

#[test]
fn retry_and_dismiss_failed_records() -> TestResult<()> {
    let mut fixture = Fixture::new_seeded()?;
    let first_key = append(
        &mut fixture.db,
        &fixture.user_id,
        MutationKind::AddToReview,
        tune_ids(&[66]),
        fixture.now,
    )?
    .outcome
    .record
    .key;
    let second_key = append(
        &mut fixture.db,
        &fixture.user_id,
        MutationKind::AddToReview,
        tune_ids(&[70]),
        fixture.now,
    )?
    .outcome
    .record
    .key;
    mark_failed(&mut fixture.db, &first_key, "rejected".to_owned(), fixture.now)?;
    mark_failed(&mut fixture.db, &second_key, "rejected".to_owned(), fixture.now)?;
    assert!(fixture.queued_tune_ids()?.is_empty());

    // Only failed records can be retried
    let retried = retry_failed(&mut fixture.db, &fixture.user_id, &first_key, fixture.now)?;
    assert_ne!(first_key, retried.outcome.record.key);
    assert_eq!(MutationState::Pending, retried.outcome.record.state);
    assert_eq!(vec![TuneId::new(66)], fixture.queued_tune_ids()?);
    assert!(matches!(
        retry_failed(&mut fixture.db, &fixture.user_id, &retried.outcome.record.key, fixture.now),
        Err(Error::Input(_))
    ));

    let dismissed = dismiss_failed(&mut fixture.db, &fixture.user_id, &second_key)?;
    assert_eq!(second_key, dismissed.key);
    assert!(load_failed_records(&mut fixture.db, &fixture.user_id)?.is_empty());
    assert_eq!(vec![TuneId::new(66)], fixture.queued_tune_ids()?);
    Ok(())
}

#[test]
fn reschedule_and_reset_interrupted_records() -> TestResult<()> {
    let mut fixture = Fixture::new_seeded()?;
    let key = append(
        &mut fixture.db,
        &fixture.user_id,
        MutationKind::AddToReview,
        tune_ids(&[66]),
        fixture.now,
    )?
    .outcome
    .record
    .key;

    mark_in_flight(&mut fixture.db, &key, fixture.now)?;
    let next_attempt_at = fixture.now.saturating_add_millis(1_000);
    let record = reschedule(
        &mut fixture.db,
        &key,
        next_attempt_at,
        "timeout".to_owned(),
        fixture.now,
    )?;
    assert_eq!(MutationState::Pending, record.state);
    assert_eq!(Some(next_attempt_at), record.next_attempt_at);

    mark_in_flight(&mut fixture.db, &key, fixture.now)?;
    assert!(load_pending_records(&mut fixture.db, &fixture.user_id)?.is_empty());
    assert_eq!(1, reset_in_flight(&mut fixture.db, &fixture.user_id, fixture.now)?);
    let pending = load_pending_records(&mut fixture.db, &fixture.user_id)?;
    assert_eq!(1, pending.len());
    assert_eq!(2, pending[0].attempt_count);
    Ok(())
}

fn append_key(
    fixture: &mut Fixture,
    kind: MutationKind,
    ids: &[i64],
) -> TestResult<IdempotencyKey> {
    let committed = append(
        &mut fixture.db,
        &fixture.user_id,
        kind,
        tune_ids(ids),
        fixture.now,
    )?;
    Ok(committed.outcome.record.key)
}

#[test]
fn failed_review_and_failed_removal_leave_tune_unqueued() -> TestResult<()> {
    let mut fixture = Fixture::new_seeded()?;
    let add_key = append_key(&mut fixture, MutationKind::AddToReview, &[66])?;
    let remove_key = append_key(&mut fixture, MutationKind::RemoveFromReview, &[66])?;
    assert!(fixture.queued_tune_ids()?.is_empty());

    mark_failed(&mut fixture.db, &add_key, "rejected".to_owned(), fixture.now)?;
    assert!(fixture.queued_tune_ids()?.is_empty());
    mark_failed(&mut fixture.db, &remove_key, "rejected".to_owned(), fixture.now)?;
    assert!(fixture.queued_tune_ids()?.is_empty());
    Ok(())
}

#[test]
fn failed_removal_and_failed_review_leave_tune_unqueued() -> TestResult<()> {
    let mut fixture = Fixture::new_seeded()?;
    let add_key = append_key(&mut fixture, MutationKind::AddToReview, &[66])?;
    let remove_key = append_key(&mut fixture, MutationKind::RemoveFromReview, &[66])?;

    // The pending review still asks for the tune to be queued
    mark_failed(&mut fixture.db, &remove_key, "rejected".to_owned(), fixture.now)?;
    assert_eq!(vec![TuneId::new(66)], fixture.queued_tune_ids()?);
    mark_failed(&mut fixture.db, &add_key, "rejected".to_owned(), fixture.now)?;
    assert!(fixture.queued_tune_ids()?.is_empty());
    Ok(())
}

#[test]
fn failed_removal_restores_review_schedule() -> TestResult<()> {
    let mut fixture = Fixture::new_seeded()?;
    let add_key = append_key(&mut fixture, MutationKind::AddToReview, &[66])?;
    mark_in_flight(&mut fixture.db, &add_key, fixture.now)?;
    mark_acknowledged(&mut fixture.db, &add_key, fixture.now)?;

    let reviewed_at = fixture.now.saturating_add_millis(86_400_000);
    let mut reviewed =
        PracticeQueueEntry::new(fixture.user_id.clone(), TuneId::new(66), fixture.now);
    reviewed.schedule.last_reviewed_at = Some(reviewed_at);
    reviewed.schedule.due_at = reviewed_at.saturating_add_millis(14 * 86_400_000);
    reviewed.schedule.interval_days = 14;
    reviewed.schedule.review_count = 5;
    fixture.upsert_queue_entry(&reviewed)?;

    let complete_key = append_key(&mut fixture, MutationKind::CompleteReview, &[66])?;
    assert!(fixture.queued_tune_ids()?.is_empty());
    mark_in_flight(&mut fixture.db, &complete_key, fixture.now)?;
    mark_failed(&mut fixture.db, &complete_key, "rejected".to_owned(), fixture.now)?;

    assert_eq!(reviewed, fixture.load_queue_entry(66)?);
    Ok(())
}

#[test]
fn failed_removal_from_repertoire_restores_added_at() -> TestResult<()> {
    let mut fixture = Fixture::new_seeded()?;
    let added = fixture.load_repertoire_entry(70)?;

    fixture.now = fixture.now.saturating_add_millis(60_000);
    let key = append_key(&mut fixture, MutationKind::RemoveFromRepertoire, &[70])?;
    assert!(fixture.load_repertoire_entry(70).is_err());
    mark_failed(&mut fixture.db, &key, "rejected".to_owned(), fixture.now)?;

    assert_eq!(added, fixture.load_repertoire_entry(70)?);
    Ok(())
}

#[test]
fn failing_a_record_twice_has_no_effect() -> TestResult<()> {
    let mut fixture = Fixture::new_seeded()?;
    let first_key = append_key(&mut fixture, MutationKind::AddToReview, &[66])?;
    mark_failed(&mut fixture.db, &first_key, "rejected".to_owned(), fixture.now)?;
    assert!(fixture.queued_tune_ids()?.is_empty());

    append_key(&mut fixture, MutationKind::AddToReview, &[66])?;
    let settled = mark_failed(&mut fixture.db, &first_key, "late".to_owned(), fixture.now)?;
    assert_eq!(Some("rejected"), settled.outcome.record.failure_reason.as_deref());
    assert_eq!(vec![TuneId::new(66)], fixture.queued_tune_ids()?);

    // Acknowledged records cannot fail
    let acknowledged_key = append_key(&mut fixture, MutationKind::AddToReview, &[70])?;
    mark_in_flight(&mut fixture.db, &acknowledged_key, fixture.now)?;
    mark_acknowledged(&mut fixture.db, &acknowledged_key, fixture.now)?;
    assert!(matches!(
        mark_failed(&mut fixture.db, &acknowledged_key, "late".to_owned(), fixture.now),
        Err(Error::Repository(RepoError::Conflict))
    ));
    Ok(())
}
