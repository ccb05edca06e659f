// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use super::*;

fn targets(ids: &[i64]) -> BTreeSet<TuneId> {
    ids.iter().copied().map(TuneId::new).collect()
}

#[test]
fn kind_string_representation() {
    assert_eq!("add-to-review", MutationKind::AddToReview.as_ref());
    assert_eq!(
        MutationKind::RemoveFromRepertoire,
        "remove-from-repertoire".parse().unwrap()
    );
    assert!("add_to_review".parse::<MutationKind>().is_err());
}

#[test]
fn state_string_representation() {
    assert_eq!("in_flight", MutationState::InFlight.as_ref());
    assert_eq!(MutationState::Acknowledged, "acknowledged".parse().unwrap());
}

#[test]
fn state_transitions() {
    use MutationState::*;
    assert!(Pending.can_transition_to(InFlight));
    assert!(InFlight.can_transition_to(Acknowledged));
    assert!(InFlight.can_transition_to(Pending));
    assert!(InFlight.can_transition_to(Failed));
    assert!(Pending.can_transition_to(Failed));
    // Terminal states
    for next in [Pending, InFlight, Acknowledged, Failed] {
        assert!(!Acknowledged.can_transition_to(next));
        assert!(!Failed.can_transition_to(next));
    }
    assert!(!Pending.can_transition_to(Acknowledged));
}

#[test]
fn only_review_removals_supersede_review() {
    assert!(MutationKind::RemoveFromReview.supersedes_review());
    assert!(MutationKind::CompleteReview.supersedes_review());
    assert!(!MutationKind::RemoveFromRepertoire.supersedes_review());
    assert!(!MutationKind::AddToReview.supersedes_review());
}

#[test]
fn membership_direction_of_kinds() {
    assert!(MutationKind::AddToRepertoire.adds_membership());
    assert!(MutationKind::AddToReview.adds_membership());
    assert!(!MutationKind::RemoveFromRepertoire.adds_membership());
    assert!(!MutationKind::RemoveFromReview.adds_membership());
    assert!(!MutationKind::CompleteReview.adds_membership());
}

#[test]
fn terminal_states() {
    assert!(!MutationState::Pending.is_terminal());
    assert!(!MutationState::InFlight.is_terminal());
    assert!(MutationState::Acknowledged.is_terminal());
    assert!(MutationState::Failed.is_terminal());
}

#[test]
fn validate_removed_entries() {
    let now = UtcDateTimeMs::now();
    let user_id = UserId::from("u1");
    let mut record = MutationRecord::new(
        user_id.clone(),
        MutationKind::RemoveFromReview,
        targets(&[66, 70]),
        now,
    );
    record.effect = targets(&[66]);
    record.removed = vec![Entity::PracticeQueueEntry(
        crate::PracticeQueueEntry::new(user_id.clone(), TuneId::new(66), now),
    )];
    assert!(record.is_valid());
    assert!(record.removed_entry(TuneId::new(66)).is_some());
    assert!(record.removed_entry(TuneId::new(70)).is_none());

    // Not in effect
    record.removed = vec![Entity::PracticeQueueEntry(
        crate::PracticeQueueEntry::new(user_id.clone(), TuneId::new(70), now),
    )];
    assert!(!record.is_valid());

    // Wrong kind of entry
    record.removed = vec![Entity::RepertoireEntry(crate::RepertoireEntry::new(
        user_id,
        TuneId::new(66),
        now,
    ))];
    assert!(!record.is_valid());
}

#[test]
fn idempotency_keys_are_unique_and_parseable() {
    let key1 = IdempotencyKey::new();
    let key2 = IdempotencyKey::new();
    assert_ne!(key1, key2);
    assert_eq!(key1, key1.to_string().parse().unwrap());
}

#[test]
fn validate_record() {
    let now = UtcDateTimeMs::now();
    let mut record = MutationRecord::new(
        UserId::from("u1"),
        MutationKind::AddToReview,
        targets(&[66, 70, 72]),
        now,
    );
    assert!(record.is_valid());

    record.effect = targets(&[66, 3497]);
    assert!(!record.is_valid());
    record.effect = targets(&[66]);
    assert!(record.is_valid());

    record.state = MutationState::Acknowledged;
    assert!(!record.is_valid());
    record.attempt_count = 1;
    assert!(record.is_valid());

    record.targets.clear();
    record.effect.clear();
    assert!(!record.is_valid());
}
