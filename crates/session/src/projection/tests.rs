// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use test_log::test;

use tunequeue_backend_embedded::projection::GenreFacetsState;
use tunequeue_core::TuneId;

use super::*;

fn cached_queue_entry() -> PracticeQueueEntry {
    PracticeQueueEntry::new(
        "u1".into(),
        TuneId::new(66),
        UtcDateTimeMs::from_unix_timestamp_millis(1_700_000_000_000),
    )
}

#[test]
fn discard_outdated_values() {
    let mut cached = Cached::default();
    let generation = cached.generation;
    assert!(cached.invalidate());
    assert!(!cached.update(generation, 1));
    assert_eq!(None, cached.value);

    assert!(cached.update(cached.generation, 2));
    assert_eq!(Some(2), cached.value);
}

#[test]
fn invalidate_only_affected_projections() {
    let projections = Projections::default();
    projections
        .practice_queue
        .modify(|cached| cached.update(0, vec![cached_queue_entry()]));
    projections
        .genre_facets
        .modify(|cached| cached.update(0, GenreFacets::loading()));

    projections.invalidate(ChangeSet::TUNE);
    assert!(projections.practice_queue.read().value.is_some());
    assert!(projections.genre_facets.read().value.is_none());

    projections.invalidate(ChangeSet::REPERTOIRE_ENTRY);
    assert!(projections.practice_queue.read().value.is_none());
}

#[test]
fn synchronization_invalidates_genre_facets() {
    let projections = Projections::default();
    projections
        .genre_facets
        .modify(|cached| cached.update(0, GenreFacets::loading()));
    assert_eq!(
        Some(GenreFacetsState::Loading),
        projections
            .genre_facets
            .read()
            .value
            .as_ref()
            .map(|facets| facets.state)
    );

    projections.invalidate_synchronized(ChangeSet::empty());
    assert!(projections.genre_facets.read().value.is_none());
}
