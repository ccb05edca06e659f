// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use test_log::test;

use tunequeue_core::{
    ChangeSet, PracticeQueueEntry, RepertoireEntry, TuneId, UserId, util::clock::UtcDateTimeMs,
};
use tunequeue_repo::{prelude::*, queue::EntryRepo as _, repertoire::EntryRepo as _};

use crate::{DbConnection, prelude::tests::*};

struct Fixture {
    db: DbConnection,
}

impl Fixture {
    fn new() -> TestResult<Self> {
        let db = establish_connection()?;
        Ok(Self { db })
    }
}

#[test]
fn queue_requires_repertoire() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let mut db = crate::Connection::new(&mut fixture.db);

    let user_id = UserId::from("u1");
    let added_at = UtcDateTimeMs::now();
    let entry = PracticeQueueEntry::new(user_id.clone(), TuneId::new(66), added_at);

    assert!(matches!(
        db.insert_practice_queue_entry(&entry),
        Err(RepoError::InvariantViolation(_))
    ));
    assert!(matches!(
        db.upsert_practice_queue_entry(&entry),
        Err(RepoError::InvariantViolation(_))
    ));
    assert!(db.take_changes().is_empty());

    db.insert_repertoire_entry(&RepertoireEntry::new(
        user_id.clone(),
        TuneId::new(66),
        added_at,
    ))?;
    assert!(db.insert_practice_queue_entry(&entry)?);
    // Already queued
    assert!(!db.insert_practice_queue_entry(&entry)?);
    assert_eq!(ChangeSet::QUEUE_MEMBERSHIP, db.take_changes());
    assert_eq!(entry, db.load_practice_queue_entry(&user_id, TuneId::new(66))?);

    Ok(())
}

#[test]
fn upsert_and_delete_queue_entry() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let mut db = crate::Connection::new(&mut fixture.db);

    let user_id = UserId::from("u1");
    let added_at = UtcDateTimeMs::from_unix_timestamp_millis(1_700_000_000_000);
    db.insert_repertoire_entry(&RepertoireEntry::new(
        user_id.clone(),
        TuneId::new(70),
        added_at,
    ))?;
    let mut entry = PracticeQueueEntry::new(user_id.clone(), TuneId::new(70), added_at);
    db.upsert_practice_queue_entry(&entry)?;

    entry.schedule.last_reviewed_at = Some(added_at.saturating_add_days(1));
    entry.schedule.due_at = added_at.saturating_add_days(3);
    entry.schedule.interval_days = 2;
    entry.schedule.review_count = 1;
    db.upsert_practice_queue_entry(&entry)?;
    assert_eq!(vec![entry], db.load_practice_queue_entries(&user_id)?);

    assert!(db.delete_practice_queue_entry(&user_id, TuneId::new(70))?);
    assert!(!db.delete_practice_queue_entry(&user_id, TuneId::new(70))?);
    // The repertoire entry is not affected
    assert!(db.contains_repertoire_entry(&user_id, TuneId::new(70))?);

    Ok(())
}
