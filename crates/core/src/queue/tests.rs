// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use super::*;

fn entry(tune_id: i64, due_at_ms: i64) -> PracticeQueueEntry {
    let added_at = UtcDateTimeMs::from_unix_timestamp_millis(0);
    let mut entry = PracticeQueueEntry::new(UserId::from("u1"), TuneId::new(tune_id), added_at);
    entry.schedule.due_at = UtcDateTimeMs::from_unix_timestamp_millis(due_at_ms);
    entry
}

#[test]
fn new_entry_is_due_immediately() {
    let added_at = UtcDateTimeMs::now();
    let entry = PracticeQueueEntry::new(UserId::from("u1"), TuneId::new(66), added_at);
    assert!(entry.schedule.is_due(added_at));
    assert_eq!(0, entry.schedule.review_count);
    assert!(entry.schedule.is_valid());
}

#[test]
fn order_by_due_date_then_tune_id() {
    let queue = PracticeQueue::new(
        UtcDateTimeMs::from_unix_timestamp_millis(150),
        vec![entry(72, 100), entry(70, 200), entry(66, 100), entry(54, 50)],
    );
    assert_eq!(
        vec![54, 66, 72, 70],
        queue.tune_ids().map(TuneId::to_inner).collect::<Vec<_>>()
    );
}

#[test]
fn partition_into_due_and_upcoming() {
    let queue = PracticeQueue::new(
        UtcDateTimeMs::from_unix_timestamp_millis(100),
        vec![entry(3, 101), entry(2, 100), entry(1, 99)],
    );
    assert_eq!(3, queue.len());
    assert_eq!(
        vec![1, 2],
        queue
            .due_entries()
            .map(|entry| entry.tune_id.to_inner())
            .collect::<Vec<_>>()
    );
    assert_eq!(
        vec![3],
        queue
            .upcoming_entries()
            .map(|entry| entry.tune_id.to_inner())
            .collect::<Vec<_>>()
    );
}

#[test]
fn validate_schedule() {
    let reviewed_at = UtcDateTimeMs::from_unix_timestamp_millis(1_000);
    let mut schedule = ReviewSchedule::initial(reviewed_at);
    assert!(schedule.is_valid());
    schedule.last_reviewed_at = Some(reviewed_at);
    assert!(!schedule.is_valid());
    schedule.review_count = 1;
    assert!(schedule.is_valid());
    schedule.due_at = UtcDateTimeMs::from_unix_timestamp_millis(999);
    assert!(!schedule.is_valid());
}
