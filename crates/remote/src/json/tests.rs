// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use serde_json::json;
use test_log::test;

use super::*;

#[test]
fn encode_mutation_request() -> anyhow::Result<()> {
    let record = _core::MutationRecord::new(
        "u1".into(),
        MutationKind::AddToReview,
        [72, 66, 70].into_iter().map(TuneId::new).collect(),
        UtcDateTimeMs::from_unix_timestamp_millis(1_700_000_000_000),
    );
    let request = MutationRequest::from(&record);
    assert_eq!(
        json!({
            "idempotencyKey": record.key.to_string(),
            "operationKind": "add-to-review",
            "targetIds": [66, 70, 72],
            "userId": "u1",
        }),
        serde_json::to_value(&request)?
    );
    Ok(())
}

#[test]
fn decode_mutation_responses() -> anyhow::Result<()> {
    let acknowledged: MutationResponse = serde_json::from_value(json!({
        "status": "acknowledged",
    }))?;
    assert_eq!(MutationStatus::Acknowledged, acknowledged.status);
    assert_eq!(None, acknowledged.reason);

    let rejected: MutationResponse = serde_json::from_value(json!({
        "status": "rejected",
        "reason": "tune 66 is not in the repertoire",
    }))?;
    assert_eq!(MutationStatus::Rejected, rejected.status);
    assert!(rejected.reason.is_some());
    Ok(())
}

#[test]
fn decode_deltas_response() -> anyhow::Result<()> {
    let response: DeltasResponse = serde_json::from_value(json!({
        "deltas": [
            {
                "revisionId": "r1",
                "entityKind": "genre",
                "entity": { "id": "irish", "name": "Irish Traditional" },
                "op": "upsert",
            },
            {
                "revisionId": "r2",
                "entityKind": "tune",
                "entity": { "id": 66, "title": "The Banshee", "genreId": "irish", "tuneType": "reel" },
                "op": "upsert",
            },
            {
                "revisionId": "r3",
                "entityKind": "practice_queue_entry",
                "entity": {
                    "userId": "u1",
                    "tuneId": 66,
                    "addedAt": 1_700_000_000_000_i64,
                    "dueAt": 1_700_086_400_000_i64,
                    "intervalDays": 1,
                    "reviewCount": 1,
                },
                "op": "upsert",
            },
            {
                "revisionId": "r4",
                "entityKind": "repertoire_entry",
                "entity": { "userId": "u1", "tuneId": 70, "addedAt": 1_700_000_000_000_i64 },
                "op": "delete",
            },
        ],
        "cursor": "c4",
    }))?;
    let batch = _core::DeltaBatch::from(response);
    assert_eq!("c4", batch.cursor);
    assert_eq!(4, batch.deltas.len());

    let _core::DeltaChange::Upsert(_core::Entity::Tune(tune)) = &batch.deltas[1].change else {
        panic!("unexpected change: {:?}", batch.deltas[1].change);
    };
    assert_eq!(TuneId::new(66), tune.id);
    assert_eq!(Some("irish"), tune.genre_id.as_ref().map(|id| id.as_str()));
    assert_eq!(None, tune.mode);

    let _core::DeltaChange::Upsert(_core::Entity::PracticeQueueEntry(entry)) =
        &batch.deltas[2].change
    else {
        panic!("unexpected change: {:?}", batch.deltas[2].change);
    };
    assert_eq!(1, entry.schedule.interval_days);
    assert_eq!(None, entry.schedule.last_reviewed_at);

    assert_eq!(
        _core::DeltaChange::Delete(_core::EntityKey::RepertoireEntry {
            user_id: "u1".into(),
            tune_id: TuneId::new(70),
        }),
        batch.deltas[3].change
    );
    Ok(())
}

#[test]
fn skip_malformed_deltas() -> anyhow::Result<()> {
    let response: DeltasResponse = serde_json::from_value(json!({
        "deltas": [
            {
                "revisionId": "r1",
                "entityKind": "tune",
                "entity": { "title": "Missing id" },
                "op": "upsert",
            },
            {
                "revisionId": "r2",
                "entityKind": "tune",
                "entity": { "id": 66 },
                "op": "delete",
            },
        ],
        "cursor": "c2",
    }))?;
    let batch = _core::DeltaBatch::from(response);
    assert_eq!(1, batch.deltas.len());
    assert_eq!("r2", batch.deltas[0].revision_id.as_str());
    Ok(())
}
