// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use diesel::{RunQueryDsl as _, connection::SimpleConnection as _};
use test_log::test;

use tunequeue_core::{ChangeSet, TuneId};
use tunequeue_repo::{
    prelude::*,
    tune::{CatalogFilter, EntityRepo as _},
};

use crate::{DbConnection, prelude::tests::*, repo::tests::new_tune};

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
fn upsert_tune() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let mut db = crate::Connection::new(&mut fixture.db);

    let mut tune = new_tune(66, "The Banshee", Some("irish"));
    assert!(db.upsert_tune(&tune)?);
    assert_eq!(ChangeSet::TUNE, db.take_changes());

    // Unchanged
    assert!(!db.upsert_tune(&tune)?);
    assert!(db.take_changes().is_empty());

    tune.mode = None;
    assert!(db.upsert_tune(&tune)?);
    assert_eq!(tune, db.load_tune(tune.id)?);

    Ok(())
}

#[test]
fn delete_tune() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let mut db = crate::Connection::new(&mut fixture.db);

    let tune = new_tune(70, "Cooley's", None);
    db.upsert_tune(&tune)?;
    assert!(db.tune_exists(tune.id)?);

    db.delete_tune(tune.id)?;
    assert!(!db.tune_exists(tune.id)?);
    assert!(matches!(db.delete_tune(tune.id), Err(RepoError::NotFound)));
    assert!(matches!(db.load_tune(tune.id), Err(RepoError::NotFound)));

    Ok(())
}

#[test]
fn load_tunes_filtered() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let mut db = crate::Connection::new(&mut fixture.db);

    db.upsert_tune(&new_tune(66, "The Banshee", Some("irish")))?;
    db.upsert_tune(&new_tune(70, "Cooley's", Some("irish")))?;
    db.upsert_tune(&new_tune(72, "100% Reel", Some("scottish")))?;
    let mut jig = new_tune(54, "The Kesh", Some("irish"));
    jig.tune_type = Some("jig".to_owned());
    db.upsert_tune(&jig)?;

    let all = db.load_tunes(&CatalogFilter::default(), None)?;
    // Ordered by title
    assert_eq!(
        vec![72, 70, 66, 54],
        all.iter().map(|tune| tune.id.to_inner()).collect::<Vec<_>>()
    );

    let irish_reels = db.load_tunes(
        &CatalogFilter {
            genre_id: Some("irish".into()),
            tune_type: Some("reel".to_owned()),
            title_contains: None,
        },
        None,
    )?;
    assert_eq!(
        vec![70, 66],
        irish_reels
            .iter()
            .map(|tune| tune.id.to_inner())
            .collect::<Vec<_>>()
    );

    // Wildcard characters are matched literally and case is ignored
    let percent = db.load_tunes(
        &CatalogFilter {
            title_contains: Some("0% r".to_owned()),
            ..Default::default()
        },
        None,
    )?;
    assert_eq!(1, percent.len());
    assert_eq!(TuneId::new(72), percent[0].id);
    let underscore = db.load_tunes(
        &CatalogFilter {
            title_contains: Some("_".to_owned()),
            ..Default::default()
        },
        None,
    )?;
    assert!(underscore.is_empty());

    let paginated = db.load_tunes(
        &CatalogFilter::default(),
        Some(&Pagination {
            offset: Some(1),
            limit: Some(2),
        }),
    )?;
    assert_eq!(
        vec![70, 66],
        paginated
            .iter()
            .map(|tune| tune.id.to_inner())
            .collect::<Vec<_>>()
    );

    Ok(())
}

#[test]
fn skip_corrupt_tunes() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    diesel::sql_query("INSERT INTO tune (tune_id, title) VALUES (3497, '  ')")
        .execute(&mut fixture.db)?;
    let mut db = crate::Connection::new(&mut fixture.db);
    db.upsert_tune(&new_tune(55, "Drowsy Maggie", None))?;

    assert!(matches!(
        db.load_tune(TuneId::new(3497)),
        Err(RepoError::CorruptRecord { .. })
    ));
    assert_eq!(1, db.load_tunes(&CatalogFilter::default(), None)?.len());

    // The corrupt row is still examined when paging
    let page = db.load_tunes_after(Some(TuneId::new(55)), 10)?;
    assert!(page.records.is_empty());
    assert_eq!(Some(TuneId::new(3497)), page.last_key);
    let page = db.load_tunes_after(page.last_key, 10)?;
    assert!(page.last_key.is_none());

    // Corrupt rows could be overwritten
    assert!(db.upsert_tune(&new_tune(3497, "Rolling Waves", None))?);
    assert_eq!("Rolling Waves", db.load_tune(TuneId::new(3497))?.title);

    Ok(())
}

#[test]
fn full_storage_keeps_previous_writes() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let tune = new_tune(1, "The Kesh", Some("irish"));
    crate::Connection::new(&mut fixture.db).upsert_tune(&tune)?;

    // Cannot grow beyond the current number of pages
    fixture.db.batch_execute("PRAGMA max_page_count = 1")?;
    let mut db = crate::Connection::new(&mut fixture.db);
    let mut stored_ids = vec![tune.id];
    let mut res = Ok(true);
    for id in 2..1_000 {
        let title = format!("Tune #{id} {padding}", padding = "x".repeat(1_000));
        res = db.upsert_tune(&new_tune(id, &title, None));
        if res.is_err() {
            break;
        }
        stored_ids.push(TuneId::new(id));
    }
    assert!(matches!(res, Err(RepoError::StorageFull)));

    assert_eq!(tune, db.load_tune(tune.id)?);
    for tune_id in stored_ids {
        assert!(db.tune_exists(tune_id)?);
    }
    Ok(())
}
