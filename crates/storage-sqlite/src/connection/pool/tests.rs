// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

use diesel::connection::SimpleConnection as _;

use super::*;

fn enable_foreign_keys(connection: &mut SqliteConnection) -> QueryResult<()> {
    connection.batch_execute("PRAGMA foreign_keys = 1;")
}

const CREATE_TABLES: &str = r"
CREATE TABLE parent (id INTEGER PRIMARY KEY NOT NULL);
CREATE TABLE child (
    id INTEGER PRIMARY KEY NOT NULL,
    parent_id INTEGER NOT NULL,
    FOREIGN KEY (parent_id) REFERENCES parent(id)
);
";

#[test]
fn in_memory_pool_keeps_a_single_database() -> anyhow::Result<()> {
    let pool = create_connection_pool(&Storage::InMemory, 4u32.try_into()?, None)?;
    assert_eq!(1, pool.max_size());
    get_pooled_connection(&pool)?.batch_execute(CREATE_TABLES)?;
    // The table is visible through the next connection
    get_pooled_connection(&pool)?.batch_execute("INSERT INTO parent (id) VALUES (1);")?;
    Ok(())
}

#[test]
fn initialize_each_pooled_connection() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let storage = Storage::File {
        path: dir.path().join("test.sqlite"),
    };
    let pool = create_connection_pool(
        &storage,
        2u32.try_into()?,
        Some(InitConnection(enable_foreign_keys)),
    )?;
    assert_eq!(2, pool.max_size());
    let mut first = get_pooled_connection(&pool)?;
    let mut second = get_pooled_connection(&pool)?;
    first.batch_execute(CREATE_TABLES)?;
    assert!(
        second
            .batch_execute("INSERT INTO child (id, parent_id) VALUES (1, 1);")
            .is_err()
    );
    Ok(())
}

#[test]
fn fail_early_on_inaccessible_file() {
    let storage = Storage::File {
        path: "/nonexistent/directory/test.sqlite".into(),
    };
    assert!(create_connection_pool(&storage, DEFAULT_MAX_SIZE, None).is_err());
}
