// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Uniform keyed access to all kinds of entities.

use std::collections::VecDeque;

use anyhow::anyhow;
use tunequeue_core::{Entity, EntityKey, EntityKind, GenreId, TuneId, UserId};

use crate::{genre, prelude::*, queue, repertoire, tune};

pub const DEFAULT_SCAN_PAGE_SIZE: PaginationLimit = 100;

pub trait EntityStore {
    fn get(&mut self, key: &EntityKey) -> RepoResult<Entity>;

    fn put(&mut self, entity: &Entity) -> RepoResult<()>;

    /// Fails with [`RepoError::NotFound`] if the entity does not exist.
    fn delete(&mut self, key: &EntityKey) -> RepoResult<()>;

    /// Fetch the next page of entities of a single kind, ordered by key.
    fn fetch_page(
        &mut self,
        kind: EntityKind,
        after: Option<&EntityKey>,
        limit: PaginationLimit,
    ) -> RepoResult<KeysetPage<Entity, EntityKey>>;

    /// Lazily iterate over all entities of a kind that match
    /// the predicate.
    fn scan<P>(&mut self, kind: EntityKind, predicate: P) -> Scan<'_, Self, P>
    where
        Self: Sized,
        P: FnMut(&Entity) -> bool,
    {
        Scan::new(self, kind, predicate)
    }
}

fn user_tune_key(key: Option<&EntityKey>) -> Option<(&UserId, TuneId)> {
    key.and_then(|key| key.user_id().zip(key.tune_id()))
}

fn check_scan_key(kind: EntityKind, after: Option<&EntityKey>) -> RepoResult<()> {
    match after {
        Some(key) if key.kind() != kind => Err(anyhow!("cannot scan {kind} after {key}").into()),
        _ => Ok(()),
    }
}

impl<T> EntityStore for T
where
    T: tune::EntityRepo + genre::EntityRepo + repertoire::EntryRepo + queue::EntryRepo,
{
    fn get(&mut self, key: &EntityKey) -> RepoResult<Entity> {
        match key {
            EntityKey::Tune { tune_id } => self.load_tune(*tune_id).map(Entity::Tune),
            EntityKey::Genre { genre_id } => self.load_genre(genre_id).map(Entity::Genre),
            EntityKey::RepertoireEntry { user_id, tune_id } => self
                .load_repertoire_entry(user_id, *tune_id)
                .map(Entity::RepertoireEntry),
            EntityKey::PracticeQueueEntry { user_id, tune_id } => self
                .load_practice_queue_entry(user_id, *tune_id)
                .map(Entity::PracticeQueueEntry),
        }
    }

    fn put(&mut self, entity: &Entity) -> RepoResult<()> {
        match entity {
            Entity::Tune(tune) => self.upsert_tune(tune).map(|_| ()),
            Entity::Genre(genre) => self.upsert_genre(genre).map(|_| ()),
            Entity::RepertoireEntry(entry) => self.upsert_repertoire_entry(entry),
            Entity::PracticeQueueEntry(entry) => self.upsert_practice_queue_entry(entry),
        }
    }

    fn delete(&mut self, key: &EntityKey) -> RepoResult<()> {
        let deleted = match key {
            EntityKey::Tune { tune_id } => return self.delete_tune(*tune_id),
            EntityKey::Genre { genre_id } => return self.delete_genre(genre_id),
            EntityKey::RepertoireEntry { user_id, tune_id } => {
                self.delete_repertoire_entry(user_id, *tune_id)?
            }
            EntityKey::PracticeQueueEntry { user_id, tune_id } => {
                self.delete_practice_queue_entry(user_id, *tune_id)?
            }
        };
        if deleted {
            Ok(())
        } else {
            Err(RepoError::NotFound)
        }
    }

    fn fetch_page(
        &mut self,
        kind: EntityKind,
        after: Option<&EntityKey>,
        limit: PaginationLimit,
    ) -> RepoResult<KeysetPage<Entity, EntityKey>> {
        check_scan_key(kind, after)?;
        let page = match kind {
            EntityKind::Tune => {
                let KeysetPage { records, last_key } =
                    self.load_tunes_after(after.and_then(EntityKey::tune_id), limit)?;
                KeysetPage {
                    records: records.into_iter().map(Entity::Tune).collect(),
                    last_key: last_key.map(|tune_id| EntityKey::Tune { tune_id }),
                }
            }
            EntityKind::Genre => {
                let after = after.and_then(|key| match key {
                    EntityKey::Genre { genre_id } => Some(genre_id),
                    _ => None,
                });
                let KeysetPage { records, last_key } = self.load_genres_after(after, limit)?;
                KeysetPage {
                    records: records.into_iter().map(Entity::Genre).collect(),
                    last_key: last_key.map(|genre_id: GenreId| EntityKey::Genre { genre_id }),
                }
            }
            EntityKind::RepertoireEntry => {
                let KeysetPage { records, last_key } =
                    self.load_repertoire_entries_after(user_tune_key(after), limit)?;
                KeysetPage {
                    records: records.into_iter().map(Entity::RepertoireEntry).collect(),
                    last_key: last_key
                        .map(|(user_id, tune_id)| EntityKey::RepertoireEntry { user_id, tune_id }),
                }
            }
            EntityKind::PracticeQueueEntry => {
                let KeysetPage { records, last_key } =
                    self.load_practice_queue_entries_after(user_tune_key(after), limit)?;
                KeysetPage {
                    records: records
                        .into_iter()
                        .map(Entity::PracticeQueueEntry)
                        .collect(),
                    last_key: last_key.map(|(user_id, tune_id)| {
                        EntityKey::PracticeQueueEntry { user_id, tune_id }
                    }),
                }
            }
        };
        Ok(page)
    }
}

/// A lazy, finite sequence of entities.
///
/// Pages are fetched on demand in key order. Entities that have been
/// written or deleted behind the current position during the scan
/// are not visited again.
#[allow(missing_debug_implementations)]
pub struct Scan<'s, S, P> {
    store: &'s mut S,
    kind: EntityKind,
    predicate: P,
    page_size: PaginationLimit,
    last_key: Option<EntityKey>,
    buffered: VecDeque<Entity>,
    exhausted: bool,
}

impl<'s, S, P> Scan<'s, S, P>
where
    S: EntityStore,
    P: FnMut(&Entity) -> bool,
{
    pub fn new(store: &'s mut S, kind: EntityKind, predicate: P) -> Self {
        Self {
            store,
            kind,
            predicate,
            page_size: DEFAULT_SCAN_PAGE_SIZE,
            last_key: None,
            buffered: VecDeque::new(),
            exhausted: false,
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: PaginationLimit) -> Self {
        debug_assert!(page_size > 0);
        self.page_size = page_size.max(1);
        self
    }

    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Start over from the first entity.
    pub fn restart(&mut self) {
        self.last_key = None;
        self.buffered.clear();
        self.exhausted = false;
    }

    fn fetch_next_page(&mut self) -> RepoResult<()> {
        debug_assert!(self.buffered.is_empty());
        let KeysetPage { records, last_key } =
            self.store
                .fetch_page(self.kind, self.last_key.as_ref(), self.page_size)?;
        if last_key.is_none() {
            self.exhausted = true;
        } else {
            self.last_key = last_key;
        }
        self.buffered.extend(records);
        Ok(())
    }
}

impl<S, P> Iterator for Scan<'_, S, P>
where
    S: EntityStore,
    P: FnMut(&Entity) -> bool,
{
    type Item = RepoResult<Entity>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            while let Some(entity) = self.buffered.pop_front() {
                if (self.predicate)(&entity) {
                    return Some(Ok(entity));
                }
            }
            if self.exhausted {
                return None;
            }
            if let Err(err) = self.fetch_next_page() {
                // Stop after the first error. The scan could be restarted.
                self.exhausted = true;
                return Some(Err(err));
            }
        }
    }
}
