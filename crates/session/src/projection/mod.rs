// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Projections are loaded lazily and cached until a write affects
//! the underlying entities.

use discro::Subscriber;

use tunequeue_core::{
    ChangeSet, PracticeQueue, PracticeQueueEntry, UserId, util::clock::UtcDateTimeMs,
};
use tunequeue_backend_embedded::projection::GenreFacets;

use crate::{Handle, Observable};

/// A cached value.
///
/// The generation is incremented whenever the value is invalidated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cached<T> {
    pub generation: u64,

    pub value: Option<T>,
}

impl<T> Default for Cached<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            value: None,
        }
    }
}

impl<T> Cached<T> {
    fn invalidate(&mut self) -> bool {
        self.generation = self.generation.wrapping_add(1);
        self.value = None;
        true
    }

    fn update(&mut self, generation: u64, value: T) -> bool {
        if self.generation != generation {
            // Outdated
            return false;
        }
        self.value = Some(value);
        true
    }
}

#[derive(Debug, Default)]
pub struct Projections {
    practice_queue: Observable<Cached<Vec<PracticeQueueEntry>>>,
    genre_facets: Observable<Cached<GenreFacets>>,
}

impl Projections {
    /// Invalidate all projections that depend on the changed entities.
    pub fn invalidate(&self, changes: ChangeSet) {
        if changes.intersects(ChangeSet::QUEUE_MEMBERSHIP) {
            log::debug!("Invalidating practice queue");
            self.practice_queue.modify(Cached::invalidate);
        }
        if changes.intersects(ChangeSet::CATALOG) {
            log::debug!("Invalidating genre facets");
            self.genre_facets.modify(Cached::invalidate);
        }
    }

    /// Invalidate the genre facets after a synchronization.
    ///
    /// The state of the facets depends on whether the local store
    /// has ever been synchronized, even if nothing has changed.
    pub fn invalidate_synchronized(&self, changes: ChangeSet) {
        self.invalidate(changes | ChangeSet::GENRE);
    }

    pub fn invalidate_all(&self) {
        self.invalidate(ChangeSet::all());
    }

    #[must_use]
    pub fn subscribe_practice_queue_changed(&self) -> Subscriber<Cached<Vec<PracticeQueueEntry>>> {
        self.practice_queue.subscribe_changed()
    }

    #[must_use]
    pub fn subscribe_genre_facets_changed(&self) -> Subscriber<Cached<GenreFacets>> {
        self.genre_facets.subscribe_changed()
    }

    pub async fn practice_queue(
        &self,
        handle: &Handle,
        user_id: &UserId,
        as_of: UtcDateTimeMs,
    ) -> anyhow::Result<PracticeQueue> {
        let generation = {
            let cached = self.practice_queue.read();
            if let Some(entries) = &cached.value {
                // Only the partitioning into due and upcoming entries depends on `as_of`
                return Ok(PracticeQueue::new(as_of, entries.clone()));
            }
            cached.generation
        };
        let queue = tunequeue_backend_embedded::projection::compute_queue(
            handle.db_gatekeeper(),
            user_id.clone(),
            as_of,
        )
        .await?;
        self.practice_queue
            .modify(|cached| cached.update(generation, queue.entries.clone()));
        Ok(queue)
    }

    pub async fn genre_facets(
        &self,
        handle: &Handle,
        user_id: &UserId,
    ) -> anyhow::Result<GenreFacets> {
        let generation = {
            let cached = self.genre_facets.read();
            if let Some(facets) = &cached.value {
                return Ok(facets.clone());
            }
            cached.generation
        };
        let facets = tunequeue_backend_embedded::projection::available_genres(
            handle.db_gatekeeper(),
            user_id.clone(),
        )
        .await?;
        self.genre_facets
            .modify(|cached| cached.update(generation, facets.clone()));
        Ok(facets)
    }
}

#[cfg(test)]
mod tests;
