// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Read-only views derived from the local entities.

use tunequeue_core::{Genre, PracticeQueue, UserId, util::clock::UtcDateTimeMs};
use tunequeue_repo::{
    genre::EntityRepo as GenreRepo, queue::EntryRepo as QueueRepo, sync::SyncRepo,
};

use super::*;

use crate::sync::is_synchronized;

/// The practice queue of a user, earliest due date first.
pub fn compute_queue<Repo>(
    repo: &mut Repo,
    user_id: &UserId,
    as_of: UtcDateTimeMs,
) -> RepoResult<PracticeQueue>
where
    Repo: QueueRepo,
{
    let entries = repo.load_practice_queue_entries(user_id)?;
    Ok(PracticeQueue::new(as_of, entries))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenreFacetsState {
    /// The catalog has not been received yet.
    Loading,

    /// No tune of the catalog refers to a known genre.
    Empty,

    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreFacets {
    pub state: GenreFacetsState,

    /// Ordered by name.
    pub genres: Vec<Genre>,
}

impl GenreFacets {
    #[must_use]
    pub const fn loading() -> Self {
        Self {
            state: GenreFacetsState::Loading,
            genres: Vec::new(),
        }
    }
}

/// Genres that are available for filtering the catalog.
pub fn available_genres<Repo>(repo: &mut Repo, user_id: &UserId) -> RepoResult<GenreFacets>
where
    Repo: GenreRepo + SyncRepo,
{
    if !is_synchronized(repo, user_id)? {
        return Ok(GenreFacets::loading());
    }
    let genres = repo.load_referenced_genres()?;
    let state = if genres.is_empty() {
        GenreFacetsState::Empty
    } else {
        GenreFacetsState::Ready
    };
    Ok(GenreFacets { state, genres })
}
