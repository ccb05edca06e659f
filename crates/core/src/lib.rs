// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

// Importing all enum variants into a narrow, local scope is acceptable.
#![allow(clippy::enum_glob_use)]

pub mod util;

pub mod entity;
pub use self::entity::{ChangeSet, Entity, EntityKey, EntityKind};

pub mod genre;
pub use self::genre::{Genre, GenreId};

pub mod mutation;
pub use self::mutation::{IdempotencyKey, MutationKind, MutationRecord, MutationState};

pub mod queue;
pub use self::queue::{PracticeQueue, PracticeQueueEntry, ReviewSchedule};

pub mod repertoire;
pub use self::repertoire::RepertoireEntry;

pub mod sync;
pub use self::sync::{Delta, DeltaBatch, DeltaChange, RevisionId, SyncCursor};

pub mod tune;
pub use self::tune::{Tune, TuneId};

mod user;
pub use self::user::UserId;

pub mod prelude {
    // Re-export trait methods from semval
    pub use semval::{IsValid as _, Validate as _};

    pub(crate) use semval::prelude::*;

    pub(crate) use crate::util::clock::*;
}
