// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

macro_rules! record_id_newtype {
    ($type_name:ident) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $type_name($crate::RecordId);

        impl $type_name {
            #[must_use]
            pub const fn new(inner: $crate::RecordId) -> Self {
                Self(inner)
            }

            #[must_use]
            pub const fn to_inner(self) -> $crate::RecordId {
                let Self(inner) = self;
                inner
            }
        }

        impl From<$crate::RecordId> for $type_name {
            fn from(from: $crate::RecordId) -> Self {
                Self::new(from)
            }
        }

        impl From<$type_name> for $crate::RecordId {
            fn from(from: $type_name) -> Self {
                from.to_inner()
            }
        }
    };
}

/// Keyed access to the entries of a single user that relate
/// tunes to that user.
macro_rules! user_tune_entry_repo_trait_common_functions {
    ($entry_type:ty, $entry_name:ident, $entries_name:ident) => {
        paste::paste! {
            fn [<load_ $entry_name>](
                &mut self,
                user_id: &tunequeue_core::UserId,
                tune_id: tunequeue_core::TuneId,
            ) -> $crate::prelude::RepoResult<$entry_type>;

            fn [<contains_ $entry_name>](
                &mut self,
                user_id: &tunequeue_core::UserId,
                tune_id: tunequeue_core::TuneId,
            ) -> $crate::prelude::RepoResult<bool> {
                use $crate::prelude::OptionalRepoResult as _;
                self.[<load_ $entry_name>](user_id, tune_id)
                    .optional()
                    .map(|entry| entry.is_some())
            }

            /// Load all entries of a user, ordered by tune id.
            fn [<load_ $entries_name>](
                &mut self,
                user_id: &tunequeue_core::UserId,
            ) -> $crate::prelude::RepoResult<Vec<$entry_type>>;

            /// Load the next page of entries of all users, ordered by
            /// (user id, tune id) and starting after the given key.
            fn [<load_ $entries_name _after>](
                &mut self,
                after: Option<(&tunequeue_core::UserId, tunequeue_core::TuneId)>,
                limit: $crate::prelude::PaginationLimit,
            ) -> $crate::prelude::RepoResult<
                $crate::prelude::KeysetPage<$entry_type, (tunequeue_core::UserId, tunequeue_core::TuneId)>,
            >;
        }
    };
}
