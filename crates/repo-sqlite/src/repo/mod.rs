// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

pub mod genre;
pub mod mutation;
pub mod quarantine;
pub mod queue;
pub mod repertoire;
pub mod sync;
pub mod tune;
