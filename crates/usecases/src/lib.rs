// SPDX-FileCopyrightText: Copyright (C) 2024-2026 The tunequeue authors
// SPDX-License-Identifier: AGPL-3.0-or-later

// Importing all enum variants into a narrow, local scope is acceptable.
#![allow(clippy::enum_glob_use)]

use std::result::Result as StdResult;

use thiserror::Error;

use tunequeue_repo::prelude::*;

pub mod catalog;
pub mod mutation;
pub mod projection;
pub mod seed;
pub mod sync;

#[derive(Error, Debug)]
#[error(transparent)]
pub struct InputError(#[from] pub anyhow::Error);

pub type InputResult<T> = StdResult<T, InputError>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Repository(#[from] RepoError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = StdResult<T, Error>;
