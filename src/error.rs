// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::config::SettingsError;
use crate::imap::error::ImapError;
use crate::source::SourceError;

/// Process exit statuses.
pub const EXIT_CONFIG: i32 = 1;
pub const EXIT_CONNECTION: i32 = 2;
pub const EXIT_INPUT_DIR: i32 = 3;

/// Conditions that end a run before or instead of uploading anything.
///
/// Per-message failures are never represented here; they live in each
/// message's result record.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Config(#[from] SettingsError),

    #[error("{0}")]
    Source(#[from] SourceError),

    #[error("Could not connect to server: {0}")]
    Connection(#[from] ImapError),
}

impl AppError {
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Config(_) => EXIT_CONFIG,
            AppError::Connection(_) => EXIT_CONNECTION,
            AppError::Source(_) => EXIT_INPUT_DIR,
        }
    }
}
