// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Library core for imap-upload.

// --- Modules ---
pub mod app;
pub mod config;
pub mod error;
pub mod imap;
pub mod models;
pub mod pipeline;
pub mod source;
pub mod utils;

pub mod prelude {
    // Config
    pub use crate::config::{Settings, SettingsError};
    pub use crate::error::AppError;

    // IMAP
    pub use crate::imap::client::{ImapClient, Mailstore};
    pub use crate::imap::error::ImapError;
    pub use crate::imap::types::AppendReceipt;

    // Pipeline
    pub use crate::models::{AppendOutcome, AppendResult, ParsedMetadata, RawMessage};
    pub use crate::pipeline::{AppendPipeline, RunSummary};
    pub use crate::source::{EntryError, MessageSource, SourceError};
    pub use crate::utils::headers::HeaderExtractor;
    pub use crate::utils::internal_date::InternalDate;

    // Common Libs
    pub use log::{debug, error, info, trace, warn};
}
