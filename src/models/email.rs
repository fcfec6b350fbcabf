// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::internal_date::InternalDate;

/// A message file as read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Metadata recovered from a message's headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedMetadata {
    pub normalized_date: Option<InternalDate>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum AppendOutcome {
    Success { status: String, details: Vec<String> },
    Failure { error: String },
}

impl AppendOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AppendOutcome::Success { .. })
    }
}

/// One record per directory entry, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendResult {
    pub filename: String,
    pub date: Option<InternalDate>,
    pub outcome: AppendOutcome,
}

impl fmt::Display for AppendResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} date=", self.filename)?;
        match &self.date {
            Some(date) => write!(f, "{}", date)?,
            None => f.write_str("none")?,
        }
        match &self.outcome {
            AppendOutcome::Success { status, details } if details.is_empty() => {
                write!(f, " {}", status)
            }
            AppendOutcome::Success { status, details } => {
                write!(f, " {} [{}]", status, details.join("; "))
            }
            AppendOutcome::Failure { error } => write!(f, " FAILED: {}", error),
        }
    }
}
