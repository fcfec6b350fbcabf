// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use serde::{Deserialize, Serialize};

/// What the server handed back for a completed APPEND.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendReceipt {
    /// Completion status, e.g. `OK`.
    pub status: String,
    /// Untagged lines the server sent while the command ran (EXISTS, RECENT, ...).
    pub details: Vec<String>,
}

impl AppendReceipt {
    pub fn ok() -> Self {
        Self {
            status: "OK".to_string(),
            details: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }
}

/// Flag list argument for APPEND built from an extracted label.
pub fn label_flag_list(label: &str) -> String {
    format!("({})", label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_flag_list_is_parenthesized() {
        assert_eq!(label_flag_list("Important"), "(Important)");
    }
}
