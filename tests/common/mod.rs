// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use imap_upload::config::{Settings, SettingsError};
use imap_upload::imap::{AppendReceipt, ImapError, Mailstore};

/// One APPEND as seen by the recording store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedAppend {
    pub mailbox: String,
    pub flags: Option<String>,
    pub internal_date: Option<String>,
    pub message: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct CallLog {
    pub appends: Vec<RecordedAppend>,
    pub logouts: usize,
}

/// Mail store that records every call and rejects messages whose body
/// contains `reject_marker`.
#[derive(Debug, Clone)]
pub struct RecordingMailstore {
    pub log: Arc<Mutex<CallLog>>,
    pub reject_marker: Option<&'static str>,
}

impl RecordingMailstore {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(CallLog::default())),
            reject_marker: None,
        }
    }

    pub fn rejecting(marker: &'static str) -> Self {
        Self {
            reject_marker: Some(marker),
            ..Self::new()
        }
    }
}

#[async_trait]
impl Mailstore for RecordingMailstore {
    async fn append(
        &mut self,
        mailbox: &str,
        flags: Option<&str>,
        internal_date: Option<&str>,
        message: &[u8],
    ) -> Result<AppendReceipt, ImapError> {
        self.log.lock().unwrap().appends.push(RecordedAppend {
            mailbox: mailbox.to_string(),
            flags: flags.map(str::to_string),
            internal_date: internal_date.map(str::to_string),
            message: message.to_vec(),
        });

        let rejected = self.reject_marker.map_or(false, |marker| {
            String::from_utf8_lossy(message).contains(marker)
        });
        if rejected {
            Err(ImapError::Operation("APPEND rejected".to_string()))
        } else {
            Ok(AppendReceipt::ok())
        }
    }

    async fn logout(&mut self) -> Result<(), ImapError> {
        self.log.lock().unwrap().logouts += 1;
        Ok(())
    }
}

pub fn env_map(pairs: &[(&str, &str)]) -> config::Map<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn valid_settings() -> Result<Settings, SettingsError> {
    Settings::from_env_map(
        None,
        env_map(&[
            ("IMAP_HOSTNAME", "imap.example.com"),
            ("IMAP_USERNAME", "alice@example.com"),
            ("IMAP_PASSWORD", "secret"),
            ("IMAP_MAILBOX", "Restored"),
        ]),
    )
}
