// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Per-message append orchestration.
//!
//! Each sourced message goes through header extraction, date normalization
//! and one `APPEND` on the shared session. A failure for one message is
//! recorded in its [`AppendResult`] and the next message is processed as
//! usual.

use async_stream::stream;
use futures_util::{pin_mut, Stream, StreamExt};
use log::{debug, warn};
use serde::Serialize;
use std::fmt;

use crate::config::Settings;
use crate::imap::client::Mailstore;
use crate::imap::types::label_flag_list;
use crate::models::{AppendOutcome, AppendResult, ParsedMetadata, RawMessage};
use crate::source::EntryError;
use crate::utils::headers::HeaderExtractor;
use crate::utils::internal_date::{self, InternalDate};

/// Owns the session for the duration of a run.
pub struct AppendPipeline<M: Mailstore> {
    store: M,
    mailbox: String,
    extractor: HeaderExtractor,
}

impl<M: Mailstore> AppendPipeline<M> {
    pub fn new(store: M, settings: &Settings) -> Self {
        Self {
            store,
            mailbox: settings.mailbox.clone(),
            extractor: HeaderExtractor::new(&settings.label_header),
        }
    }

    pub fn mailbox(&self) -> &str {
        &self.mailbox
    }

    /// Date and label recovered from the message headers, if any.
    pub fn metadata(&self, message: &[u8]) -> ParsedMetadata {
        let headers = self.extractor.extract(message);
        ParsedMetadata {
            normalized_date: headers.date.as_deref().and_then(internal_date::normalize),
            label: headers.label,
        }
    }

    /// Appends one message and reports how it went.
    pub async fn append_message(&mut self, message: RawMessage) -> AppendResult {
        let metadata = self.metadata(&message.bytes);
        let flags = metadata.label.as_deref().map(label_flag_list);
        let date = metadata.normalized_date.as_ref().map(InternalDate::as_str);

        debug!(
            "APPEND {} to {} (date: {:?}, flags: {:?})",
            message.filename, self.mailbox, date, flags
        );

        let outcome = match self
            .store
            .append(&self.mailbox, flags.as_deref(), date, &message.bytes)
            .await
        {
            Ok(receipt) => AppendOutcome::Success {
                status: receipt.status,
                details: receipt.details,
            },
            Err(e) => AppendOutcome::Failure {
                error: e.to_string(),
            },
        };

        AppendResult {
            filename: message.filename,
            date: metadata.normalized_date,
            outcome,
        }
    }

    /// Handles one item from the source; unreadable entries are recorded
    /// without an append attempt.
    pub async fn process(&mut self, item: Result<RawMessage, EntryError>) -> AppendResult {
        match item {
            Ok(message) => self.append_message(message).await,
            Err(entry_error) => failed_entry(entry_error),
        }
    }

    /// Lazily appends every message of `source`, yielding results in order.
    pub fn append_all<'a, I>(&'a mut self, source: I) -> impl Stream<Item = AppendResult> + 'a
    where
        I: IntoIterator<Item = Result<RawMessage, EntryError>> + 'a,
    {
        stream! {
            for item in source {
                yield self.process(item).await;
            }
        }
    }

    /// Drives [`append_all`](Self::append_all) to completion, handing each
    /// result to `report` as soon as it is known.
    pub async fn run<I, F>(&mut self, source: I, mut report: F) -> RunSummary
    where
        I: IntoIterator<Item = Result<RawMessage, EntryError>>,
        F: FnMut(&AppendResult),
    {
        let results = self.append_all(source);
        pin_mut!(results);

        let mut summary = RunSummary::default();
        while let Some(result) = results.next().await {
            summary.record(&result);
            report(&result);
        }
        summary
    }

    /// Logs out and hands the store back. A failed logout is only logged.
    pub async fn close(mut self) -> M {
        if let Err(e) = self.store.logout().await {
            warn!("Logout failed: {}", e);
        }
        self.store
    }
}

fn failed_entry(entry_error: EntryError) -> AppendResult {
    let error = entry_error.to_string();
    AppendResult {
        filename: entry_error.filename,
        date: None,
        outcome: AppendOutcome::Failure { error },
    }
}

/// Totals for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub appended: usize,
    pub failed: usize,
    /// Messages sent without an explicit date.
    pub undated: usize,
}

impl RunSummary {
    pub fn record(&mut self, result: &AppendResult) {
        self.total += 1;
        if result.outcome.is_success() {
            self.appended += 1;
        } else {
            self.failed += 1;
        }
        if result.date.is_none() {
            self.undated += 1;
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} messages: {} appended, {} failed, {} without date",
            self.total, self.appended, self.failed, self.undated
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imap::error::ImapError;
    use crate::imap::types::AppendReceipt;
    use async_trait::async_trait;
    use std::io;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct AppendCall {
        mailbox: String,
        flags: Option<String>,
        internal_date: Option<String>,
        message: Vec<u8>,
    }

    #[derive(Debug, Default)]
    struct FakeStore {
        calls: Vec<AppendCall>,
        // Zero-based call indices that get a NO response.
        rejected_calls: Vec<usize>,
        logout_called: bool,
        logout_fails: bool,
    }

    #[async_trait]
    impl Mailstore for FakeStore {
        async fn append(
            &mut self,
            mailbox: &str,
            flags: Option<&str>,
            internal_date: Option<&str>,
            message: &[u8],
        ) -> Result<AppendReceipt, ImapError> {
            let index = self.calls.len();
            self.calls.push(AppendCall {
                mailbox: mailbox.to_string(),
                flags: flags.map(str::to_string),
                internal_date: internal_date.map(str::to_string),
                message: message.to_vec(),
            });
            if self.rejected_calls.contains(&index) {
                return Err(ImapError::Operation("[OVERQUOTA] mailbox full".to_string()));
            }
            Ok(AppendReceipt::ok().with_details(vec![format!("{} EXISTS", index + 1)]))
        }

        async fn logout(&mut self) -> Result<(), ImapError> {
            self.logout_called = true;
            if self.logout_fails {
                Err(ImapError::Io("connection reset".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn settings() -> Settings {
        let env: config::Map<String, String> = [
            ("IMAP_HOSTNAME", "imap.example.com"),
            ("IMAP_USERNAME", "alice"),
            ("IMAP_MAILBOX", "Imported"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Settings::from_env_map(None, env).unwrap()
    }

    fn message(name: &str, body: &str) -> Result<RawMessage, EntryError> {
        Ok(RawMessage {
            filename: name.to_string(),
            bytes: body.as_bytes().to_vec(),
        })
    }

    #[tokio::test]
    async fn test_date_and_label_are_passed_to_append() {
        let mut pipeline = AppendPipeline::new(FakeStore::default(), &settings());
        assert_eq!(pipeline.mailbox(), "Imported");
        let result = pipeline
            .append_message(RawMessage {
                filename: "labelled.eml".to_string(),
                bytes: b"X-GMAIL-LABELS: \"\\Important\"\r\nDate: Mon, 2 Jan 2006 15:04:05 -0700\r\n\r\nhi".to_vec(),
            })
            .await;

        assert_eq!(
            result.date.as_ref().map(InternalDate::as_str),
            Some("\"02-Jan-2006 22:04:05 +0000\"")
        );
        assert!(result.outcome.is_success());

        let store = pipeline.close().await;
        assert_eq!(store.calls.len(), 1);
        let call = &store.calls[0];
        assert_eq!(call.mailbox, "Imported");
        assert_eq!(call.flags.as_deref(), Some("(Important)"));
        assert_eq!(call.internal_date.as_deref(), Some("\"02-Jan-2006 22:04:05 +0000\""));
        assert!(call.message.ends_with(b"\r\n\r\nhi"));
    }

    #[tokio::test]
    async fn test_missing_or_bad_date_appends_without_date() {
        let mut pipeline = AppendPipeline::new(FakeStore::default(), &settings());
        pipeline
            .run(
                vec![
                    message("nodate.eml", "Subject: x\n\nbody"),
                    message("baddate.eml", "Date: Mon, 31 Feb 2006 15:04:05 -0700\n\nbody"),
                ],
                |_| {},
            )
            .await;

        let store = pipeline.close().await;
        assert_eq!(store.calls.len(), 2);
        assert!(store.calls.iter().all(|c| c.internal_date.is_none()));
        assert!(store.calls.iter().all(|c| c.flags.is_none()));
    }

    #[tokio::test]
    async fn test_one_rejection_does_not_stop_the_batch() {
        let store = FakeStore {
            rejected_calls: vec![1],
            ..FakeStore::default()
        };
        let mut pipeline = AppendPipeline::new(store, &settings());

        let mut seen = Vec::new();
        let summary = pipeline
            .run(
                vec![
                    message("1.eml", "Date: Mon, 2 Jan 2006 15:04:05 -0700\n\n"),
                    message("2.eml", "Date: Tue, 3 Jan 2006 15:04:05 -0700\n\n"),
                    message("3.eml", "Subject: undated\n\n"),
                ],
                |result| seen.push(result.clone()),
            )
            .await;

        let names: Vec<&str> = seen.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, vec!["1.eml", "2.eml", "3.eml"]);
        assert!(seen[0].outcome.is_success());
        assert!(matches!(
            &seen[1].outcome,
            AppendOutcome::Failure { error } if error.contains("OVERQUOTA")
        ));
        assert!(seen[2].outcome.is_success());
        assert_eq!(
            summary,
            RunSummary {
                total: 3,
                appended: 2,
                failed: 1,
                undated: 1
            }
        );

        let store = pipeline.close().await;
        assert_eq!(store.calls.len(), 3);
    }

    #[tokio::test]
    async fn test_unreadable_entry_is_recorded_without_append() {
        let mut pipeline = AppendPipeline::new(FakeStore::default(), &settings());
        let unreadable = Err(EntryError {
            filename: "locked.eml".to_string(),
            error: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        });

        let mut seen = Vec::new();
        pipeline
            .run(vec![unreadable, message("ok.eml", "x")], |r| seen.push(r.clone()))
            .await;

        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].filename, "locked.eml");
        assert!(matches!(
            &seen[0].outcome,
            AppendOutcome::Failure { error } if error.contains("permission denied")
        ));
        let store = pipeline.close().await;
        assert_eq!(store.calls.len(), 1);
    }

    #[tokio::test]
    async fn test_stream_is_lazy_and_ordered() {
        let mut pipeline = AppendPipeline::new(FakeStore::default(), &settings());
        {
            let results = pipeline.append_all(vec![message("a", "x"), message("b", "y")]);
            pin_mut!(results);
            let first = results.next().await.unwrap();
            assert_eq!(first.filename, "a");
        }
        // Dropping the stream early leaves the second message untouched.
        let store = pipeline.close().await;
        assert_eq!(store.calls.len(), 1);
    }

    #[tokio::test]
    async fn test_close_swallows_logout_failure() {
        let store = FakeStore {
            logout_fails: true,
            ..FakeStore::default()
        };
        let pipeline = AppendPipeline::new(store, &settings());
        let store = pipeline.close().await;
        assert!(store.logout_called);
    }

    #[test]
    fn test_summary_display() {
        let summary = RunSummary {
            total: 4,
            appended: 3,
            failed: 1,
            undated: 2,
        };
        assert_eq!(
            summary.to_string(),
            "4 messages: 3 appended, 1 failed, 2 without date"
        );
    }
}
