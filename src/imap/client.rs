// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use async_imap::types::UnsolicitedResponse;
use async_trait::async_trait;
use log::debug;

use crate::imap::error::ImapError;
use crate::imap::session::TlsImapSession;
use crate::imap::types::AppendReceipt;

/// The mail-store operations the upload pipeline needs from a live session.
///
/// Calls are strictly sequential: each one completes before the next starts.
#[async_trait]
pub trait Mailstore: Send {
    /// Issues `APPEND`. `flags` is a parenthesized flag list and
    /// `internal_date` a quoted `INTERNALDATE`; when absent the server
    /// applies its own defaults (no flags, current time).
    async fn append(
        &mut self,
        mailbox: &str,
        flags: Option<&str>,
        internal_date: Option<&str>,
        message: &[u8],
    ) -> Result<AppendReceipt, ImapError>;

    async fn logout(&mut self) -> Result<(), ImapError>;
}

/// A logged-in IMAP session over TLS.
pub struct ImapClient {
    session: TlsImapSession,
}

impl ImapClient {
    pub fn new(session: TlsImapSession) -> Self {
        let mut client = Self { session };
        // Greeting and capability noise from login.
        let drained = client.drain_unsolicited();
        if !drained.is_empty() {
            debug!("Discarded {} untagged responses after login", drained.len());
        }
        client
    }

    /// Collects untagged responses queued since the last command.
    fn drain_unsolicited(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(response) = self.session.unsolicited_responses.try_recv() {
            lines.push(describe_unsolicited(&response));
        }
        lines
    }
}

fn describe_unsolicited(response: &UnsolicitedResponse) -> String {
    match response {
        UnsolicitedResponse::Exists(n) => format!("{} EXISTS", n),
        UnsolicitedResponse::Recent(n) => format!("{} RECENT", n),
        UnsolicitedResponse::Expunge(n) => format!("{} EXPUNGE", n),
        other => format!("{:?}", other),
    }
}

#[async_trait]
impl Mailstore for ImapClient {
    async fn append(
        &mut self,
        mailbox: &str,
        flags: Option<&str>,
        internal_date: Option<&str>,
        message: &[u8],
    ) -> Result<AppendReceipt, ImapError> {
        self.session
            .append(mailbox, flags, internal_date, message)
            .await
            .map_err(ImapError::from)?;
        Ok(AppendReceipt::ok().with_details(self.drain_unsolicited()))
    }

    async fn logout(&mut self) -> Result<(), ImapError> {
        self.session.logout().await.map_err(ImapError::from)
    }
}
