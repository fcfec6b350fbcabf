// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Establishing the single authenticated IMAP session used for a run.

use std::sync::Arc;
use std::time::Duration;

use async_imap::Client as AsyncImapClient;
use log::{debug, info, warn};
use rustls::{ClientConfig, RootCertStore};
use rustls_pki_types::ServerName;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::{client::TlsStream, TlsConnector};

use crate::config::Settings;
use crate::imap::client::ImapClient;
use crate::imap::error::ImapError;

pub type TlsImapStream = TlsStream<TcpStream>;

/// The session type returned by a successful login.
pub type TlsImapSession = async_imap::Session<TlsImapStream>;

/// Opens a TLS connection to the configured host and logs in.
///
/// Every failure here is fatal for the run; nothing is retried.
pub async fn establish(settings: &Settings) -> Result<ImapClient, ImapError> {
    let host = settings.hostname.as_str();
    let port = settings.port;
    let timeout_duration = settings.timeout();

    info!("Connecting to {}:{} as '{}'", host, port, settings.username);

    let server_name = ServerName::try_from(settings.hostname.clone())
        .map_err(|_| ImapError::Connection(format!("Invalid server name format: {}", host)))?;
    let tls_connector = build_tls_connector()?;

    let tls_stream = match timeout(
        timeout_duration,
        setup_tls_stream(host, port, tls_connector, server_name),
    )
    .await
    {
        Ok(result) => result?,
        Err(_) => {
            return Err(ImapError::Timeout(format!(
                "connecting to {}:{} took longer than {:?}",
                host, port, timeout_duration
            )))
        }
    };

    let session = perform_imap_login(
        tls_stream,
        &settings.username,
        &settings.password,
        timeout_duration,
    )
    .await?;

    info!("Logged-in to server: {}", host);
    Ok(ImapClient::new(session))
}

fn build_tls_connector() -> Result<TlsConnector, ImapError> {
    let mut root_cert_store = RootCertStore::empty();
    let certs = rustls_native_certs::load_native_certs()
        .map_err(|e| ImapError::Tls(format!("Could not load native certificates: {}", e)))?;
    let (added, ignored) = root_cert_store.add_parsable_certificates(certs);
    debug!("Loaded {} native certs, ignored {}.", added, ignored);
    if root_cert_store.is_empty() {
        warn!("Root certificate store is empty after loading native certs.");
    }

    let config = ClientConfig::builder()
        .with_root_certificates(root_cert_store)
        .with_no_client_auth();
    Ok(TlsConnector::from(Arc::new(config)))
}

/// Establishes TCP connection and performs the TLS handshake.
async fn setup_tls_stream(
    host: &str,
    port: u16,
    tls_connector: TlsConnector,
    server_name: ServerName<'static>,
) -> Result<TlsImapStream, ImapError> {
    debug!("Attempting TCP connection to {}:{}...", host, port);
    let tcp_stream = TcpStream::connect((host, port)).await?;
    debug!("TCP connected. Performing TLS handshake...");

    let tls_stream = tls_connector
        .connect(server_name, tcp_stream)
        .await
        .map_err(|e| ImapError::Tls(e.to_string()))?;
    debug!("TLS handshake successful.");
    Ok(tls_stream)
}

async fn perform_imap_login(
    stream: TlsImapStream,
    username: &str,
    password: &str,
    timeout_duration: Duration,
) -> Result<TlsImapSession, ImapError> {
    let client = AsyncImapClient::new(stream);
    debug!("IMAP client created. Attempting login for user '{}'...", username);

    match timeout(timeout_duration, client.login(username, password)).await {
        Ok(Ok(session)) => Ok(session),
        Ok(Err((e, _client))) => Err(ImapError::Auth(e.to_string())),
        Err(_) => Err(ImapError::Timeout(format!(
            "login for user {} took longer than {:?}",
            username, timeout_duration
        ))),
    }
}
