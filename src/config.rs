// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use config::{Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_IMAP_PORT: u16 = 993;
pub const DEFAULT_MAILBOX: &str = "INBOX";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LABEL_HEADER: &str = "X-GMAIL-LABELS";

/// Connection and upload settings, read once at startup.
///
/// Values come from (lowest to highest precedence) built-in defaults, an
/// optional TOML file and `IMAP_*` environment variables: `IMAP_HOSTNAME`,
/// `IMAP_PORT`, `IMAP_USERNAME`, `IMAP_PASSWORD`, `IMAP_MAILBOX`,
/// `IMAP_TIMEOUT` and `IMAP_LABEL_HEADER`.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    pub hostname: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub mailbox: String,
    /// Connect and login timeout, in seconds.
    pub timeout: u64,
    pub label_header: String,
}

// Keep the password out of logs.
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("mailbox", &self.mailbox)
            .field("timeout", &self.timeout)
            .field("label_header", &self.label_header)
            .finish()
    }
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load or parse configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Credentials not set: {0} is missing")]
    Missing(&'static str),

    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl Settings {
    /// Loads settings from the optional file and the process environment.
    pub fn load(config_path: Option<&str>) -> Result<Self, SettingsError> {
        Self::build(config_path, None)
    }

    /// Same as [`Settings::load`] but reads `IMAP_*` values from `env`
    /// instead of the process environment.
    pub fn from_env_map(
        config_path: Option<&str>,
        env: config::Map<String, String>,
    ) -> Result<Self, SettingsError> {
        Self::build(config_path, Some(env))
    }

    fn build(
        config_path: Option<&str>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, SettingsError> {
        let mut config_builder = config::Config::builder()
            .set_default("hostname", "")?
            .set_default("port", i64::from(DEFAULT_IMAP_PORT))?
            .set_default("username", "")?
            .set_default("password", "")?
            .set_default("mailbox", DEFAULT_MAILBOX)?
            .set_default("timeout", DEFAULT_TIMEOUT_SECS as i64)?
            .set_default("label_header", DEFAULT_LABEL_HEADER)?;

        if let Some(path) = config_path {
            config_builder = config_builder.add_source(File::with_name(path));
        }

        // e.g. `IMAP_HOSTNAME=...` overrides `hostname`
        config_builder = config_builder.add_source(
            Environment::with_prefix("IMAP")
                .ignore_empty(true)
                .source(env),
        );

        let settings: Settings = config_builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks the values a connection cannot do without.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.hostname.trim().is_empty() {
            return Err(SettingsError::Missing("IMAP_HOSTNAME"));
        }
        if self.username.trim().is_empty() {
            return Err(SettingsError::Missing("IMAP_USERNAME"));
        }
        if self.port == 0 {
            return Err(SettingsError::Invalid {
                field: "IMAP_PORT",
                reason: "port must be non-zero".to_string(),
            });
        }
        if self.mailbox.is_empty() {
            return Err(SettingsError::Invalid {
                field: "IMAP_MAILBOX",
                reason: "mailbox name must not be empty".to_string(),
            });
        }
        // Sent inside a quoted string without escaping.
        if self
            .mailbox
            .chars()
            .any(|c| c == '"' || c == '\\' || c.is_control())
        {
            return Err(SettingsError::Invalid {
                field: "IMAP_MAILBOX",
                reason: "mailbox name must not contain quotes, backslashes or control characters"
                    .to_string(),
            });
        }
        if self.label_header.trim().is_empty() {
            return Err(SettingsError::Invalid {
                field: "IMAP_LABEL_HEADER",
                reason: "header name must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}
