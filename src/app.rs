// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! One upload run: settings, input directory, session, pipeline.

use chrono::Local;
use log::info;
use std::future::Future;
use std::path::Path;

use crate::config::{Settings, SettingsError};
use crate::error::AppError;
use crate::imap::client::Mailstore;
use crate::imap::error::ImapError;
use crate::models::AppendResult;
use crate::pipeline::{AppendPipeline, RunSummary};
use crate::source::MessageSource;

/// Runs a whole upload.
///
/// Settings are loaded and checked first, then the input directory is
/// listed; only then is `connect` called. Any of these failing is fatal and
/// nothing is uploaded. Once connected, every directory entry produces one
/// result handed to `report`, and the session is logged out at the end.
pub async fn execute<L, C, Fut, M, R>(
    load_settings: L,
    input_dir: &Path,
    connect: C,
    report: R,
) -> Result<RunSummary, AppError>
where
    L: FnOnce() -> Result<Settings, SettingsError>,
    C: FnOnce(Settings) -> Fut,
    Fut: Future<Output = Result<M, ImapError>>,
    M: Mailstore,
    R: FnMut(&AppendResult),
{
    let settings = load_settings()?;
    let source = MessageSource::open(input_dir)?;

    let store = connect(settings.clone()).await?;
    let mut pipeline = AppendPipeline::new(store, &settings);
    info!(
        "Uploading {} into {}",
        source.path().display(),
        pipeline.mailbox()
    );

    info!("START {}", Local::now());
    let summary = pipeline.run(source, report).await;
    info!("DONE {}", Local::now());

    pipeline.close().await;
    info!("Uploaded to {}: {}", settings.mailbox, summary);
    Ok(summary)
}
