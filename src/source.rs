// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Message files read lazily from a directory.
//!
//! Entries come back in whatever order the platform lists them. Nothing is
//! filtered: a subdirectory or unreadable file shows up as an [`EntryError`]
//! for that entry and the rest of the listing carries on.

use log::info;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::RawMessage;

/// The directory itself could not be listed.
#[derive(Debug, Error)]
#[error("Input directory cannot be read: {}: {source}", .path.display())]
pub struct SourceError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// One entry could not be read.
#[derive(Debug, Error)]
#[error("Could not read {filename}: {error}")]
pub struct EntryError {
    pub filename: String,
    #[source]
    pub error: io::Error,
}

/// Single-pass iterator over the files of one directory.
#[derive(Debug)]
pub struct MessageSource {
    path: PathBuf,
    entries: fs::ReadDir,
    position: usize,
}

impl MessageSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let entries = fs::read_dir(&path).map_err(|source| SourceError {
            path: path.clone(),
            source,
        })?;
        info!("Reading emails from path: {}", path.display());
        Ok(Self {
            path,
            entries,
            position: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Iterator for MessageSource {
    type Item = Result<RawMessage, EntryError>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.next()?;
        self.position += 1;

        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                return Some(Err(EntryError {
                    filename: format!("<entry #{}>", self.position),
                    error,
                }))
            }
        };

        let filename = entry.file_name().to_string_lossy().into_owned();
        Some(match fs::read(entry.path()) {
            Ok(bytes) => Ok(RawMessage { filename, bytes }),
            Err(error) => Err(EntryError { filename, error }),
        })
    }
}
