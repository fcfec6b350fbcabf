// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Pulls the `Date` header and the label-annotation header out of a raw
//! message without parsing the rest of it.

use regex::Regex;
use std::borrow::Cow;

use crate::config::DEFAULT_LABEL_HEADER;

lazy_static::lazy_static! {
    /// `Date:` at the start of a line, then an RFC 5322-ish date token:
    /// optional weekday (and comma), day, month name, year, time, optional zone.
    static ref DATE_HEADER_RE: Regex = Regex::new(
        r"(?m)^(?i:date):[ \t]*((?:[A-Za-z]+,?[ \t]*)?\d{1,2}[ \t]+[A-Za-z]{3,}[ \t]+\d{4}[ \t]+\d{1,2}:\d{2}:\d{2}(?:[ \t]*[+-]\d{4})?)"
    ).unwrap();
}

/// Header values found in a message, verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawHeaders {
    pub date: Option<String>,
    pub label: Option<String>,
}

/// Scans raw message bytes for the date and label headers.
#[derive(Debug, Clone)]
pub struct HeaderExtractor {
    label_re: Regex,
}

impl Default for HeaderExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_LABEL_HEADER)
    }
}

impl HeaderExtractor {
    /// `label_header` is the header name carrying the label, e.g. `X-GMAIL-LABELS`.
    pub fn new(label_header: &str) -> Self {
        // Escaped, so any header name yields a valid pattern.
        let pattern = format!(
            r#"(?m)^(?i:{}):[ \t]*"\\{{0,2}}(\w+)""#,
            regex::escape(label_header.trim())
        );
        let label_re = Regex::new(&pattern).unwrap();
        Self { label_re }
    }

    /// Never fails: anything missing or malformed comes back as `None`.
    /// Only the first occurrence of each header counts.
    pub fn extract(&self, message: &[u8]) -> RawHeaders {
        let text = decode_lossy(message);

        let date = DATE_HEADER_RE
            .captures(&text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim_end().to_string());

        let label = self
            .label_re
            .captures(&text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());

        RawHeaders { date, label }
    }
}

/// Invalid UTF-8 sequences become U+FFFD; the rest of the text is kept.
pub fn decode_lossy(message: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(message)
}
