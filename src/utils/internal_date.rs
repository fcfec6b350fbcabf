// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! RFC 5322 date strings to IMAP `INTERNALDATE` values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A quoted `INTERNALDATE`, e.g. `"02-Jan-2006 22:04:05 +0000"`.
///
/// Always expressed in UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InternalDate(String);

impl InternalDate {
    /// Formats a UNIX timestamp. Only strictly positive timestamps are
    /// accepted; zero (the epoch) and earlier count as "no date".
    pub fn from_timestamp(timestamp: i64) -> Option<Self> {
        if timestamp <= 0 {
            return None;
        }
        let utc: DateTime<Utc> = DateTime::from_timestamp(timestamp, 0)?;
        Some(Self(utc.format("\"%d-%b-%Y %H:%M:%S +0000\"").to_string()))
    }

    /// The quoted wire form, ready to hand to `APPEND`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InternalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parses the date and converts it, or `None` if it does not parse.
pub fn normalize(date: &str) -> Option<InternalDate> {
    rfc5322_timestamp(date).and_then(InternalDate::from_timestamp)
}

/// Parses a loosely RFC 5322 date into a UTC UNIX timestamp, honouring the
/// zone offset. A missing zone is read as UTC.
pub fn rfc5322_timestamp(date: &str) -> Option<i64> {
    let strict = strict_rfc2822(date)?;
    DateTime::parse_from_rfc2822(&strict)
        .map(|dt| dt.with_timezone(&Utc).timestamp())
        .ok()
}

/// Rewrites a header date as `d Mon yyyy HH:MM[:SS] zone`.
///
/// chrono rejects a weekday that disagrees with the date, so it is dropped.
/// Long month names are cut to three letters. The rewrite also pads one-digit clock fields, splits a zone
/// glued to the time and defaults a missing zone to `+0000`. Anything after
/// the zone, such as `(PST)`, is ignored.
fn strict_rfc2822(date: &str) -> Option<String> {
    let mut tokens: Vec<&str> = date
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect();

    if tokens
        .first()
        .map_or(false, |t| t.chars().all(|c| c.is_ascii_alphabetic()))
    {
        tokens.remove(0);
    }

    let [day, month, year, time, rest @ ..] = tokens.as_slice() else {
        return None;
    };
    let month = month.get(..3)?;

    // "15:04:05-0700" with no space before the zone.
    let (time, glued_zone) = match time.find(|c| c == '+' || c == '-') {
        Some(idx) => (&time[..idx], Some(&time[idx..])),
        None => (*time, None),
    };
    let clock = time
        .split(':')
        .map(|field| format!("{:0>2}", field))
        .collect::<Vec<_>>()
        .join(":");

    let zone = glued_zone.or_else(|| rest.first().copied()).unwrap_or("+0000");
    Some(format!("{} {} {} {} {}", day, month, year, clock, zone))
}
