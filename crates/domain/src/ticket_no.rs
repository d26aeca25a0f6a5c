// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ticket number formatting and daily shard keys.
//!
//! Ticket numbers are `REQ-<YYYYMMDD>-<seq>` with the sequence zero-padded
//! to three digits. The calendar-day shard is derived from the server clock
//! in UTC so that submissions from clients in different timezones land in
//! one consistent day partition.

use time::{Date, OffsetDateTime};

/// Prefix for daily counter document keys.
const COUNTER_PREFIX: &str = "requests_";

/// Formats a calendar date as a `YYYYMMDD` shard key.
#[must_use]
pub fn shard_key(date: Date) -> String {
    format!(
        "{:04}{:02}{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Derives the shard key for an instant, normalized to UTC.
#[must_use]
pub fn shard_key_utc(now: OffsetDateTime) -> String {
    shard_key(now.to_offset(time::UtcOffset::UTC).date())
}

/// Builds the counter document key for a day shard (e.g. `requests_20260116`).
#[must_use]
pub fn counter_key(shard: &str) -> String {
    format!("{COUNTER_PREFIX}{shard}")
}

/// Formats a ticket number from a shard key and a sequence value.
///
/// The sequence is padded to at least three digits; a day with more than
/// 999 submissions simply grows a fourth digit.
#[must_use]
pub fn format_ticket_no(shard: &str, seq: i64) -> String {
    format!("REQ-{shard}-{seq:03}")
}
