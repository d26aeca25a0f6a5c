// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Iso8601;
use time::macros::format_description;

use crate::error::PersistenceError;

/// The store-assigned identity of a freshly created ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedTicket {
    /// The opaque store-assigned identifier.
    pub request_id: i64,
    /// The sequenced ticket number.
    pub ticket_no: String,
}

/// Serializable representation of a user profile row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileData {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub department: Option<String>,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Identity fields delivered by the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSync {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

/// Result of upserting a profile from an identity-provider payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSyncOutcome {
    /// The profile row after the upsert.
    pub profile: ProfileData,
    /// Whether the canonical display name changed, which must trigger the
    /// applicant-name rewrite across tickets.
    pub display_name_changed: bool,
}

/// Serializable representation of a session row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub session_id: i64,
    pub session_token: String,
    pub uid: String,
    pub created_at: String,
    pub last_activity_at: String,
    pub expires_at: String,
}

/// Formats an instant as the ISO 8601 text stored in timestamp columns.
pub(crate) fn format_timestamp(ts: OffsetDateTime) -> Result<String, PersistenceError> {
    ts.format(&Iso8601::DEFAULT)
        .map_err(|e| PersistenceError::SerializationError(format!("Failed to format timestamp: {e}")))
}

/// Formats a calendar date as the `YYYY-MM-DD` text stored in date columns.
pub(crate) fn format_date(date: time::Date) -> Result<String, PersistenceError> {
    date.format(format_description!("[year]-[month]-[day]"))
        .map_err(|e| PersistenceError::SerializationError(format!("Failed to format date: {e}")))
}

/// Parses a `YYYY-MM-DD` date column value.
pub(crate) fn parse_date(s: &str) -> Result<time::Date, PersistenceError> {
    time::Date::parse(s, format_description!("[year]-[month]-[day]"))
        .map_err(|e| PersistenceError::SerializationError(format!("Failed to parse date '{s}': {e}")))
}
