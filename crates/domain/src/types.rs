// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::Date;

/// Represents the triage state of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    /// Initial state after submission. Awaiting triage.
    #[default]
    Pending,
    /// Under discussion with the applicant.
    Discussing,
    /// Accepted and actively being built.
    Developing,
    /// Delivered.
    Done,
    /// Rejected or withdrawn.
    Cancelled,
}

impl FromStr for TicketStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "discussing" => Ok(Self::Discussing),
            "developing" => Ok(Self::Developing),
            "done" => Ok(Self::Done),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TicketStatus {
    /// Converts this status to its persisted string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Discussing => "discussing",
            Self::Developing => "developing",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns every status value, in lifecycle order.
    #[must_use]
    pub const fn all() -> [Self; 5] {
        [
            Self::Pending,
            Self::Discussing,
            Self::Developing,
            Self::Done,
            Self::Cancelled,
        ]
    }
}

/// Represents the category a ticket was filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TicketCategory {
    /// Design work (mockups, assets, UX).
    Design,
    /// Programming work (tools, automation, integrations).
    Programming,
    /// Anything else.
    #[default]
    Other,
}

impl FromStr for TicketCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "design" => Ok(Self::Design),
            "programming" => Ok(Self::Programming),
            "other" => Ok(Self::Other),
            _ => Err(DomainError::InvalidCategory(s.to_string())),
        }
    }
}

impl std::fmt::Display for TicketCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TicketCategory {
    /// Converts this category to its persisted string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Design => "design",
            Self::Programming => "programming",
            Self::Other => "other",
        }
    }
}

/// Identity snapshot of the user who submitted a ticket.
///
/// Captured at creation time and denormalized onto the ticket. The display
/// name is kept in sync by the identity-sync rewrite when the canonical name
/// changes, never by a live link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    /// The applicant's stable identity.
    pub uid: String,
    /// The applicant's display name at submission (or last sync).
    pub display_name: String,
}

impl Applicant {
    /// Creates a new `Applicant` snapshot.
    #[must_use]
    pub const fn new(uid: String, display_name: String) -> Self {
        Self { uid, display_name }
    }
}

/// Identity attribution attached to an admin or manager annotation.
///
/// A handler is written and removed as a unit: a ticket either carries the
/// full trio of fields or none of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handler {
    /// The annotating operator's stable identity.
    pub uid: String,
    /// The annotating operator's display name.
    pub display_name: String,
    /// Optional avatar URL.
    pub photo_url: Option<String>,
}

impl Handler {
    /// Creates a new `Handler` attribution.
    #[must_use]
    pub const fn new(uid: String, display_name: String, photo_url: Option<String>) -> Self {
        Self {
            uid,
            display_name,
            photo_url,
        }
    }
}

/// A supervisor's single-slot annotation on a ticket.
///
/// Replaced or removed wholesale on update, never merged field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisorNote {
    /// The supervisor's stable identity.
    pub uid: String,
    /// The supervisor's display name.
    pub display_name: String,
    /// Optional avatar URL.
    pub photo_url: Option<String>,
    /// The annotation text. Never empty while the note exists.
    pub content: String,
    /// When this note was last written (ISO 8601).
    pub updated_at: String,
}

/// Caller-supplied fields for a new ticket, before the store assigns an id
/// and the sequencer assigns a ticket number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDraft {
    /// The submitting user's identity snapshot.
    pub applicant: Applicant,
    /// The applicant's department at submission.
    pub department: String,
    /// The tool being requested.
    pub tool_name: String,
    /// The filing category.
    pub category: TicketCategory,
    /// What the tool should do.
    pub description: String,
    /// Acceptance criteria.
    pub criteria: String,
}

/// One tool-development request record, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Opaque identifier assigned by the store at creation. Immutable.
    pub request_id: i64,
    /// Human-readable `REQ-<YYYYMMDD>-<seq>` number. Assigned once, immutable.
    pub ticket_no: String,
    /// Identity snapshot of the submitter.
    pub applicant: Applicant,
    /// The applicant's department at submission.
    pub department: String,
    /// The tool being requested.
    pub tool_name: String,
    /// The filing category.
    pub category: TicketCategory,
    /// What the tool should do.
    pub description: String,
    /// Acceptance criteria.
    pub criteria: String,
    /// The triage state.
    pub status: TicketStatus,
    /// Optional admin annotation.
    pub admin_note: Option<String>,
    /// Optional manager approval text.
    pub manager_approval: Option<String>,
    /// Optional delivery estimate.
    pub estimated_date: Option<Date>,
    /// Attribution of the last admin annotation. Present iff `admin_note`
    /// is non-empty.
    pub admin_handler: Option<Handler>,
    /// Attribution of the manager approval response.
    pub manager_responder: Option<Handler>,
    /// The supervisor's single-slot annotation.
    pub supervisor_note: Option<SupervisorNote>,
    /// Creation timestamp (ISO 8601). Immutable.
    pub created_at: String,
    /// Last-mutation timestamp (ISO 8601). Refreshed on every mutation.
    pub updated_at: String,
}

impl Ticket {
    /// Validates the note/handler coupling invariant.
    ///
    /// # Invariant
    ///
    /// `admin_note` is empty or absent ⇔ `admin_handler` is absent.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AttributionCoupling` if one side is present
    /// without the other.
    pub fn validate_attribution_coupling(&self) -> Result<(), DomainError> {
        let note_present = self
            .admin_note
            .as_deref()
            .is_some_and(|n| !n.trim().is_empty());
        if note_present != self.admin_handler.is_some() {
            return Err(DomainError::AttributionCoupling {
                ticket_no: self.ticket_no.clone(),
                reason: if note_present {
                    String::from("admin note present without handler attribution")
                } else {
                    String::from("handler attribution present without admin note")
                },
            });
        }
        Ok(())
    }
}
