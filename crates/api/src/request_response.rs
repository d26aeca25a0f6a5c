// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use serde::{Deserialize, Serialize};

use toolreq_domain::{Ticket, TicketCategory};
use toolreq_persistence::ProfileData;

/// API request to submit a new ticket.
///
/// The applicant identity comes from the authenticated caller, never from
/// the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTicketRequest {
    /// The applicant's department.
    pub department: String,
    /// The tool being requested.
    pub tool_name: String,
    /// The filing category. Defaults to `other` when omitted.
    #[serde(default)]
    pub category: Option<TicketCategory>,
    /// What the tool should do.
    pub description: String,
    /// Acceptance criteria.
    pub criteria: String,
}

/// API response for a successful ticket submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTicketResponse {
    /// The store-assigned ticket id.
    pub request_id: i64,
    /// The sequenced ticket number.
    pub ticket_no: String,
    /// A success message.
    pub message: String,
}

/// API request to replace the supervisor annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSupervisorNoteRequest {
    /// The annotation text. Whitespace-only removes the annotation.
    pub content: String,
}

/// API request to change a user's role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserRoleRequest {
    /// The new role (one of the closed role set).
    pub role: String,
}

/// API request to sync a profile from the trusted identity provider.
pub type SyncProfileRequest = toolreq_persistence::ProfileSync;

/// API response for a successful profile sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncProfileResponse {
    /// The session token for subsequent requests.
    pub session_token: String,
    /// The caller's resolved role.
    pub role: String,
    /// The profile after the sync.
    pub profile: ProfileData,
}

/// API response describing the authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhoAmIResponse {
    /// The caller's profile.
    pub profile: ProfileData,
    /// Advisory capability flags for UI gating.
    pub capabilities: TicketCapabilities,
}

/// API response for listing tickets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTicketsResponse {
    /// The tickets matching the caller's filter, newest first.
    pub tickets: Vec<Ticket>,
}

/// API response for the identity-sync rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySyncResponse {
    /// How many tickets were rewritten.
    pub updated: usize,
}

/// A single capability flag.
///
/// Capabilities are advisory only and never replace the data-layer role
/// gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// The action is permitted.
    Allowed,
    /// The action is denied.
    Denied,
}

impl Capability {
    /// Converts a boolean to a capability flag.
    #[must_use]
    pub const fn from_bool(allowed: bool) -> Self {
        if allowed { Self::Allowed } else { Self::Denied }
    }

    /// Returns whether this capability is allowed.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Advisory capability flags for the ticket surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketCapabilities {
    /// May submit new tickets.
    pub can_submit: Capability,
    /// May update admin fields (status, category, notes, estimates).
    pub can_update_admin_fields: Capability,
    /// May write the supervisor annotation.
    pub can_update_supervisor_note: Capability,
    /// May delete tickets.
    pub can_delete: Capability,
    /// May change user roles.
    pub can_change_roles: Capability,
}
