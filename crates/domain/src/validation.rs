// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Draft validation performed before any store interaction.

use crate::error::DomainError;
use crate::types::TicketDraft;

/// Validates the required fields of a ticket draft.
///
/// # Errors
///
/// Returns `DomainError::MissingField` for the first field that is missing
/// or blank after trimming.
pub fn validate_draft(draft: &TicketDraft) -> Result<(), DomainError> {
    if draft.applicant.uid.trim().is_empty() {
        return Err(DomainError::MissingField("applicant.uid"));
    }
    if draft.department.trim().is_empty() {
        return Err(DomainError::MissingField("department"));
    }
    if draft.tool_name.trim().is_empty() {
        return Err(DomainError::MissingField("tool_name"));
    }
    if draft.description.trim().is_empty() {
        return Err(DomainError::MissingField("description"));
    }
    if draft.criteria.trim().is_empty() {
        return Err(DomainError::MissingField("criteria"));
    }
    Ok(())
}

/// Resolves the applicant display name snapshot from the identity fields.
///
/// Falls back from display name to email to a fixed placeholder, so a
/// ticket always carries a non-empty applicant name.
#[must_use]
pub fn resolve_applicant_name(display_name: Option<&str>, email: Option<&str>) -> String {
    display_name
        .filter(|n| !n.trim().is_empty())
        .or_else(|| email.filter(|e| !e.trim().is_empty()))
        .unwrap_or("Unknown")
        .to_string()
}
