// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for ticket operations.
//!
//! Each handler is a plain function over the injected persistence handle:
//! authorize, validate, mutate, in that order. The role gate runs before
//! any store interaction, and validation failures are rejected before any
//! write.

use time::OffsetDateTime;
use tracing::warn;

use toolreq_domain::{
    AdminPatch, Applicant, Patch, Ticket, TicketDraft, resolve_applicant_name, validate_draft,
};
use toolreq_persistence::{Persistence, PersistenceError};

use crate::auth::{AuthenticatedUser, AuthorizationService};
use crate::error::{ApiError, translate_domain_error};
use crate::projector::TicketFilter;
use crate::request_response::{
    CreateTicketRequest, CreateTicketResponse, IdentitySyncResponse, ListTicketsResponse,
};

/// Maps a persistence error onto the ticket resource.
fn map_ticket_error(err: PersistenceError, request_id: i64) -> ApiError {
    match err {
        PersistenceError::NotFound(_) => ApiError::ResourceNotFound {
            resource_type: String::from("Ticket"),
            message: format!("Ticket {request_id} does not exist"),
        },
        other => other.into(),
    }
}

/// Submits a new ticket.
///
/// The applicant snapshot is taken from the authenticated caller. The
/// department preference write is advisory: its failure is logged and
/// swallowed, never aborting the submission. The sequenced creation
/// itself is all-or-nothing.
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` for pending callers,
/// `ApiError::InvalidInput` for missing fields, and
/// `ApiError::TransactionAborted` if the sequencer exhausted its retry
/// budget.
pub fn create_ticket(
    persistence: &mut Persistence,
    actor: &AuthenticatedUser,
    request: &CreateTicketRequest,
    now: OffsetDateTime,
) -> Result<CreateTicketResponse, ApiError> {
    AuthorizationService::authorize_create(actor)?;

    let applicant_name =
        resolve_applicant_name(actor.display_name.as_deref(), actor.email.as_deref());

    let draft = TicketDraft {
        applicant: Applicant::new(actor.uid.clone(), applicant_name),
        department: request.department.clone(),
        tool_name: request.tool_name.clone(),
        category: request.category.unwrap_or_default(),
        description: request.description.clone(),
        criteria: request.criteria.clone(),
    };

    validate_draft(&draft).map_err(translate_domain_error)?;

    // Advisory write: remember the applicant's department preference.
    // Failure never rolls back ticket creation.
    if let Err(e) = persistence.save_user_department(&actor.uid, &draft.department, now) {
        warn!(uid = %actor.uid, error = %e, "Failed to save department preference; continuing");
    }

    let created = persistence.create_request(&draft, now)?;

    Ok(CreateTicketResponse {
        request_id: created.request_id,
        ticket_no: created.ticket_no.clone(),
        message: format!("Ticket {} submitted", created.ticket_no),
    })
}

/// Applies a sparse admin patch to a ticket.
///
/// When the patch writes a non-empty note without naming a handler, the
/// acting admin becomes the attribution; the note/handler coupling is
/// never left to the client payload.
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` unless the caller is an admin or
/// super admin, and `ApiError::ResourceNotFound` if the ticket does not
/// exist.
pub fn update_admin_fields(
    persistence: &mut Persistence,
    actor: &AuthenticatedUser,
    request_id: i64,
    patch: &AdminPatch,
    now: OffsetDateTime,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_admin_update(actor)?;

    let mut patch = patch.clone();
    if patch.sets_admin_note() && !matches!(patch.admin_handler, Patch::Set(_)) {
        // A written note is attributed to whoever wrote it.
        patch.admin_handler = Patch::Set(actor.to_handler());
    }

    persistence
        .update_request_admin(request_id, &patch, now)
        .map_err(|e| map_ticket_error(e, request_id))
}

/// Replaces or removes a ticket's supervisor annotation.
///
/// Whitespace-only content removes the annotation entirely; anything else
/// replaces it wholesale with the acting supervisor's attribution.
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` unless the caller is a supervisor or
/// super admin, and `ApiError::ResourceNotFound` if the ticket does not
/// exist.
pub fn update_supervisor_note(
    persistence: &mut Persistence,
    actor: &AuthenticatedUser,
    request_id: i64,
    content: &str,
    now: OffsetDateTime,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_supervisor_update(actor)?;

    persistence
        .update_request_supervisor(request_id, content, &actor.to_handler(), now)
        .map_err(|e| map_ticket_error(e, request_id))
}

/// Deletes a ticket. Idempotent: deleting a missing id succeeds.
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` unless the caller is an admin or
/// super admin.
pub fn delete_ticket(
    persistence: &mut Persistence,
    actor: &AuthenticatedUser,
    request_id: i64,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_delete(actor)?;

    persistence
        .delete_request(request_id)
        .map_err(ApiError::from)
}

/// Lists tickets newest-first, filtered by the caller's criteria.
///
/// # Errors
///
/// Returns an error if the store query fails.
pub fn list_tickets(
    persistence: &mut Persistence,
    filter: &TicketFilter,
) -> Result<ListTicketsResponse, ApiError> {
    let tickets: Vec<Ticket> = persistence.list_requests()?;
    Ok(ListTicketsResponse {
        tickets: filter.apply(&tickets),
    })
}

/// Rewrites the denormalized applicant name across every ticket submitted
/// by the given user.
///
/// This is the handler contract for the external display-name propagation
/// trigger. The batch is not atomic; each row write is idempotent and safe
/// to retry.
///
/// # Errors
///
/// Returns an error if the store update fails.
pub fn sync_display_name(
    persistence: &mut Persistence,
    uid: &str,
    new_name: &str,
    now: OffsetDateTime,
) -> Result<IdentitySyncResponse, ApiError> {
    let updated = persistence.sync_applicant_name(uid, new_name, now)?;
    Ok(IdentitySyncResponse { updated })
}

/// Changes a user's role.
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` unless the caller is a super admin,
/// `ApiError::InvalidInput` for a role outside the closed set, and
/// `ApiError::ResourceNotFound` if the target profile does not exist.
pub fn update_user_role(
    persistence: &mut Persistence,
    actor: &AuthenticatedUser,
    uid: &str,
    role: &str,
    now: OffsetDateTime,
) -> Result<(), ApiError> {
    use std::str::FromStr;

    AuthorizationService::authorize_role_change(actor)?;

    let parsed = crate::auth::Role::from_str(role).map_err(ApiError::from)?;

    persistence
        .update_user_role(uid, parsed.as_str(), now)
        .map_err(|e| match e {
            PersistenceError::NotFound(_) => ApiError::ResourceNotFound {
                resource_type: String::from("User"),
                message: format!("User {uid} does not exist"),
            },
            other => other.into(),
        })
}
