// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ticket mutations: sequenced creation, partial updates, identity sync,
//! and deletion.
//!
//! Creation is the one contended write path: the daily counter increment
//! and the ticket insert commit in a single IMMEDIATE transaction so that
//! concurrent submissions each receive a distinct sequential number or a
//! typed abort, never a duplicate.

use diesel::SqliteConnection;
use diesel::prelude::*;
use time::OffsetDateTime;
use tracing::{debug, info};

use toolreq_domain::{
    AdminPatch, Handler, Ticket, TicketDraft, counter_key, format_ticket_no, shard_key_utc,
};

use crate::data_models::{CreatedTicket, format_date, format_timestamp};
use crate::diesel_schema::{counters, requests};
use crate::error::PersistenceError;
use crate::queries::requests::{RequestRow, row_to_ticket};
use crate::retry::{MAX_TRANSACTION_ATTEMPTS, immediate_transaction_with_retry};
use crate::sqlite;

/// Creates a ticket, assigning the next sequential number for today's
/// UTC day shard.
///
/// Counter read-increment-write and the ticket insert commit atomically.
/// Contended attempts are retried up to the transaction budget.
///
/// # Errors
///
/// Returns `PersistenceError::TransactionAborted` if the write could not
/// commit within its retry budget, or another variant if the insert fails.
/// No partial state remains on failure.
pub fn create_request(
    conn: &mut SqliteConnection,
    draft: &TicketDraft,
    now: OffsetDateTime,
) -> Result<CreatedTicket, PersistenceError> {
    let shard = shard_key_utc(now);
    let key = counter_key(&shard);
    let stamp = format_timestamp(now)?;

    let created = immediate_transaction_with_retry(conn, MAX_TRANSACTION_ATTEMPTS, |conn| {
        let current: i64 = counters::table
            .filter(counters::counter_key.eq(&key))
            .select(counters::count)
            .first(conn)
            .optional()?
            .unwrap_or(0);
        let next = current + 1;

        diesel::insert_into(counters::table)
            .values((counters::counter_key.eq(&key), counters::count.eq(next)))
            .on_conflict(counters::counter_key)
            .do_update()
            .set(counters::count.eq(next))
            .execute(conn)?;

        let ticket_no = format_ticket_no(&shard, next);

        diesel::insert_into(requests::table)
            .values((
                requests::ticket_no.eq(&ticket_no),
                requests::applicant_uid.eq(&draft.applicant.uid),
                requests::applicant_name.eq(&draft.applicant.display_name),
                requests::department.eq(&draft.department),
                requests::tool_name.eq(&draft.tool_name),
                requests::category.eq(draft.category.as_str()),
                requests::description.eq(&draft.description),
                requests::criteria.eq(&draft.criteria),
                requests::status.eq(toolreq_domain::TicketStatus::Pending.as_str()),
                requests::created_at.eq(&stamp),
                requests::updated_at.eq(&stamp),
            ))
            .execute(conn)?;

        let request_id = sqlite::get_last_insert_rowid(conn)?;

        Ok(CreatedTicket {
            request_id,
            ticket_no,
        })
    })?;

    info!(
        request_id = created.request_id,
        ticket_no = %created.ticket_no,
        "Ticket created"
    );

    Ok(created)
}

/// Applies a sparse admin patch to a ticket.
///
/// Fields absent from the patch are left untouched. Emptying the admin
/// note removes the handler attribution in the same UPDATE. The row is
/// read and rewritten inside one transaction; concurrent admin edits are
/// last-write-wins.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the ticket does not exist.
pub fn update_request_admin(
    conn: &mut SqliteConnection,
    request_id: i64,
    patch: &AdminPatch,
    now: OffsetDateTime,
) -> Result<(), PersistenceError> {
    let stamp = format_timestamp(now)?;

    immediate_transaction_with_retry(conn, MAX_TRANSACTION_ATTEMPTS, |conn| {
        let row: Option<RequestRow> = requests::table
            .find(request_id)
            .select(RequestRow::as_select())
            .first(conn)
            .optional()?;
        let Some(row) = row else {
            return Err(PersistenceError::NotFound(format!(
                "Request {request_id} not found"
            )));
        };

        let mut ticket: Ticket = row_to_ticket(row)?;
        ticket.apply_admin_patch(patch, &stamp);

        let estimated_date = ticket.estimated_date.map(format_date).transpose()?;

        diesel::update(requests::table.find(request_id))
            .set((
                requests::status.eq(ticket.status.as_str()),
                requests::category.eq(ticket.category.as_str()),
                requests::admin_note.eq(ticket.admin_note.as_deref()),
                requests::manager_approval.eq(ticket.manager_approval.as_deref()),
                requests::estimated_date.eq(estimated_date.as_deref()),
                requests::admin_handler_uid
                    .eq(ticket.admin_handler.as_ref().map(|h| h.uid.as_str())),
                requests::admin_handler_name
                    .eq(ticket.admin_handler.as_ref().map(|h| h.display_name.as_str())),
                requests::admin_handler_photo_url
                    .eq(ticket.admin_handler.as_ref().and_then(|h| h.photo_url.as_deref())),
                requests::manager_responder_uid
                    .eq(ticket.manager_responder.as_ref().map(|h| h.uid.as_str())),
                requests::manager_responder_name
                    .eq(ticket.manager_responder.as_ref().map(|h| h.display_name.as_str())),
                requests::manager_responder_photo_url
                    .eq(ticket.manager_responder.as_ref().and_then(|h| h.photo_url.as_deref())),
                requests::updated_at.eq(&ticket.updated_at),
            ))
            .execute(conn)?;

        Ok(())
    })?;

    debug!(request_id, "Admin fields updated");
    Ok(())
}

/// Replaces or removes a ticket's supervisor annotation wholesale.
///
/// Whitespace-only content removes the entire five-field annotation;
/// anything else replaces it as a unit with the acting supervisor's
/// attribution. There is no field-by-field merge.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the ticket does not exist.
pub fn update_request_supervisor(
    conn: &mut SqliteConnection,
    request_id: i64,
    content: &str,
    actor: &Handler,
    now: OffsetDateTime,
) -> Result<(), PersistenceError> {
    let stamp = format_timestamp(now)?;
    let trimmed = content.trim();

    let rows_affected: usize = if trimmed.is_empty() {
        debug!(request_id, "Clearing supervisor annotation");
        diesel::update(requests::table.find(request_id))
            .set((
                requests::supervisor_uid.eq(None::<String>),
                requests::supervisor_name.eq(None::<String>),
                requests::supervisor_photo_url.eq(None::<String>),
                requests::supervisor_content.eq(None::<String>),
                requests::supervisor_updated_at.eq(None::<String>),
                requests::updated_at.eq(&stamp),
            ))
            .execute(conn)?
    } else {
        debug!(request_id, "Replacing supervisor annotation");
        diesel::update(requests::table.find(request_id))
            .set((
                requests::supervisor_uid.eq(&actor.uid),
                requests::supervisor_name.eq(&actor.display_name),
                requests::supervisor_photo_url.eq(actor.photo_url.as_deref()),
                requests::supervisor_content.eq(content),
                requests::supervisor_updated_at.eq(&stamp),
                requests::updated_at.eq(&stamp),
            ))
            .execute(conn)?
    };

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Request {request_id} not found"
        )));
    }

    Ok(())
}

/// Rewrites the denormalized applicant name across every ticket submitted
/// by a user.
///
/// This is a single batched UPDATE; each row write is idempotent, so a
/// partially applied batch is safe to retry.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn sync_applicant_name(
    conn: &mut SqliteConnection,
    uid: &str,
    new_name: &str,
    now: OffsetDateTime,
) -> Result<usize, PersistenceError> {
    let stamp = format_timestamp(now)?;

    let rows_affected: usize = diesel::update(requests::table)
        .filter(requests::applicant_uid.eq(uid))
        .set((
            requests::applicant_name.eq(new_name),
            requests::updated_at.eq(&stamp),
        ))
        .execute(conn)?;

    info!(uid, rows_affected, "Applicant name synced across tickets");
    Ok(rows_affected)
}

/// Deletes a ticket. Deleting an id that does not exist is not an error.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_request(
    conn: &mut SqliteConnection,
    request_id: i64,
) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::delete(requests::table.find(request_id)).execute(conn)?;

    if rows_affected == 0 {
        debug!(request_id, "Delete targeted a missing request; treated as success");
    } else {
        info!(request_id, "Ticket deleted");
    }

    Ok(())
}
