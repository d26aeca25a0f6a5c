// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ticket and counter queries.

use std::str::FromStr;

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;

use toolreq_domain::{Applicant, Handler, SupervisorNote, Ticket, TicketCategory, TicketStatus};

use crate::data_models::parse_date;
use crate::diesel_schema::{counters, requests};
use crate::error::PersistenceError;

/// Diesel Queryable struct for request rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = requests)]
pub(crate) struct RequestRow {
    pub request_id: i64,
    pub ticket_no: String,
    pub applicant_uid: String,
    pub applicant_name: String,
    pub department: String,
    pub tool_name: String,
    pub category: String,
    pub description: String,
    pub criteria: String,
    pub status: String,
    pub admin_note: Option<String>,
    pub manager_approval: Option<String>,
    pub estimated_date: Option<String>,
    pub admin_handler_uid: Option<String>,
    pub admin_handler_name: Option<String>,
    pub admin_handler_photo_url: Option<String>,
    pub manager_responder_uid: Option<String>,
    pub manager_responder_name: Option<String>,
    pub manager_responder_photo_url: Option<String>,
    pub supervisor_uid: Option<String>,
    pub supervisor_name: Option<String>,
    pub supervisor_photo_url: Option<String>,
    pub supervisor_content: Option<String>,
    pub supervisor_updated_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Maps an attribution column trio to a handler value.
///
/// The trio is written all-or-nothing, so a row either carries both the
/// uid and name or neither.
fn handler_from_columns(
    uid: Option<String>,
    name: Option<String>,
    photo_url: Option<String>,
) -> Option<Handler> {
    match (uid, name) {
        (Some(uid), Some(name)) => Some(Handler::new(uid, name, photo_url)),
        _ => None,
    }
}

/// Converts a request row into a domain ticket.
pub(crate) fn row_to_ticket(row: RequestRow) -> Result<Ticket, PersistenceError> {
    let status = TicketStatus::from_str(&row.status)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;
    let category = TicketCategory::from_str(&row.category)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;
    let estimated_date = row.estimated_date.as_deref().map(parse_date).transpose()?;

    let supervisor_note = match (
        row.supervisor_uid,
        row.supervisor_name,
        row.supervisor_content,
        row.supervisor_updated_at,
    ) {
        (Some(uid), Some(display_name), Some(content), Some(updated_at)) => Some(SupervisorNote {
            uid,
            display_name,
            photo_url: row.supervisor_photo_url,
            content,
            updated_at,
        }),
        _ => None,
    };

    Ok(Ticket {
        request_id: row.request_id,
        ticket_no: row.ticket_no,
        applicant: Applicant::new(row.applicant_uid, row.applicant_name),
        department: row.department,
        tool_name: row.tool_name,
        category,
        description: row.description,
        criteria: row.criteria,
        status,
        admin_note: row.admin_note,
        manager_approval: row.manager_approval,
        estimated_date,
        admin_handler: handler_from_columns(
            row.admin_handler_uid,
            row.admin_handler_name,
            row.admin_handler_photo_url,
        ),
        manager_responder: handler_from_columns(
            row.manager_responder_uid,
            row.manager_responder_name,
            row.manager_responder_photo_url,
        ),
        supervisor_note,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Retrieves a ticket by its store-assigned id.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the ticket is not found.
pub fn get_request(
    conn: &mut SqliteConnection,
    request_id: i64,
) -> Result<Option<Ticket>, PersistenceError> {
    debug!("Looking up request by ID: {}", request_id);

    let row: Option<RequestRow> = requests::table
        .find(request_id)
        .select(RequestRow::as_select())
        .first(conn)
        .optional()?;

    row.map(row_to_ticket).transpose()
}

/// Retrieves all tickets ordered newest-first.
///
/// Ordering is done by the store: `created_at` descending with the
/// store-assigned id as a deterministic tie-breaker.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_requests(conn: &mut SqliteConnection) -> Result<Vec<Ticket>, PersistenceError> {
    let rows: Vec<RequestRow> = requests::table
        .order((requests::created_at.desc(), requests::request_id.desc()))
        .select(RequestRow::as_select())
        .load(conn)?;

    debug!(count = rows.len(), "Loaded ordered request list");

    rows.into_iter().map(row_to_ticket).collect()
}

/// Reads a daily counter value. An absent row reads as zero.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_counter(conn: &mut SqliteConnection, key: &str) -> Result<i64, PersistenceError> {
    let count: Option<i64> = counters::table
        .filter(counters::counter_key.eq(key))
        .select(counters::count)
        .first(conn)
        .optional()?;

    Ok(count.unwrap_or(0))
}
