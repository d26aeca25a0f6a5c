// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::str::FromStr;

use crate::{
    Applicant, DomainError, Handler, Ticket, TicketCategory, TicketStatus,
};

fn ticket_fixture() -> Ticket {
    Ticket {
        request_id: 1,
        ticket_no: String::from("REQ-20260116-001"),
        applicant: Applicant::new(String::from("uid-1"), String::from("Alice")),
        department: String::from("Fabrication"),
        tool_name: String::from("Jig generator"),
        category: TicketCategory::Programming,
        description: String::from("Generate drill jigs from CAD exports"),
        criteria: String::from("Produces a valid jig for the sample export"),
        status: TicketStatus::Pending,
        admin_note: None,
        manager_approval: None,
        estimated_date: None,
        admin_handler: None,
        manager_responder: None,
        supervisor_note: None,
        created_at: String::from("2026-01-16T08:00:00Z"),
        updated_at: String::from("2026-01-16T08:00:00Z"),
    }
}

#[test]
fn test_status_round_trip() {
    for status in TicketStatus::all() {
        assert_eq!(TicketStatus::from_str(status.as_str()).unwrap(), status);
    }
}

#[test]
fn test_status_rejects_unknown() {
    assert_eq!(
        TicketStatus::from_str("archived"),
        Err(DomainError::InvalidStatus(String::from("archived")))
    );
}

#[test]
fn test_status_default_is_pending() {
    assert_eq!(TicketStatus::default(), TicketStatus::Pending);
}

#[test]
fn test_category_round_trip() {
    for category in [
        TicketCategory::Design,
        TicketCategory::Programming,
        TicketCategory::Other,
    ] {
        assert_eq!(
            TicketCategory::from_str(category.as_str()).unwrap(),
            category
        );
    }
}

#[test]
fn test_category_default_is_other() {
    assert_eq!(TicketCategory::default(), TicketCategory::Other);
}

#[test]
fn test_attribution_coupling_holds_when_both_absent() {
    let ticket = ticket_fixture();
    assert!(ticket.validate_attribution_coupling().is_ok());
}

#[test]
fn test_attribution_coupling_holds_when_both_present() {
    let mut ticket = ticket_fixture();
    ticket.admin_note = Some(String::from("scheduled for next sprint"));
    ticket.admin_handler = Some(Handler::new(
        String::from("admin-1"),
        String::from("Bob"),
        None,
    ));
    assert!(ticket.validate_attribution_coupling().is_ok());
}

#[test]
fn test_attribution_coupling_rejects_note_without_handler() {
    let mut ticket = ticket_fixture();
    ticket.admin_note = Some(String::from("scheduled for next sprint"));
    assert!(matches!(
        ticket.validate_attribution_coupling(),
        Err(DomainError::AttributionCoupling { .. })
    ));
}

#[test]
fn test_attribution_coupling_rejects_handler_with_blank_note() {
    let mut ticket = ticket_fixture();
    ticket.admin_note = Some(String::from("   "));
    ticket.admin_handler = Some(Handler::new(
        String::from("admin-1"),
        String::from("Bob"),
        None,
    ));
    assert!(matches!(
        ticket.validate_attribution_coupling(),
        Err(DomainError::AttributionCoupling { .. })
    ));
}

#[test]
fn test_status_serde_uses_lowercase() {
    let json = serde_json::to_string(&TicketStatus::Developing).unwrap();
    assert_eq!(json, "\"developing\"");
    let back: TicketStatus = serde_json::from_str("\"cancelled\"").unwrap();
    assert_eq!(back, TicketStatus::Cancelled);
}
