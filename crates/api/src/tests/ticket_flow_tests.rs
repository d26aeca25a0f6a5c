// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! End-to-end ticket flows through the API boundary: submission,
//! annotation coupling, supervisor replacement, identity sync, and role
//! management.

use std::str::FromStr;

use toolreq_domain::{AdminPatch, TicketStatus};
use toolreq_persistence::ProfileSync;

use crate::{
    ApiError, AuthenticationService, Role, create_ticket, sync_display_name, update_admin_fields,
    update_supervisor_note, update_user_role,
};

use super::helpers::{
    create_test_admin, create_test_supervisor, create_test_user, create_valid_request, later,
    setup_test_persistence, test_now,
};

#[test]
fn test_create_assigns_sequenced_number_and_pending_status() {
    let mut persistence = setup_test_persistence();

    let response = create_ticket(
        &mut persistence,
        &create_test_user(),
        &create_valid_request(),
        test_now(),
    )
    .expect("Failed to create ticket");

    assert_eq!(response.ticket_no, "REQ-20260116-001");

    let ticket = persistence
        .get_request(response.request_id)
        .expect("get")
        .expect("exists");
    assert_eq!(ticket.status, TicketStatus::Pending);
    assert_eq!(ticket.applicant.uid, "user-1");
    assert_eq!(ticket.applicant.display_name, "Alice");
}

#[test]
fn test_create_saves_department_preference() {
    let mut persistence = setup_test_persistence();

    create_ticket(
        &mut persistence,
        &create_test_user(),
        &create_valid_request(),
        test_now(),
    )
    .expect("Failed to create ticket");

    let profile = persistence
        .get_user_profile("user-1")
        .expect("get")
        .expect("profile provisioned by the advisory write");
    assert_eq!(profile.department.as_deref(), Some("Fabrication"));
}

#[test]
fn test_create_rejects_blank_tool_name_before_store_write() {
    let mut persistence = setup_test_persistence();

    let mut request = create_valid_request();
    request.tool_name = String::from("   ");

    let result = create_ticket(&mut persistence, &create_test_user(), &request, test_now());
    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "tool_name"
    ));

    // Nothing was sequenced.
    assert_eq!(
        persistence.get_counter("requests_20260116").expect("read"),
        0
    );
}

#[test]
fn test_note_written_without_handler_is_attributed_to_acting_admin() {
    let mut persistence = setup_test_persistence();
    let admin = create_test_admin();

    let created = create_ticket(
        &mut persistence,
        &create_test_user(),
        &create_valid_request(),
        test_now(),
    )
    .expect("create");

    update_admin_fields(
        &mut persistence,
        &admin,
        created.request_id,
        &AdminPatch {
            admin_note: Some(String::from("scheduled for next sprint")),
            ..AdminPatch::default()
        },
        later(10),
    )
    .expect("update");

    let ticket = persistence
        .get_request(created.request_id)
        .expect("get")
        .expect("exists");
    let handler = ticket.admin_handler.as_ref().expect("handler attributed");
    assert_eq!(handler.uid, "admin-1");
    assert_eq!(handler.display_name, "Bob");
    assert!(ticket.validate_attribution_coupling().is_ok());
}

#[test]
fn test_note_and_handler_stay_coupled_across_a_sequence_of_patches() {
    let mut persistence = setup_test_persistence();
    let admin = create_test_admin();

    let created = create_ticket(
        &mut persistence,
        &create_test_user(),
        &create_valid_request(),
        test_now(),
    )
    .expect("create");

    let patches = [
        AdminPatch {
            admin_note: Some(String::from("foo")),
            ..AdminPatch::default()
        },
        AdminPatch {
            status: Some(TicketStatus::Discussing),
            ..AdminPatch::default()
        },
        AdminPatch {
            admin_note: Some(String::from("   ")),
            ..AdminPatch::default()
        },
        AdminPatch {
            admin_note: Some(String::from("bar")),
            ..AdminPatch::default()
        },
    ];

    for (i, patch) in patches.iter().enumerate() {
        update_admin_fields(
            &mut persistence,
            &admin,
            created.request_id,
            patch,
            later(10 * (i64::try_from(i).expect("small index") + 1)),
        )
        .expect("update");

        let ticket = persistence
            .get_request(created.request_id)
            .expect("get")
            .expect("exists");
        // The coupling holds after every step, not just at the end.
        assert!(ticket.validate_attribution_coupling().is_ok());
    }
}

#[test]
fn test_supervisor_annotation_is_all_or_nothing() {
    let mut persistence = setup_test_persistence();
    let supervisor = create_test_supervisor();

    let created = create_ticket(
        &mut persistence,
        &create_test_user(),
        &create_valid_request(),
        test_now(),
    )
    .expect("create");

    update_supervisor_note(
        &mut persistence,
        &supervisor,
        created.request_id,
        "needs budget signoff",
        later(10),
    )
    .expect("write note");

    let note = persistence
        .get_request(created.request_id)
        .expect("get")
        .expect("exists")
        .supervisor_note
        .expect("annotation present");
    assert_eq!(note.uid, "sup-1");
    assert_eq!(note.display_name, "Sally");
    assert!(note.photo_url.is_some());
    assert_eq!(note.content, "needs budget signoff");

    update_supervisor_note(&mut persistence, &supervisor, created.request_id, "", later(20))
        .expect("clear note");

    let ticket = persistence
        .get_request(created.request_id)
        .expect("get")
        .expect("exists");
    assert!(ticket.supervisor_note.is_none());
}

#[test]
fn test_admin_update_on_missing_ticket_is_not_found() {
    let mut persistence = setup_test_persistence();
    let result = update_admin_fields(
        &mut persistence,
        &create_test_admin(),
        9999,
        &AdminPatch {
            status: Some(TicketStatus::Done),
            ..AdminPatch::default()
        },
        test_now(),
    );
    assert!(matches!(
        result,
        Err(ApiError::ResourceNotFound { ref resource_type, .. }) if resource_type == "Ticket"
    ));
}

#[test]
fn test_sync_display_name_reports_rewritten_count() {
    let mut persistence = setup_test_persistence();
    let user = create_test_user();

    create_ticket(&mut persistence, &user, &create_valid_request(), test_now()).expect("create");
    create_ticket(&mut persistence, &user, &create_valid_request(), test_now()).expect("create");

    let response = sync_display_name(&mut persistence, "user-1", "Alice Liddell", later(60))
        .expect("Failed to sync display name");
    assert_eq!(response.updated, 2);

    for ticket in persistence.list_requests().expect("list") {
        assert_eq!(ticket.applicant.display_name, "Alice Liddell");
    }
}

#[test]
fn test_profile_sync_login_triggers_name_propagation() {
    let mut persistence = setup_test_persistence();
    let user = create_test_user();

    create_ticket(&mut persistence, &user, &create_valid_request(), test_now()).expect("create");

    let payload = ProfileSync {
        uid: String::from("user-1"),
        email: Some(String::from("user-1@example.com")),
        display_name: Some(String::from("Alice")),
        photo_url: None,
    };
    AuthenticationService::sync_profile(&mut persistence, &payload, later(10))
        .expect("first sync");

    let renamed = ProfileSync {
        display_name: Some(String::from("Alice Liddell")),
        ..payload
    };
    AuthenticationService::sync_profile(&mut persistence, &renamed, later(20))
        .expect("second sync");

    let ticket = persistence
        .list_requests()
        .expect("list")
        .pop()
        .expect("exists");
    assert_eq!(ticket.applicant.display_name, "Alice Liddell");
}

#[test]
fn test_role_change_validates_against_closed_set() {
    let mut persistence = setup_test_persistence();
    let root = super::helpers::create_test_super_admin();

    let result = update_user_role(&mut persistence, &root, "user-1", "owner", test_now());
    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "role"
    ));

    let result = update_user_role(&mut persistence, &root, "user-missing", "admin", test_now());
    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[test]
fn test_role_parse_is_exhaustive_round_trip() {
    for role in [
        Role::Pending,
        Role::User,
        Role::Admin,
        Role::Supervisor,
        Role::SuperAdmin,
    ] {
        assert_eq!(Role::from_str(role.as_str()).expect("parse"), role);
    }
    assert!(Role::from_str("root").is_err());
}
