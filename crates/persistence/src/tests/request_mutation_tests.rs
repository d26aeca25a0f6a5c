// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Admin-patch and supervisor-annotation semantics: sparse updates,
//! note/handler coupling, all-or-nothing replacement, and idempotent
//! deletion.

use time::macros::date;

use toolreq_domain::{AdminPatch, Patch, Ticket, TicketCategory, TicketStatus};

use crate::PersistenceError;

use super::{
    create_test_draft, create_test_handler, later, setup_test_persistence, test_now,
};

fn create_ticket(persistence: &mut crate::Persistence) -> i64 {
    persistence
        .create_request(&create_test_draft("uid-1", "Alice"), test_now())
        .expect("Failed to create request")
        .request_id
}

fn get_ticket(persistence: &mut crate::Persistence, id: i64) -> Ticket {
    persistence
        .get_request(id)
        .expect("Failed to get request")
        .expect("Ticket must exist")
}

#[test]
fn test_patch_with_status_only_leaves_other_fields_untouched() {
    let mut persistence = setup_test_persistence();
    let id = create_ticket(&mut persistence);

    let patch = AdminPatch {
        status: Some(TicketStatus::Discussing),
        ..AdminPatch::default()
    };
    persistence
        .update_request_admin(id, &patch, later(10))
        .expect("Failed to update");

    let ticket = get_ticket(&mut persistence, id);
    assert_eq!(ticket.status, TicketStatus::Discussing);
    assert_eq!(ticket.category, TicketCategory::Programming);
    assert!(ticket.admin_note.is_none());
    assert!(ticket.estimated_date.is_none());
}

#[test]
fn test_patch_refreshes_updated_at() {
    let mut persistence = setup_test_persistence();
    let id = create_ticket(&mut persistence);
    let before = get_ticket(&mut persistence, id);

    persistence
        .update_request_admin(
            id,
            &AdminPatch {
                status: Some(TicketStatus::Developing),
                ..AdminPatch::default()
            },
            later(60),
        )
        .expect("Failed to update");

    let after = get_ticket(&mut persistence, id);
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at > after.created_at);
}

#[test]
fn test_setting_note_with_handler_persists_both() {
    let mut persistence = setup_test_persistence();
    let id = create_ticket(&mut persistence);

    let handler = create_test_handler("admin-1", "Bob");
    let patch = AdminPatch {
        admin_note: Some(String::from("scheduled for next sprint")),
        admin_handler: Patch::Set(handler.clone()),
        ..AdminPatch::default()
    };
    persistence
        .update_request_admin(id, &patch, later(10))
        .expect("Failed to update");

    let ticket = get_ticket(&mut persistence, id);
    assert_eq!(ticket.admin_note.as_deref(), Some("scheduled for next sprint"));
    assert_eq!(ticket.admin_handler, Some(handler));
    assert!(ticket.validate_attribution_coupling().is_ok());
}

#[test]
fn test_whitespace_note_removes_handler_atomically() {
    let mut persistence = setup_test_persistence();
    let id = create_ticket(&mut persistence);

    persistence
        .update_request_admin(
            id,
            &AdminPatch {
                admin_note: Some(String::from("foo")),
                admin_handler: Patch::Set(create_test_handler("admin-1", "Bob")),
                ..AdminPatch::default()
            },
            later(10),
        )
        .expect("Failed to set note");

    // Emptying the note must also remove the attribution, even though the
    // patch tries to keep a handler.
    persistence
        .update_request_admin(
            id,
            &AdminPatch {
                admin_note: Some(String::from("   ")),
                admin_handler: Patch::Set(create_test_handler("admin-2", "Mallory")),
                ..AdminPatch::default()
            },
            later(20),
        )
        .expect("Failed to clear note");

    let ticket = get_ticket(&mut persistence, id);
    assert!(ticket.admin_note.is_none());
    assert!(ticket.admin_handler.is_none());
    assert!(ticket.validate_attribution_coupling().is_ok());
}

#[test]
fn test_estimated_date_set_and_clear() {
    let mut persistence = setup_test_persistence();
    let id = create_ticket(&mut persistence);

    persistence
        .update_request_admin(
            id,
            &AdminPatch {
                estimated_date: Patch::Set(date!(2026 - 02 - 01)),
                ..AdminPatch::default()
            },
            later(10),
        )
        .expect("Failed to set date");
    assert_eq!(
        get_ticket(&mut persistence, id).estimated_date,
        Some(date!(2026 - 02 - 01))
    );

    persistence
        .update_request_admin(
            id,
            &AdminPatch {
                estimated_date: Patch::Clear,
                ..AdminPatch::default()
            },
            later(20),
        )
        .expect("Failed to clear date");
    assert!(get_ticket(&mut persistence, id).estimated_date.is_none());
}

#[test]
fn test_manager_responder_all_or_nothing() {
    let mut persistence = setup_test_persistence();
    let id = create_ticket(&mut persistence);

    let responder = create_test_handler("mgr-1", "Grace");
    persistence
        .update_request_admin(
            id,
            &AdminPatch {
                manager_approval: Some(String::from("approved")),
                manager_responder: Patch::Set(responder.clone()),
                ..AdminPatch::default()
            },
            later(10),
        )
        .expect("Failed to set responder");

    let ticket = get_ticket(&mut persistence, id);
    assert_eq!(ticket.manager_approval.as_deref(), Some("approved"));
    assert_eq!(ticket.manager_responder, Some(responder));

    persistence
        .update_request_admin(
            id,
            &AdminPatch {
                manager_responder: Patch::Clear,
                ..AdminPatch::default()
            },
            later(20),
        )
        .expect("Failed to clear responder");

    let ticket = get_ticket(&mut persistence, id);
    assert!(ticket.manager_responder.is_none());
    // The approval text is untouched by clearing the attribution.
    assert_eq!(ticket.manager_approval.as_deref(), Some("approved"));
}

#[test]
fn test_admin_update_missing_ticket_is_not_found() {
    let mut persistence = setup_test_persistence();
    let result = persistence.update_request_admin(
        9999,
        &AdminPatch {
            status: Some(TicketStatus::Done),
            ..AdminPatch::default()
        },
        test_now(),
    );
    assert!(matches!(result, Err(PersistenceError::NotFound(_))));
}

#[test]
fn test_supervisor_replace_is_wholesale() {
    let mut persistence = setup_test_persistence();
    let id = create_ticket(&mut persistence);

    persistence
        .update_request_supervisor(
            id,
            "needs budget signoff",
            &create_test_handler("sup-1", "Sally"),
            later(10),
        )
        .expect("Failed to write note");

    persistence
        .update_request_supervisor(
            id,
            "budget approved",
            &create_test_handler("sup-2", "Tom"),
            later(20),
        )
        .expect("Failed to replace note");

    let note = get_ticket(&mut persistence, id)
        .supervisor_note
        .expect("note must exist");
    // Every field belongs to the second write; nothing is merged.
    assert_eq!(note.uid, "sup-2");
    assert_eq!(note.display_name, "Tom");
    assert_eq!(note.content, "budget approved");
}

#[test]
fn test_empty_supervisor_content_clears_annotation() {
    let mut persistence = setup_test_persistence();
    let id = create_ticket(&mut persistence);

    persistence
        .update_request_supervisor(
            id,
            "needs budget signoff",
            &create_test_handler("sup-1", "Sally"),
            later(10),
        )
        .expect("Failed to write note");

    persistence
        .update_request_supervisor(id, "   ", &create_test_handler("sup-1", "Sally"), later(20))
        .expect("Failed to clear note");

    let ticket = get_ticket(&mut persistence, id);
    assert!(ticket.supervisor_note.is_none());
}

#[test]
fn test_supervisor_update_missing_ticket_is_not_found() {
    let mut persistence = setup_test_persistence();
    let result = persistence.update_request_supervisor(
        9999,
        "content",
        &create_test_handler("sup-1", "Sally"),
        test_now(),
    );
    assert!(matches!(result, Err(PersistenceError::NotFound(_))));
}

#[test]
fn test_delete_is_idempotent() {
    let mut persistence = setup_test_persistence();
    let id = create_ticket(&mut persistence);

    persistence.delete_request(id).expect("Failed to delete");
    assert!(persistence.get_request(id).expect("get").is_none());

    // Deleting again is not an error.
    persistence.delete_request(id).expect("Second delete must succeed");
}

#[test]
fn test_list_orders_newest_first_with_id_tiebreak() {
    let mut persistence = setup_test_persistence();

    // Same timestamp for all three: ordering falls back to the id.
    let now = test_now();
    let a = persistence
        .create_request(&create_test_draft("uid-1", "Alice"), now)
        .expect("create");
    let b = persistence
        .create_request(&create_test_draft("uid-2", "Bob"), now)
        .expect("create");
    let c = persistence
        .create_request(&create_test_draft("uid-3", "Carol"), now)
        .expect("create");

    let ids: Vec<i64> = persistence
        .list_requests()
        .expect("list")
        .iter()
        .map(|t| t.request_id)
        .collect();
    assert_eq!(ids, vec![c.request_id, b.request_id, a.request_id]);
}
