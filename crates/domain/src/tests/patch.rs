// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::macros::date;

use crate::{AdminPatch, Handler, Patch, TicketStatus};

#[test]
fn test_default_patch_is_empty() {
    let patch = AdminPatch::default();
    assert!(patch.is_empty());
    assert!(!patch.clears_admin_note());
    assert!(!patch.sets_admin_note());
}

#[test]
fn test_absent_fields_decode_to_keep() {
    let patch: AdminPatch = serde_json::from_str("{}").unwrap();
    assert!(patch.is_empty());
}

#[test]
fn test_null_decodes_to_clear() {
    let patch: AdminPatch = serde_json::from_str(r#"{"estimated_date": null}"#).unwrap();
    assert_eq!(patch.estimated_date, Patch::Clear);
    assert!(patch.admin_handler.is_keep());
}

#[test]
fn test_value_decodes_to_set() {
    let patch: AdminPatch = serde_json::from_str(
        r#"{"status": "developing", "estimated_date": "2026-02-01"}"#,
    )
    .unwrap();
    assert_eq!(patch.status, Some(TicketStatus::Developing));
    assert_eq!(patch.estimated_date, Patch::Set(date!(2026 - 02 - 01)));
}

#[test]
fn test_handler_patch_decodes_wholesale() {
    let patch: AdminPatch = serde_json::from_str(
        r#"{"admin_handler": {"uid": "a1", "display_name": "Bob", "photo_url": null}}"#,
    )
    .unwrap();
    assert_eq!(
        patch.admin_handler,
        Patch::Set(Handler::new(String::from("a1"), String::from("Bob"), None))
    );
}

#[test]
fn test_whitespace_note_counts_as_clearing() {
    let patch = AdminPatch {
        admin_note: Some(String::from("   ")),
        ..AdminPatch::default()
    };
    assert!(patch.clears_admin_note());
    assert!(!patch.sets_admin_note());
}

#[test]
fn test_nonempty_note_counts_as_setting() {
    let patch = AdminPatch {
        admin_note: Some(String::from("waiting on vendor quote")),
        ..AdminPatch::default()
    };
    assert!(patch.sets_admin_note());
    assert!(!patch.clears_admin_note());
}

#[test]
fn test_keep_fields_skip_serialization() {
    let patch = AdminPatch {
        status: Some(TicketStatus::Done),
        ..AdminPatch::default()
    };
    let json = serde_json::to_string(&patch).unwrap();
    assert_eq!(json, r#"{"status":"done"}"#);
}

#[test]
fn test_clear_serializes_as_null() {
    let patch = AdminPatch {
        admin_handler: Patch::Clear,
        ..AdminPatch::default()
    };
    let json = serde_json::to_string(&patch).unwrap();
    assert_eq!(json, r#"{"admin_handler":null}"#);
}
