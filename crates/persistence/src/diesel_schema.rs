// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Diesel table definitions for the tool request tracker schema.
//!
//! These mirror the embedded SQL migrations. Timestamps are stored as
//! ISO 8601 text so that lexicographic ordering matches chronological
//! ordering.

diesel::table! {
    requests (request_id) {
        request_id -> BigInt,
        ticket_no -> Text,
        applicant_uid -> Text,
        applicant_name -> Text,
        department -> Text,
        tool_name -> Text,
        category -> Text,
        description -> Text,
        criteria -> Text,
        status -> Text,
        admin_note -> Nullable<Text>,
        manager_approval -> Nullable<Text>,
        estimated_date -> Nullable<Text>,
        admin_handler_uid -> Nullable<Text>,
        admin_handler_name -> Nullable<Text>,
        admin_handler_photo_url -> Nullable<Text>,
        manager_responder_uid -> Nullable<Text>,
        manager_responder_name -> Nullable<Text>,
        manager_responder_photo_url -> Nullable<Text>,
        supervisor_uid -> Nullable<Text>,
        supervisor_name -> Nullable<Text>,
        supervisor_photo_url -> Nullable<Text>,
        supervisor_content -> Nullable<Text>,
        supervisor_updated_at -> Nullable<Text>,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    counters (counter_key) {
        counter_key -> Text,
        count -> BigInt,
    }
}

diesel::table! {
    users (uid) {
        uid -> Text,
        email -> Nullable<Text>,
        display_name -> Nullable<Text>,
        photo_url -> Nullable<Text>,
        department -> Nullable<Text>,
        role -> Text,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    sessions (session_id) {
        session_id -> BigInt,
        session_token -> Text,
        uid -> Text,
        created_at -> Text,
        last_activity_at -> Text,
        expires_at -> Text,
    }
}

diesel::joinable!(sessions -> users (uid));
diesel::allow_tables_to_appear_in_same_query!(requests, counters, users, sessions);
