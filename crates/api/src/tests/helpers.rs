// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use time::OffsetDateTime;
use time::macros::datetime;

use toolreq_persistence::Persistence;

use crate::{AuthenticatedUser, CreateTicketRequest, Role};

pub fn setup_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to initialize in-memory database")
}

pub fn test_now() -> OffsetDateTime {
    datetime!(2026-01-16 10:00:00 UTC)
}

pub fn later(seconds: i64) -> OffsetDateTime {
    test_now() + time::Duration::seconds(seconds)
}

pub fn create_actor(uid: &str, name: &str, role: Role) -> AuthenticatedUser {
    AuthenticatedUser::new(
        String::from(uid),
        Some(String::from(name)),
        Some(format!("{uid}@example.com")),
        Some(format!("https://avatars.example/{uid}.png")),
        role,
    )
}

pub fn create_test_user() -> AuthenticatedUser {
    create_actor("user-1", "Alice", Role::User)
}

pub fn create_test_pending() -> AuthenticatedUser {
    create_actor("pending-1", "Newcomer", Role::Pending)
}

pub fn create_test_admin() -> AuthenticatedUser {
    create_actor("admin-1", "Bob", Role::Admin)
}

pub fn create_test_supervisor() -> AuthenticatedUser {
    create_actor("sup-1", "Sally", Role::Supervisor)
}

pub fn create_test_super_admin() -> AuthenticatedUser {
    create_actor("root-1", "Root", Role::SuperAdmin)
}

pub fn create_valid_request() -> CreateTicketRequest {
    CreateTicketRequest {
        department: String::from("Fabrication"),
        tool_name: String::from("Jig generator"),
        category: None,
        description: String::from("Generate drill jigs from CAD exports"),
        criteria: String::from("Produces a valid jig for the sample export"),
    }
}
