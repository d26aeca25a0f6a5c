// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

mod request_mutation_tests;
mod sequencer_tests;

use time::OffsetDateTime;
use time::macros::datetime;

use toolreq_domain::{Applicant, Handler, TicketCategory, TicketDraft};

use crate::Persistence;

pub fn setup_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to initialize in-memory database")
}

pub fn test_now() -> OffsetDateTime {
    datetime!(2026-01-16 10:00:00 UTC)
}

pub fn later(seconds: i64) -> OffsetDateTime {
    test_now() + time::Duration::seconds(seconds)
}

pub fn create_test_draft(uid: &str, name: &str) -> TicketDraft {
    TicketDraft {
        applicant: Applicant::new(String::from(uid), String::from(name)),
        department: String::from("Fabrication"),
        tool_name: String::from("Jig generator"),
        category: TicketCategory::Programming,
        description: String::from("Generate drill jigs from CAD exports"),
        criteria: String::from("Produces a valid jig for the sample export"),
    }
}

pub fn create_test_handler(uid: &str, name: &str) -> Handler {
    Handler::new(
        String::from(uid),
        String::from(name),
        Some(format!("https://avatars.example/{uid}.png")),
    )
}
