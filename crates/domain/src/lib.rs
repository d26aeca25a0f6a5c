// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod error;
mod patch;
mod ticket_no;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use error::DomainError;
pub use patch::{AdminPatch, Patch};
pub use ticket_no::{counter_key, format_ticket_no, shard_key, shard_key_utc};
pub use types::{
    Applicant, Handler, SupervisorNote, Ticket, TicketCategory, TicketDraft, TicketStatus,
};
pub use validation::{resolve_applicant_name, validate_draft};
