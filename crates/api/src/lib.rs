// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary layer for the tool request tracker.
//!
//! This crate exposes the plain data operations the UI layer consumes:
//! ticket creation, role-gated partial updates, deletion, the live ticket
//! feed, and session-backed authentication against the external identity
//! provider. It owns no rendering, routing, or transport concerns.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod capabilities;
mod error;
mod handlers;
mod projector;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedUser, AuthenticationService, AuthorizationService, Role};
pub use capabilities::compute_ticket_capabilities;
pub use error::{ApiError, AuthError, translate_domain_error};
pub use handlers::{
    create_ticket, delete_ticket, list_tickets, sync_display_name, update_admin_fields,
    update_supervisor_note, update_user_role,
};
pub use projector::{FeedEvent, TicketFeed, TicketFilter, TicketSubscription};
pub use request_response::{
    Capability, CreateTicketRequest, CreateTicketResponse, IdentitySyncResponse,
    ListTicketsResponse, SyncProfileRequest, SyncProfileResponse, TicketCapabilities,
    UpdateSupervisorNoteRequest, UpdateUserRoleRequest, WhoAmIResponse,
};
