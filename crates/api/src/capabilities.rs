// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Capability computation for authorization-aware UI gating.
//!
//! Capabilities expose what actions a caller is permitted to perform
//! without leaking domain internals. They are advisory only and do not
//! replace the data-layer role gate.

use crate::auth::{AuthenticatedUser, Role};
use crate::request_response::{Capability, TicketCapabilities};

/// Computes the ticket-surface capabilities for an authenticated caller.
///
/// The flags mirror the authorization predicates exactly; hiding a
/// control in the UI is a courtesy, the gate is enforced again at the
/// data boundary.
#[must_use]
pub const fn compute_ticket_capabilities(actor: &AuthenticatedUser) -> TicketCapabilities {
    match actor.role {
        Role::Pending => TicketCapabilities {
            can_submit: Capability::Denied,
            can_update_admin_fields: Capability::Denied,
            can_update_supervisor_note: Capability::Denied,
            can_delete: Capability::Denied,
            can_change_roles: Capability::Denied,
        },
        Role::User => TicketCapabilities {
            can_submit: Capability::Allowed,
            can_update_admin_fields: Capability::Denied,
            can_update_supervisor_note: Capability::Denied,
            can_delete: Capability::Denied,
            can_change_roles: Capability::Denied,
        },
        Role::Admin => TicketCapabilities {
            can_submit: Capability::Allowed,
            can_update_admin_fields: Capability::Allowed,
            can_update_supervisor_note: Capability::Denied,
            can_delete: Capability::Allowed,
            can_change_roles: Capability::Denied,
        },
        Role::Supervisor => TicketCapabilities {
            can_submit: Capability::Allowed,
            can_update_admin_fields: Capability::Denied,
            can_update_supervisor_note: Capability::Allowed,
            can_delete: Capability::Denied,
            can_change_roles: Capability::Denied,
        },
        Role::SuperAdmin => TicketCapabilities {
            can_submit: Capability::Allowed,
            can_update_admin_fields: Capability::Allowed,
            can_update_supervisor_note: Capability::Allowed,
            can_delete: Capability::Allowed,
            can_change_roles: Capability::Allowed,
        },
    }
}
