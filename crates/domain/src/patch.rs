// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Sparse partial-update representation for ticket mutations.
//!
//! A patch field has three states: leave the stored value untouched, clear
//! it, or set a new value. In JSON payloads these map to an absent field,
//! an explicit `null`, and a value respectively. Containing structs must
//! mark `Patch` fields `#[serde(default)]` so an absent field decodes to
//! [`Patch::Keep`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::Date;

use crate::types::{Handler, Ticket, TicketCategory, TicketStatus};

/// One field of a sparse patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// Leave the stored value untouched.
    #[default]
    Keep,
    /// Remove the stored value.
    Clear,
    /// Replace the stored value.
    Set(T),
}

impl<T> Patch<T> {
    /// Returns true if this field leaves the stored value untouched.
    #[must_use]
    pub const fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }

    /// Converts from `&Patch<T>` to `Patch<&T>`.
    #[must_use]
    pub const fn as_ref(&self) -> Patch<&T> {
        match self {
            Self::Keep => Patch::Keep,
            Self::Clear => Patch::Clear,
            Self::Set(v) => Patch::Set(v),
        }
    }

    /// Maps a `Patch<T>` to `Patch<U>` by applying a function to a
    /// contained value.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Patch<U> {
        match self {
            Self::Keep => Patch::Keep,
            Self::Clear => Patch::Clear,
            Self::Set(v) => Patch::Set(f(v)),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // A present field is either null (Clear) or a value (Set). Absent
        // fields never reach here; #[serde(default)] yields Keep.
        Option::<T>::deserialize(deserializer).map(|opt| opt.map_or(Self::Clear, Self::Set))
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Keep has no wire representation of its own; callers skip it
            // via #[serde(skip_serializing_if = "Patch::is_keep")].
            Self::Keep | Self::Clear => serializer.serialize_none(),
            Self::Set(v) => serializer.serialize_some(v),
        }
    }
}

/// Sparse patch applied by `update_admin_fields`.
///
/// Absent fields are left untouched. `admin_note` cannot be cleared to
/// absent directly; setting it to a whitespace-only value empties the note
/// and removes the handler attribution with it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdminPatch {
    /// New triage state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    /// New filing category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<TicketCategory>,
    /// New admin annotation. Whitespace-only empties the note and removes
    /// the handler attribution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_note: Option<String>,
    /// New manager approval text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_approval: Option<String>,
    /// Delivery estimate: keep, clear, or set.
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub estimated_date: Patch<Date>,
    /// Admin annotation attribution: keep, clear, or set.
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub admin_handler: Patch<Handler>,
    /// Manager approval attribution: keep, clear, or set.
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub manager_responder: Patch<Handler>,
}

impl AdminPatch {
    /// Returns true if no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.category.is_none()
            && self.admin_note.is_none()
            && self.manager_approval.is_none()
            && self.estimated_date.is_keep()
            && self.admin_handler.is_keep()
            && self.manager_responder.is_keep()
    }

    /// Returns true if this patch empties the admin note, which forces the
    /// handler attribution to be removed with it.
    #[must_use]
    pub fn clears_admin_note(&self) -> bool {
        self.admin_note
            .as_deref()
            .is_some_and(|n| n.trim().is_empty())
    }

    /// Returns true if this patch writes a non-empty admin note.
    #[must_use]
    pub fn sets_admin_note(&self) -> bool {
        self.admin_note
            .as_deref()
            .is_some_and(|n| !n.trim().is_empty())
    }
}

impl Ticket {
    /// Applies a sparse admin patch to this ticket.
    ///
    /// Absent fields are left untouched. Emptying the admin note removes
    /// the handler attribution with it, regardless of what the patch
    /// carries for `admin_handler`. `updated_at` is always refreshed.
    pub fn apply_admin_patch(&mut self, patch: &AdminPatch, now: &str) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(approval) = &patch.manager_approval {
            self.manager_approval = Some(approval.clone());
        }
        match &patch.estimated_date {
            Patch::Keep => {}
            Patch::Clear => self.estimated_date = None,
            Patch::Set(date) => self.estimated_date = Some(*date),
        }
        match &patch.manager_responder {
            Patch::Keep => {}
            Patch::Clear => self.manager_responder = None,
            Patch::Set(handler) => self.manager_responder = Some(handler.clone()),
        }
        if patch.clears_admin_note() {
            // An emptied note takes its attribution with it.
            self.admin_note = None;
            self.admin_handler = None;
        } else {
            if let Some(note) = &patch.admin_note {
                self.admin_note = Some(note.clone());
            }
            match &patch.admin_handler {
                Patch::Keep => {}
                Patch::Clear => self.admin_handler = None,
                Patch::Set(handler) => self.admin_handler = Some(handler.clone()),
            }
        }
        self.updated_at = now.to_string();
    }
}
