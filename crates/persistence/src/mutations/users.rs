// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User profile mutations.
//!
//! Profiles are provisioned from the external identity provider's payload.
//! A first-seen identity receives the `pending` role; role changes go
//! through `update_user_role` only.

use diesel::SqliteConnection;
use diesel::prelude::*;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::data_models::{ProfileSync, ProfileSyncOutcome, format_timestamp};
use crate::diesel_schema::users;
use crate::error::PersistenceError;
use crate::queries::users::get_user_profile;

/// Role assigned to first-seen identities awaiting approval.
const PROVISIONAL_ROLE: &str = "pending";

/// Upserts a profile from a trusted identity-provider payload.
///
/// Identity fields are merged: a field absent from the payload never
/// erases a stored value. The role is untouched for existing profiles.
/// The outcome reports whether the canonical display name changed so the
/// caller can trigger the applicant-name rewrite.
///
/// # Errors
///
/// Returns an error if the database write fails.
pub fn sync_user_profile(
    conn: &mut SqliteConnection,
    sync: &ProfileSync,
    now: OffsetDateTime,
) -> Result<ProfileSyncOutcome, PersistenceError> {
    let stamp = format_timestamp(now)?;

    let existing = get_user_profile(conn, &sync.uid)?;

    let display_name_changed = match &existing {
        Some(current) => match (&sync.display_name, &current.display_name) {
            (Some(new), Some(old)) => new != old,
            (Some(_), None) => true,
            _ => false,
        },
        None => false,
    };

    match existing {
        None => {
            info!(uid = %sync.uid, "Provisioning first-seen user with pending role");
            diesel::insert_into(users::table)
                .values((
                    users::uid.eq(&sync.uid),
                    users::email.eq(sync.email.as_deref()),
                    users::display_name.eq(sync.display_name.as_deref()),
                    users::photo_url.eq(sync.photo_url.as_deref()),
                    users::role.eq(PROVISIONAL_ROLE),
                    users::created_at.eq(&stamp),
                    users::updated_at.eq(&stamp),
                ))
                .execute(conn)?;
        }
        Some(current) => {
            let email = sync.email.clone().or(current.email);
            let display_name = sync.display_name.clone().or(current.display_name);
            let photo_url = sync.photo_url.clone().or(current.photo_url);

            diesel::update(users::table.find(&sync.uid))
                .set((
                    users::email.eq(email.as_deref()),
                    users::display_name.eq(display_name.as_deref()),
                    users::photo_url.eq(photo_url.as_deref()),
                    users::updated_at.eq(&stamp),
                ))
                .execute(conn)?;
        }
    }

    let profile = get_user_profile(conn, &sync.uid)?.ok_or_else(|| {
        PersistenceError::Other(format!("Profile {} missing after upsert", sync.uid))
    })?;

    Ok(ProfileSyncOutcome {
        profile,
        display_name_changed,
    })
}

/// Saves a user's department preference.
///
/// This is an advisory write performed alongside ticket creation; it
/// upserts so the preference survives even for a not-yet-provisioned uid.
///
/// # Errors
///
/// Returns an error if the database write fails.
pub fn save_user_department(
    conn: &mut SqliteConnection,
    uid: &str,
    department: &str,
    now: OffsetDateTime,
) -> Result<(), PersistenceError> {
    if uid.is_empty() || department.is_empty() {
        debug!("Skipping department save for empty uid or department");
        return Ok(());
    }

    let stamp = format_timestamp(now)?;

    diesel::insert_into(users::table)
        .values((
            users::uid.eq(uid),
            users::department.eq(department),
            users::role.eq(PROVISIONAL_ROLE),
            users::created_at.eq(&stamp),
            users::updated_at.eq(&stamp),
        ))
        .on_conflict(users::uid)
        .do_update()
        .set((
            users::department.eq(department),
            users::updated_at.eq(&stamp),
        ))
        .execute(conn)?;

    debug!(uid, department, "Department preference saved");
    Ok(())
}

/// Updates a user's role.
///
/// The role string is validated at the API boundary; this layer persists
/// it verbatim.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the profile does not exist.
pub fn update_user_role(
    conn: &mut SqliteConnection,
    uid: &str,
    role: &str,
    now: OffsetDateTime,
) -> Result<(), PersistenceError> {
    let stamp = format_timestamp(now)?;

    let rows_affected: usize = diesel::update(users::table.find(uid))
        .set((users::role.eq(role), users::updated_at.eq(&stamp)))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!("User {uid} not found")));
    }

    info!(uid, role, "User role updated");
    Ok(())
}
