// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User profile queries.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;

use crate::data_models::ProfileData;
use crate::diesel_schema::users;
use crate::error::PersistenceError;

/// Diesel Queryable struct for user profile rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
pub(crate) struct UserRow {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub department: Option<String>,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<UserRow> for ProfileData {
    fn from(row: UserRow) -> Self {
        Self {
            uid: row.uid,
            email: row.email,
            display_name: row.display_name,
            photo_url: row.photo_url,
            department: row.department,
            role: row.role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Retrieves a user profile by uid.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the profile is not found.
pub fn get_user_profile(
    conn: &mut SqliteConnection,
    uid: &str,
) -> Result<Option<ProfileData>, PersistenceError> {
    debug!("Looking up user profile: {}", uid);

    let row: Option<UserRow> = users::table
        .find(uid)
        .select(UserRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(ProfileData::from))
}
