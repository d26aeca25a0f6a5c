// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::{debug, info};

use crate::diesel_schema::sessions;
use crate::error::PersistenceError;
use crate::sqlite;

/// Creates a new session for a user.
///
/// # Errors
///
/// Returns an error if the session cannot be created.
pub fn create_session(
    conn: &mut SqliteConnection,
    session_token: &str,
    uid: &str,
    expires_at: &str,
) -> Result<i64, PersistenceError> {
    debug!(uid, expires_at, "Creating session");

    diesel::insert_into(sessions::table)
        .values((
            sessions::session_token.eq(session_token),
            sessions::uid.eq(uid),
            sessions::expires_at.eq(expires_at),
        ))
        .execute(conn)?;

    let session_id: i64 = sqlite::get_last_insert_rowid(conn)?;

    debug!(session_id, uid, "Session created");
    Ok(session_id)
}

/// Updates the last activity timestamp for a session.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_session_activity(
    conn: &mut SqliteConnection,
    session_id: i64,
) -> Result<(), PersistenceError> {
    diesel::update(sessions::table)
        .filter(sessions::session_id.eq(session_id))
        .set(
            sessions::last_activity_at.eq(diesel::dsl::sql::<diesel::sql_types::Text>(
                "CURRENT_TIMESTAMP",
            )),
        )
        .execute(conn)?;

    Ok(())
}

/// Deletes a session by token. Used for logout.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_session(
    conn: &mut SqliteConnection,
    session_token: &str,
) -> Result<(), PersistenceError> {
    debug!("Deleting session by token");

    diesel::delete(sessions::table)
        .filter(sessions::session_token.eq(session_token))
        .execute(conn)?;

    Ok(())
}

/// Deletes all expired sessions. Periodic cleanup.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_expired_sessions(conn: &mut SqliteConnection) -> Result<usize, PersistenceError> {
    let rows_affected: usize = diesel::delete(sessions::table)
        .filter(
            sessions::expires_at.lt(diesel::dsl::sql::<diesel::sql_types::Text>(
                "CURRENT_TIMESTAMP",
            )),
        )
        .execute(conn)?;

    info!("Deleted {} expired sessions", rows_affected);
    Ok(rows_affected)
}
