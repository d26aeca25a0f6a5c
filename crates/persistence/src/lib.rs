// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the tool request tracker.
//!
//! This crate is the store adapter the rest of the system is written
//! against: transactional reads and writes over the `requests` and
//! `counters` collections plus the user-profile and session supplements.
//! It is built on Diesel over `SQLite`.
//!
//! ## Concurrency model
//!
//! Ticket creation is the only contended write path: the daily counter
//! increment and the ticket insert commit in one IMMEDIATE transaction,
//! retried on lock contention up to a bounded budget (see [`retry`]).
//! Every other mutation targets a single row by id and is last-write-wins.
//!
//! ## Testing
//!
//! Unit tests run against unique in-memory databases. Each call to
//! [`Persistence::new_in_memory`] receives a sequentially numbered shared
//! in-memory database, so tests are isolated without time-based names.

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
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;

use toolreq_domain::{AdminPatch, Handler, Ticket, TicketDraft};

mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
pub mod retry;
mod sqlite;

#[cfg(test)]
mod tests;

pub use data_models::{
    CreatedTicket, ProfileData, ProfileSync, ProfileSyncOutcome, SessionData,
};
pub use error::PersistenceError;

/// Atomic counter for generating unique in-memory database names.
///
/// This ensures deterministic test isolation by eliminating time-based
/// collisions.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter for tickets, counters, profiles, and sessions.
///
/// The adapter owns a single `SQLite` connection. It is constructed once
/// at process start and injected into the layers above; there is no
/// hidden global handle.
pub struct Persistence {
    pub(crate) conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite`
    /// database.
    ///
    /// Each call receives a unique database instance via atomic counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name = format!("memdb_toolreq_{db_id}");
        let shared_memory_url = format!("file:{db_name}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = sqlite::initialize_database(&shared_memory_url)?;
        sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite`
    /// database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = sqlite::initialize_database(path_str)?;

        // WAL mode for better read concurrency on file-backed databases
        sqlite::enable_wal_mode(&mut conn)?;
        sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    // ------------------------------------------------------------------
    // Tickets
    // ------------------------------------------------------------------

    /// Creates a ticket with the next sequential number for today's UTC
    /// day shard.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::TransactionAborted` if the sequenced
    /// write could not commit within its retry budget.
    pub fn create_request(
        &mut self,
        draft: &TicketDraft,
        now: OffsetDateTime,
    ) -> Result<CreatedTicket, PersistenceError> {
        mutations::requests::create_request(&mut self.conn, draft, now)
    }

    /// Retrieves a ticket by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails. Returns `Ok(None)` if the
    /// ticket is not found.
    pub fn get_request(&mut self, request_id: i64) -> Result<Option<Ticket>, PersistenceError> {
        queries::requests::get_request(&mut self.conn, request_id)
    }

    /// Retrieves all tickets ordered newest-first (store-side ordering,
    /// id tie-break).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_requests(&mut self) -> Result<Vec<Ticket>, PersistenceError> {
        queries::requests::list_requests(&mut self.conn)
    }

    /// Applies a sparse admin patch to a ticket.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the ticket does not exist.
    pub fn update_request_admin(
        &mut self,
        request_id: i64,
        patch: &AdminPatch,
        now: OffsetDateTime,
    ) -> Result<(), PersistenceError> {
        mutations::requests::update_request_admin(&mut self.conn, request_id, patch, now)
    }

    /// Replaces or removes a ticket's supervisor annotation wholesale.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the ticket does not exist.
    pub fn update_request_supervisor(
        &mut self,
        request_id: i64,
        content: &str,
        actor: &Handler,
        now: OffsetDateTime,
    ) -> Result<(), PersistenceError> {
        mutations::requests::update_request_supervisor(&mut self.conn, request_id, content, actor, now)
    }

    /// Rewrites the denormalized applicant name across every ticket
    /// submitted by the given user. Returns the rewritten row count.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn sync_applicant_name(
        &mut self,
        uid: &str,
        new_name: &str,
        now: OffsetDateTime,
    ) -> Result<usize, PersistenceError> {
        mutations::requests::sync_applicant_name(&mut self.conn, uid, new_name, now)
    }

    /// Deletes a ticket. Idempotent: a missing id is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_request(&mut self, request_id: i64) -> Result<(), PersistenceError> {
        mutations::requests::delete_request(&mut self.conn, request_id)
    }

    /// Reads a daily counter value. An absent counter reads as zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_counter(&mut self, key: &str) -> Result<i64, PersistenceError> {
        queries::requests::get_counter(&mut self.conn, key)
    }

    // ------------------------------------------------------------------
    // User profiles
    // ------------------------------------------------------------------

    /// Upserts a profile from a trusted identity-provider payload.
    /// First-seen identities are provisioned with the `pending` role.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn sync_user_profile(
        &mut self,
        sync: &ProfileSync,
        now: OffsetDateTime,
    ) -> Result<ProfileSyncOutcome, PersistenceError> {
        mutations::users::sync_user_profile(&mut self.conn, sync, now)
    }

    /// Saves a user's department preference (advisory write).
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn save_user_department(
        &mut self,
        uid: &str,
        department: &str,
        now: OffsetDateTime,
    ) -> Result<(), PersistenceError> {
        mutations::users::save_user_department(&mut self.conn, uid, department, now)
    }

    /// Retrieves a user profile by uid.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails. Returns `Ok(None)` if the
    /// profile is not found.
    pub fn get_user_profile(&mut self, uid: &str) -> Result<Option<ProfileData>, PersistenceError> {
        queries::users::get_user_profile(&mut self.conn, uid)
    }

    /// Updates a user's role.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the profile does not exist.
    pub fn update_user_role(
        &mut self,
        uid: &str,
        role: &str,
        now: OffsetDateTime,
    ) -> Result<(), PersistenceError> {
        mutations::users::update_user_role(&mut self.conn, uid, role, now)
    }

    // ------------------------------------------------------------------
    // Sessions
    // ------------------------------------------------------------------

    /// Creates a new session for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be created.
    pub fn create_session(
        &mut self,
        session_token: &str,
        uid: &str,
        expires_at: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::sessions::create_session(&mut self.conn, session_token, uid, expires_at)
    }

    /// Retrieves a session by its token.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails. Returns `Ok(None)` if the
    /// session is not found.
    pub fn get_session_by_token(
        &mut self,
        session_token: &str,
    ) -> Result<Option<SessionData>, PersistenceError> {
        queries::sessions::get_session_by_token(&mut self.conn, session_token)
    }

    /// Updates the last activity timestamp for a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn update_session_activity(&mut self, session_id: i64) -> Result<(), PersistenceError> {
        mutations::sessions::update_session_activity(&mut self.conn, session_id)
    }

    /// Deletes a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_session(&mut self, session_token: &str) -> Result<(), PersistenceError> {
        mutations::sessions::delete_session(&mut self.conn, session_token)
    }

    /// Deletes all expired sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_expired_sessions(&mut self) -> Result<usize, PersistenceError> {
        mutations::sessions::delete_expired_sessions(&mut self.conn)
    }
}
