// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bounded retry for optimistic write transactions.
//!
//! SQLite IMMEDIATE transactions take the write lock up front; a second
//! writer observes a busy/locked error instead of a deadlock. The sequencer
//! wraps its read-increment-write in this combinator so contention is
//! retried transparently and exhaustion surfaces as a typed
//! [`PersistenceError::TransactionAborted`] rather than looping silently.

use diesel::SqliteConnection;
use tracing::{debug, warn};

use crate::error::PersistenceError;

/// Retry budget for contended write transactions.
pub const MAX_TRANSACTION_ATTEMPTS: usize = 5;

/// Returns true for errors that indicate lock contention worth retrying.
fn is_busy(err: &PersistenceError) -> bool {
    match err {
        PersistenceError::DatabaseError(msg) => {
            msg.contains("database is locked") || msg.contains("database is busy")
        }
        _ => false,
    }
}

/// Runs `f` inside an IMMEDIATE transaction, retrying on lock contention.
///
/// The closure must be idempotent: it may run several times and only the
/// final committed execution takes effect. Non-contention errors abort the
/// transaction and are returned on the first occurrence.
///
/// # Errors
///
/// Returns `PersistenceError::TransactionAborted` once `max_attempts`
/// contended attempts have failed, or the closure's error unchanged for
/// any non-contention failure.
pub fn immediate_transaction_with_retry<T, F>(
    conn: &mut SqliteConnection,
    max_attempts: usize,
    mut f: F,
) -> Result<T, PersistenceError>
where
    F: FnMut(&mut SqliteConnection) -> Result<T, PersistenceError>,
{
    for attempt in 1..=max_attempts {
        match conn.immediate_transaction(&mut f) {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "Transaction committed after retry");
                }
                return Ok(value);
            }
            Err(err) if is_busy(&err) => {
                warn!(attempt, max_attempts, error = %err, "Write transaction contended, retrying");
            }
            Err(err) => return Err(err),
        }
    }

    Err(PersistenceError::TransactionAborted {
        attempts: max_attempts,
    })
}
