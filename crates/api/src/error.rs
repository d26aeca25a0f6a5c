// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use toolreq_domain::DomainError;
use toolreq_persistence::PersistenceError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A role string is not part of the closed role set.
    InvalidRole {
        /// The unrecognized role string.
        role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::InvalidRole { role } => write!(f, "Invalid role: '{role}'"),
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/persistence errors and represent the API
/// contract: every mutating operation's failure is distinguishable as
/// invalid-input, permission-denied, not-found, transient-retryable, or
/// store-outage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    /// Never retried.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// Invalid input was provided. Rejected before any store interaction.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found. Not retried.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// A transactional write exhausted its retry budget. The caller may
    /// retry the whole logical operation.
    TransactionAborted {
        /// How many attempts were made before giving up.
        attempts: usize,
    },
    /// The backing store is unreachable or failing.
    StoreUnavailable {
        /// A description of the store failure.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::TransactionAborted { attempts } => {
                write!(f, "Transaction aborted after {attempts} attempts")
            }
            Self::StoreUnavailable { message } => {
                write!(f, "Store unavailable: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
            AuthError::InvalidRole { role } => Self::InvalidInput {
                field: String::from("role"),
                message: format!("Unknown role: '{role}'"),
            },
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked
/// directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::MissingField(field) => ApiError::InvalidInput {
            field: String::from(field),
            message: format!("Required field '{field}' is missing or blank"),
        },
        DomainError::InvalidStatus(msg) => ApiError::InvalidInput {
            field: String::from("status"),
            message: format!("Unknown ticket status: {msg}"),
        },
        DomainError::InvalidCategory(msg) => ApiError::InvalidInput {
            field: String::from("category"),
            message: format!("Unknown ticket category: {msg}"),
        },
        DomainError::AttributionCoupling { ticket_no, reason } => ApiError::Internal {
            message: format!("Attribution coupling violated on {ticket_no}: {reason}"),
        },
        DomainError::DateParseError { date_string, error } => ApiError::InvalidInput {
            field: String::from("date"),
            message: format!("Failed to parse date '{date_string}': {error}"),
        },
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound(message) => Self::ResourceNotFound {
                resource_type: String::from("Record"),
                message,
            },
            PersistenceError::TransactionAborted { attempts } => {
                Self::TransactionAborted { attempts }
            }
            PersistenceError::DatabaseError(message)
            | PersistenceError::DatabaseConnectionFailed(message)
            | PersistenceError::QueryFailed(message) => Self::StoreUnavailable { message },
            PersistenceError::SessionNotFound(reason)
            | PersistenceError::SessionExpired(reason) => Self::AuthenticationFailed { reason },
            other => Self::Internal {
                message: other.to_string(),
            },
        }
    }
}
