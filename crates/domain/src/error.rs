// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required field is missing or blank.
    MissingField(&'static str),
    /// Ticket status string is not recognized.
    InvalidStatus(String),
    /// Ticket category string is not recognized.
    InvalidCategory(String),
    /// The note/handler coupling invariant is violated.
    AttributionCoupling {
        /// The ticket number the violation was found on.
        ticket_no: String,
        /// Description of the violation.
        reason: String,
    },
    /// Failed to parse a date from a string.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "Required field '{field}' is missing or blank"),
            Self::InvalidStatus(msg) => write!(f, "Invalid ticket status: {msg}"),
            Self::InvalidCategory(msg) => write!(f, "Invalid ticket category: {msg}"),
            Self::AttributionCoupling { ticket_no, reason } => {
                write!(f, "Attribution coupling violated on {ticket_no}: {reason}")
            }
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
