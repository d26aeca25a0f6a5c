// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction and authentication middleware for the server.
//!
//! This module provides Axum extractors for validating session tokens
//! and enforcing authentication at the server boundary.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use toolreq_api::{AuthenticatedUser, AuthenticationService};
use toolreq_persistence::ProfileData;

use crate::AppState;

/// Extracts the bearer token from an Authorization header, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Extractor for authenticated callers.
///
/// Validates the `Authorization: Bearer <token>` header against the
/// session store and returns the authenticated caller context.
///
/// # Errors
///
/// Rejects with HTTP 401 Unauthorized if:
/// - The Authorization header is missing or malformed
/// - The session token is invalid or expired
/// - The profile backing the session is gone
pub struct SessionUser(pub AuthenticatedUser, pub ProfileData);

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(|| {
            debug!("Missing or malformed Authorization header");
            SessionError::MissingAuthorizationHeader
        })?;

        let mut persistence = state.persistence.lock().await;
        let (user, profile) = AuthenticationService::validate_session(&mut persistence, token)
            .map_err(|e| {
                warn!(error = %e, "Session validation failed");
                SessionError::InvalidSession(e.to_string())
            })?;

        debug!(uid = %user.uid, role = %user.role, "Session validated");

        Ok(Self(user, profile))
    }
}

/// Session extraction errors.
#[derive(Debug)]
pub enum SessionError {
    /// Authorization header is missing or malformed.
    MissingAuthorizationHeader,
    /// Session validation failed.
    InvalidSession(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        match self {
            Self::MissingAuthorizationHeader => (
                StatusCode::UNAUTHORIZED,
                "Missing Authorization header. Expected: 'Bearer <token>'",
            )
                .into_response(),
            Self::InvalidSession(reason) => (
                StatusCode::UNAUTHORIZED,
                format!("Session validation failed: {reason}"),
            )
                .into_response(),
        }
    }
}
