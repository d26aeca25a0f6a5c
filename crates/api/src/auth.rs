// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use std::str::FromStr;

use time::{Duration, OffsetDateTime};
use tracing::info;

use toolreq_domain::Handler;
use toolreq_persistence::{
    Persistence, PersistenceError, ProfileData, ProfileSync, SessionData,
};

use crate::error::{ApiError, AuthError};

/// Caller roles for authorization.
///
/// The role field is a closed set checked exhaustively at the
/// authorization boundary; unknown strings are rejected, never coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// First-seen identity awaiting approval. Read-only.
    Pending,
    /// Regular user: may submit tickets and watch the dashboard.
    User,
    /// Admin: triages tickets (status, category, notes, estimates) and
    /// may delete them.
    Admin,
    /// Supervisor: owns the single-slot supervisor annotation.
    Supervisor,
    /// Super admin: union of admin and supervisor authority, plus role
    /// management.
    SuperAdmin,
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "supervisor" => Ok(Self::Supervisor),
            "super_admin" => Ok(Self::SuperAdmin),
            _ => Err(AuthError::InvalidRole {
                role: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Role {
    /// Converts this role to its persisted string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::User => "user",
            Self::Admin => "admin",
            Self::Supervisor => "supervisor",
            Self::SuperAdmin => "super_admin",
        }
    }
}

/// An authenticated caller with an externally resolved role.
///
/// The identity fields come from the trusted identity provider; the role
/// comes from the profile store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The caller's stable identity.
    pub uid: String,
    /// The caller's display name, if the provider supplied one.
    pub display_name: Option<String>,
    /// The caller's email, if the provider supplied one.
    pub email: Option<String>,
    /// Optional avatar URL.
    pub photo_url: Option<String>,
    /// The caller's role.
    pub role: Role,
}

impl AuthenticatedUser {
    /// Creates a new authenticated user.
    #[must_use]
    pub const fn new(
        uid: String,
        display_name: Option<String>,
        email: Option<String>,
        photo_url: Option<String>,
        role: Role,
    ) -> Self {
        Self {
            uid,
            display_name,
            email,
            photo_url,
            role,
        }
    }

    /// Builds the attribution handler for annotations written by this
    /// caller.
    #[must_use]
    pub fn to_handler(&self) -> Handler {
        Handler::new(
            self.uid.clone(),
            toolreq_domain::resolve_applicant_name(self.display_name.as_deref(), self.email.as_deref()),
            self.photo_url.clone(),
        )
    }

    fn from_profile(profile: &ProfileData) -> Result<Self, AuthError> {
        let role = Role::from_str(&profile.role)?;
        Ok(Self::new(
            profile.uid.clone(),
            profile.display_name.clone(),
            profile.email.clone(),
            profile.photo_url.clone(),
            role,
        ))
    }
}

/// Authorization service for enforcing role-based access control.
///
/// This is a pure predicate over (caller role, operation); it never
/// inspects payloads. Denial is a first-class outcome, enforced at the
/// data boundary regardless of what the UI hides.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks if a caller may submit a ticket.
    ///
    /// Every approved role may submit; `pending` identities are read-only
    /// until approved.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is still pending approval.
    pub fn authorize_create(actor: &AuthenticatedUser) -> Result<(), AuthError> {
        match actor.role {
            Role::User | Role::Admin | Role::Supervisor | Role::SuperAdmin => Ok(()),
            Role::Pending => Err(AuthError::Unauthorized {
                action: String::from("create_ticket"),
                required_role: String::from("user"),
            }),
        }
    }

    /// Checks if a caller may update admin fields on a ticket.
    ///
    /// # Errors
    ///
    /// Returns an error unless the caller is an admin or super admin.
    pub fn authorize_admin_update(actor: &AuthenticatedUser) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin | Role::SuperAdmin => Ok(()),
            Role::Pending | Role::User | Role::Supervisor => Err(AuthError::Unauthorized {
                action: String::from("update_admin_fields"),
                required_role: String::from("admin"),
            }),
        }
    }

    /// Checks if a caller may write the supervisor annotation.
    ///
    /// # Errors
    ///
    /// Returns an error unless the caller is a supervisor or super admin.
    pub fn authorize_supervisor_update(actor: &AuthenticatedUser) -> Result<(), AuthError> {
        match actor.role {
            Role::Supervisor | Role::SuperAdmin => Ok(()),
            Role::Pending | Role::User | Role::Admin => Err(AuthError::Unauthorized {
                action: String::from("update_supervisor_note"),
                required_role: String::from("supervisor"),
            }),
        }
    }

    /// Checks if a caller may delete a ticket.
    ///
    /// # Errors
    ///
    /// Returns an error unless the caller is an admin or super admin.
    pub fn authorize_delete(actor: &AuthenticatedUser) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin | Role::SuperAdmin => Ok(()),
            Role::Pending | Role::User | Role::Supervisor => Err(AuthError::Unauthorized {
                action: String::from("delete_ticket"),
                required_role: String::from("admin"),
            }),
        }
    }

    /// Checks if a caller may change another user's role.
    ///
    /// # Errors
    ///
    /// Returns an error unless the caller is a super admin.
    pub fn authorize_role_change(actor: &AuthenticatedUser) -> Result<(), AuthError> {
        match actor.role {
            Role::SuperAdmin => Ok(()),
            Role::Pending | Role::User | Role::Admin | Role::Supervisor => {
                Err(AuthError::Unauthorized {
                    action: String::from("update_user_role"),
                    required_role: String::from("super_admin"),
                })
            }
        }
    }
}

/// Authentication service for session-based access.
///
/// The identity provider itself is external and trusted; this service
/// turns its payloads into provisioned profiles and session tokens.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Default session expiration duration (30 days).
    const DEFAULT_SESSION_EXPIRATION: Duration = Duration::days(30);

    /// Syncs a trusted identity-provider payload and opens a session.
    ///
    /// First-seen identities are provisioned with the `pending` role.
    /// When the canonical display name changed, the applicant-name
    /// rewrite runs across the user's tickets before the session is
    /// returned.
    ///
    /// # Returns
    ///
    /// A tuple of (`session_token`, `authenticated_user`, `profile`).
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be written or the session
    /// cannot be created.
    pub fn sync_profile(
        persistence: &mut Persistence,
        payload: &ProfileSync,
        now: OffsetDateTime,
    ) -> Result<(String, AuthenticatedUser, ProfileData), ApiError> {
        if payload.uid.trim().is_empty() {
            return Err(ApiError::InvalidInput {
                field: String::from("uid"),
                message: String::from("uid must not be blank"),
            });
        }

        let outcome = persistence.sync_user_profile(payload, now)?;

        if outcome.display_name_changed
            && let Some(new_name) = outcome.profile.display_name.as_deref()
        {
            // Keep the denormalized applicant name consistent across the
            // user's tickets. Partial progress is safe to retry.
            let updated = persistence.sync_applicant_name(&outcome.profile.uid, new_name, now)?;
            info!(
                uid = %outcome.profile.uid,
                updated,
                "Display name changed; applicant name synced"
            );
        }

        let user = AuthenticatedUser::from_profile(&outcome.profile).map_err(ApiError::from)?;

        let session_token: String = Self::generate_session_token();
        let expires_at: OffsetDateTime = now + Self::DEFAULT_SESSION_EXPIRATION;
        let expires_at_str: String = expires_at
            .format(&time::format_description::well_known::Iso8601::DEFAULT)
            .map_err(|e| ApiError::Internal {
                message: format!("Failed to format expiration time: {e}"),
            })?;

        persistence.create_session(&session_token, &outcome.profile.uid, &expires_at_str)?;

        Ok((session_token, user, outcome.profile))
    }

    /// Validates a session token and returns the authenticated caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is invalid or expired, or the
    /// profile is missing.
    pub fn validate_session(
        persistence: &mut Persistence,
        session_token: &str,
    ) -> Result<(AuthenticatedUser, ProfileData), AuthError> {
        let session: SessionData = persistence
            .get_session_by_token(session_token)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        let expires_at: OffsetDateTime = OffsetDateTime::parse(
            &session.expires_at,
            &time::format_description::well_known::Iso8601::DEFAULT,
        )
        .map_err(|e| AuthError::AuthenticationFailed {
            reason: format!("Failed to parse session expiration: {e}"),
        })?;

        if OffsetDateTime::now_utc() > expires_at {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let profile: ProfileData = persistence
            .get_user_profile(&session.uid)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Profile not found"),
            })?;

        let user = AuthenticatedUser::from_profile(&profile)?;

        persistence
            .update_session_activity(session.session_id)
            .map_err(Self::map_persistence_error)?;

        Ok((user, profile))
    }

    /// Logs out by deleting the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the logout fails.
    pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), AuthError> {
        persistence
            .delete_session(session_token)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to delete session: {e}"),
            })?;

        Ok(())
    }

    /// Generates a session token.
    ///
    /// In a production system, this would use a cryptographically secure
    /// random number generator. For simplicity, we use a timestamp-based
    /// approach here.
    fn generate_session_token() -> String {
        use std::time::{SystemTime, UNIX_EPOCH};
        let timestamp: u128 = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards")
            .as_nanos();
        format!("session_{timestamp}_{}", rand::random::<u64>())
    }

    /// Maps persistence errors to authentication errors.
    fn map_persistence_error(err: PersistenceError) -> AuthError {
        match err {
            PersistenceError::SessionExpired(msg) | PersistenceError::SessionNotFound(msg) => {
                AuthError::AuthenticationFailed { reason: msg }
            }
            _ => AuthError::AuthenticationFailed {
                reason: format!("Database error: {err}"),
            },
        }
    }
}
