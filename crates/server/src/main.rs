// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{error, info};

use toolreq_api::{
    ApiError, AuthenticationService, CreateTicketRequest, CreateTicketResponse,
    ListTicketsResponse, SyncProfileRequest, SyncProfileResponse, TicketCapabilities, TicketFeed,
    TicketFilter, UpdateSupervisorNoteRequest, UpdateUserRoleRequest, WhoAmIResponse,
    compute_ticket_capabilities, create_ticket, delete_ticket, list_tickets, update_admin_fields,
    update_supervisor_note, update_user_role,
};
use toolreq_domain::{AdminPatch, TicketCategory, TicketStatus};
use toolreq_persistence::Persistence;

mod live;
mod session;

use session::{SessionUser, bearer_token};

/// HTTP server for the tool request tracker.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// The persistence layer, serialized behind a mutex.
    persistence: Arc<Mutex<Persistence>>,
    /// The live ticket feed. Mutation handlers publish fresh snapshots
    /// here after every successful write.
    feed: TicketFeed,
}

/// JSON error payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// JSON success payload for mutations with no other response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OkResponse {
    /// A success message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::TransactionAborted { .. } => StatusCode::CONFLICT,
            ApiError::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %err, "API error");
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Filter criteria accepted as query parameters.
///
/// `status` and `category` take comma-separated lists; an absent
/// parameter means "all".
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct FilterParams {
    status: Option<String>,
    category: Option<String>,
    search: Option<String>,
}

impl FilterParams {
    /// Builds the ticket filter, rejecting unknown enum values.
    pub(crate) fn into_filter(self) -> Result<TicketFilter, HttpError> {
        let mut statuses = Vec::new();
        if let Some(raw) = &self.status {
            for part in raw.split(',').filter(|p| !p.is_empty()) {
                statuses.push(TicketStatus::from_str(part).map_err(|e| HttpError {
                    status: StatusCode::BAD_REQUEST,
                    message: e.to_string(),
                })?);
            }
        }

        let mut categories = Vec::new();
        if let Some(raw) = &self.category {
            for part in raw.split(',').filter(|p| !p.is_empty()) {
                categories.push(TicketCategory::from_str(part).map_err(|e| HttpError {
                    status: StatusCode::BAD_REQUEST,
                    message: e.to_string(),
                })?);
            }
        }

        Ok(TicketFilter {
            statuses,
            categories,
            search: self.search.filter(|s| !s.trim().is_empty()),
        })
    }
}

/// Publishes a fresh ordered snapshot to the live feed.
///
/// A failing re-query is forwarded to subscribers as a feed error rather
/// than silently stalling their streams.
fn publish_snapshot(feed: &TicketFeed, persistence: &mut Persistence) {
    match persistence.list_requests() {
        Ok(snapshot) => feed.publish(snapshot),
        Err(e) => feed.fail(&ApiError::from(e)),
    }
}

/// Handler for POST `/api/auth/sync`.
///
/// Accepts the trusted identity-provider payload, provisions or updates
/// the profile, and opens a session.
async fn handle_sync_profile(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<SyncProfileRequest>,
) -> Result<Json<SyncProfileResponse>, HttpError> {
    let now = OffsetDateTime::now_utc();
    let mut persistence = app_state.persistence.lock().await;

    let (session_token, _user, profile) =
        AuthenticationService::sync_profile(&mut persistence, &req, now)?;

    // A display-name change may have rewritten applicant names.
    publish_snapshot(&app_state.feed, &mut persistence);

    let role = profile.role.clone();
    Ok(Json(SyncProfileResponse {
        session_token,
        role,
        profile,
    }))
}

/// Handler for POST `/api/auth/logout`.
async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
) -> Result<Json<OkResponse>, HttpError> {
    let token = bearer_token(&headers).ok_or(HttpError {
        status: StatusCode::UNAUTHORIZED,
        message: String::from("Missing Authorization header"),
    })?;

    let mut persistence = app_state.persistence.lock().await;
    AuthenticationService::logout(&mut persistence, token)
        .map_err(|e| HttpError::from(ApiError::from(e)))?;

    Ok(Json(OkResponse {
        message: String::from("Logged out"),
    }))
}

/// Handler for GET `/api/whoami`.
async fn handle_whoami(SessionUser(user, profile): SessionUser) -> Json<WhoAmIResponse> {
    Json(WhoAmIResponse {
        capabilities: compute_ticket_capabilities(&user),
        profile,
    })
}

/// Handler for GET `/api/capabilities`.
async fn handle_capabilities(SessionUser(user, _): SessionUser) -> Json<TicketCapabilities> {
    Json(compute_ticket_capabilities(&user))
}

/// Handler for GET `/api/requests`.
async fn handle_list_requests(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(_, _): SessionUser,
    Query(params): Query<FilterParams>,
) -> Result<Json<ListTicketsResponse>, HttpError> {
    let filter = params.into_filter()?;
    let mut persistence = app_state.persistence.lock().await;
    let response = list_tickets(&mut persistence, &filter)?;
    Ok(Json(response))
}

/// Handler for POST `/api/requests`.
async fn handle_create_request(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, _): SessionUser,
    Json(req): Json<CreateTicketRequest>,
) -> Result<Json<CreateTicketResponse>, HttpError> {
    let now = OffsetDateTime::now_utc();
    let mut persistence = app_state.persistence.lock().await;

    let response = create_ticket(&mut persistence, &user, &req, now)?;
    publish_snapshot(&app_state.feed, &mut persistence);

    info!(ticket_no = %response.ticket_no, uid = %user.uid, "Ticket submitted");
    Ok(Json(response))
}

/// Handler for PATCH `/api/requests/{id}/admin`.
async fn handle_update_admin_fields(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, _): SessionUser,
    Path(request_id): Path<i64>,
    Json(patch): Json<AdminPatch>,
) -> Result<Json<OkResponse>, HttpError> {
    let now = OffsetDateTime::now_utc();
    let mut persistence = app_state.persistence.lock().await;

    update_admin_fields(&mut persistence, &user, request_id, &patch, now)?;
    publish_snapshot(&app_state.feed, &mut persistence);

    Ok(Json(OkResponse {
        message: format!("Ticket {request_id} updated"),
    }))
}

/// Handler for PATCH `/api/requests/{id}/supervisor`.
async fn handle_update_supervisor_note(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, _): SessionUser,
    Path(request_id): Path<i64>,
    Json(req): Json<UpdateSupervisorNoteRequest>,
) -> Result<Json<OkResponse>, HttpError> {
    let now = OffsetDateTime::now_utc();
    let mut persistence = app_state.persistence.lock().await;

    update_supervisor_note(&mut persistence, &user, request_id, &req.content, now)?;
    publish_snapshot(&app_state.feed, &mut persistence);

    Ok(Json(OkResponse {
        message: format!("Ticket {request_id} annotated"),
    }))
}

/// Handler for DELETE `/api/requests/{id}`.
async fn handle_delete_request(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, _): SessionUser,
    Path(request_id): Path<i64>,
) -> Result<Json<OkResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;

    delete_ticket(&mut persistence, &user, request_id)?;
    publish_snapshot(&app_state.feed, &mut persistence);

    Ok(Json(OkResponse {
        message: format!("Ticket {request_id} deleted"),
    }))
}

/// Handler for POST `/api/users/{uid}/role`.
async fn handle_update_user_role(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(user, _): SessionUser,
    Path(uid): Path<String>,
    Json(req): Json<UpdateUserRoleRequest>,
) -> Result<Json<OkResponse>, HttpError> {
    let now = OffsetDateTime::now_utc();
    let mut persistence = app_state.persistence.lock().await;

    update_user_role(&mut persistence, &user, &uid, &req.role, now)?;

    Ok(Json(OkResponse {
        message: format!("Role of {uid} set to {}", req.role),
    }))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/auth/sync", post(handle_sync_profile))
        .route("/api/auth/logout", post(handle_logout))
        .route("/api/whoami", get(handle_whoami))
        .route("/api/capabilities", get(handle_capabilities))
        .route("/api/requests", get(handle_list_requests))
        .route("/api/requests", post(handle_create_request))
        .route("/api/requests/{id}/admin", patch(handle_update_admin_fields))
        .route(
            "/api/requests/{id}/supervisor",
            patch(handle_update_supervisor_note),
        )
        .route("/api/requests/{id}", delete(handle_delete_request))
        .route("/api/users/{uid}/role", post(handle_update_user_role))
        .route("/api/live", get(live::live_tickets_handler))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing tool request tracker server");

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        feed: TicketFeed::new(),
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
