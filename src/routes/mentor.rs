//! HTTP routes for the mentor-side surface
//!
//! Invitations, the dashboard, per-client detail (permission-gated), and
//! private notes. Client detail records audit rows after the response is
//! assembled; the audit write is best-effort and never fails the request.

use chrono::Utc;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::{error_response, json_response, parse_json_body, BoxBody};
use crate::db::{notes, notifications, relationships, users, view_logs};
use crate::mentor::{client_detail, dashboard};
use crate::server::{authenticate, AppState};
use crate::types::CompassError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteRequest {
    pub client_email: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub content: String,
}

/// POST /api/mentor/invite
pub async fn handle_invite(req: Request<Incoming>, state: Arc<AppState>) -> Response<BoxBody> {
    let ctx = match authenticate(&state, &req) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    if let Err(e) = ctx.require_mentor() {
        return error_response(&e);
    }
    let body: InviteRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };

    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    let client = match users::get_user_by_email(&mut conn, body.client_email.trim()) {
        Ok(Some(u)) => u,
        Ok(None) => {
            return error_response(&CompassError::NotFound(
                "No account with that email".into(),
            ))
        }
        Err(e) => return error_response(&e),
    };
    if client.id == ctx.user_id {
        return error_response(&CompassError::Validation(
            "You cannot invite yourself".into(),
        ));
    }

    let invite = match relationships::create_invite(&mut conn, &ctx.user_id, &client.id) {
        Ok(i) => i,
        Err(e) => return error_response(&e),
    };

    // Let the client know an invitation is waiting; best-effort
    let message = format!("{} invited you to a mentoring relationship", ctx.email);
    if let Err(e) =
        notifications::create_notification(&mut conn, &client.id, "mentor_invite", &message)
    {
        warn!(relationship_id = %invite.id, "Failed to notify client of invite: {e}");
    }

    info!(mentor_id = %ctx.user_id, client_id = %client.id, "Created invitation");
    json_response(StatusCode::CREATED, &invite)
}

/// POST /api/mentor/invites/{id}/accept
pub async fn handle_accept_invite(
    req: Request<Incoming>,
    state: Arc<AppState>,
    id: String,
) -> Response<BoxBody> {
    let ctx = match authenticate(&state, &req) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    match relationships::accept_invite(&mut conn, &id, &ctx.user_id) {
        Ok(rel) => {
            info!(relationship_id = %rel.id, "Invitation accepted");
            json_response(StatusCode::OK, &rel)
        }
        Err(e) => error_response(&e),
    }
}

/// POST /api/mentor/invites/{id}/decline
pub async fn handle_decline_invite(
    req: Request<Incoming>,
    state: Arc<AppState>,
    id: String,
) -> Response<BoxBody> {
    let ctx = match authenticate(&state, &req) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    match relationships::decline_invite(&mut conn, &id, &ctx.user_id) {
        Ok(rel) => json_response(StatusCode::OK, &rel),
        Err(e) => error_response(&e),
    }
}

/// GET /api/mentor/dashboard
pub async fn handle_dashboard(req: Request<Incoming>, state: Arc<AppState>) -> Response<BoxBody> {
    let ctx = match authenticate(&state, &req) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    if let Err(e) = ctx.require_mentor() {
        return error_response(&e);
    }
    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    match dashboard::build_dashboard(&mut conn, &ctx.user_id, Utc::now()) {
        Ok(board) => json_response(StatusCode::OK, &board),
        Err(e) => error_response(&e),
    }
}

/// GET /api/mentor/client/{id}
pub async fn handle_client_detail(
    req: Request<Incoming>,
    state: Arc<AppState>,
    client_id: String,
) -> Response<BoxBody> {
    let ctx = match authenticate(&state, &req) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    if let Err(e) = ctx.require_mentor() {
        return error_response(&e);
    }
    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    let (detail, audit) =
        match client_detail::build_client_detail(&mut conn, &ctx.user_id, &client_id, Utc::now()) {
            Ok(r) => r,
            Err(e) => return error_response(&e),
        };

    if !audit.is_empty() {
        if let Err(e) = view_logs::record_views(&mut conn, &ctx.user_id, &client_id, &audit) {
            warn!(mentor_id = %ctx.user_id, client_id = %client_id, "Audit write failed: {e}");
        }
    }

    json_response(StatusCode::OK, &detail)
}

/// GET /api/mentor/client/{id}/notes
pub async fn handle_list_notes(
    req: Request<Incoming>,
    state: Arc<AppState>,
    client_id: String,
) -> Response<BoxBody> {
    let ctx = match authenticate(&state, &req) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    if let Err(e) = ctx.require_mentor() {
        return error_response(&e);
    }
    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    // Notes exist only inside an active relationship
    match relationships::find_active(&mut conn, &ctx.user_id, &client_id) {
        Ok(Some(_)) => {}
        Ok(None) => {
            return error_response(&CompassError::NotFound(format!(
                "No active relationship with client {client_id}"
            )))
        }
        Err(e) => return error_response(&e),
    }

    match notes::list_notes(&mut conn, &ctx.user_id, &client_id) {
        Ok(list) => json_response(StatusCode::OK, &list),
        Err(e) => error_response(&e),
    }
}

/// POST /api/mentor/client/{id}/notes
pub async fn handle_create_note(
    req: Request<Incoming>,
    state: Arc<AppState>,
    client_id: String,
) -> Response<BoxBody> {
    let ctx = match authenticate(&state, &req) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    if let Err(e) = ctx.require_mentor() {
        return error_response(&e);
    }
    let body: CreateNoteRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };
    if body.content.trim().is_empty() {
        return error_response(&CompassError::Validation("Note content is required".into()));
    }

    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    match relationships::find_active(&mut conn, &ctx.user_id, &client_id) {
        Ok(Some(_)) => {}
        Ok(None) => {
            return error_response(&CompassError::NotFound(format!(
                "No active relationship with client {client_id}"
            )))
        }
        Err(e) => return error_response(&e),
    }

    match notes::create_note(&mut conn, &ctx.user_id, &client_id, body.content.trim()) {
        Ok(note) => json_response(StatusCode::CREATED, &note),
        Err(e) => error_response(&e),
    }
}
