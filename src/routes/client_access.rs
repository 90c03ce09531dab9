//! HTTP routes for client-side data-access permissions and invitations
//!
//! A client controls, per mentor relationship, which data categories the
//! mentor may see. Changing any flag notifies the mentor with the list of
//! changed categories; a no-op write sends nothing.

use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use super::{error_response, json_response, parse_json_body, BoxBody};
use crate::db::permissions::{self, PermissionFlags};
use crate::db::{notifications, relationships, users};
use crate::server::{authenticate, AppState};
use crate::types::CompassError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutDataAccessRequest {
    pub relationship_id: String,
    #[serde(flatten)]
    pub flags: PermissionFlags,
}

/// One relationship with its effective flags, as seen by the client
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipAccess {
    pub relationship_id: String,
    pub mentor_id: String,
    pub mentor_name: String,
    pub status: String,
    pub permissions: PermissionFlags,
}

/// A pending invitation, as seen by the invited client
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteView {
    pub relationship_id: String,
    pub mentor_id: String,
    pub mentor_name: String,
    pub invited_at: String,
}

/// GET /api/client/data-access
pub async fn handle_get_data_access(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let ctx = match authenticate(&state, &req) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    let rels = match relationships::list_for_client(&mut conn, &ctx.user_id) {
        Ok(r) => r,
        Err(e) => return error_response(&e),
    };

    let mut out = Vec::with_capacity(rels.len());
    for rel in rels {
        let flags = match permissions::effective_flags(&mut conn, &rel.id) {
            Ok(f) => f,
            Err(e) => return error_response(&e),
        };
        let mentor_name = match users::get_user(&mut conn, &rel.mentor_id) {
            Ok(Some(u)) => u.name,
            Ok(None) => String::new(),
            Err(e) => return error_response(&e),
        };
        out.push(RelationshipAccess {
            relationship_id: rel.id,
            mentor_id: rel.mentor_id,
            mentor_name,
            status: rel.status,
            permissions: flags,
        });
    }

    json_response(StatusCode::OK, &out)
}

/// PUT /api/client/data-access
///
/// 404 when the relationship does not exist, 403 when it belongs to another
/// client. Changed categories are reported to the mentor as a notification.
pub async fn handle_put_data_access(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let ctx = match authenticate(&state, &req) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    let body: PutDataAccessRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };

    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    let rel = match relationships::get_relationship(&mut conn, &body.relationship_id) {
        Ok(Some(r)) => r,
        Ok(None) => {
            return error_response(&CompassError::NotFound(format!(
                "Relationship {} not found",
                body.relationship_id
            )))
        }
        Err(e) => return error_response(&e),
    };
    if rel.client_id != ctx.user_id {
        return error_response(&CompassError::Forbidden(
            "Only the client in a relationship can change its permissions".into(),
        ));
    }

    let (row, previous) = match permissions::upsert_flags(&mut conn, &rel, body.flags) {
        Ok(r) => r,
        Err(e) => return error_response(&e),
    };

    let changed = body.flags.changed_categories(&previous);
    if !changed.is_empty() {
        info!(
            relationship_id = %rel.id,
            changed = ?changed,
            "Client updated data-access permissions"
        );
        let message = format!(
            "{} changed your access to: {}",
            ctx.email,
            changed.join(", ")
        );
        // Notification is best-effort; the permission change already happened
        if let Err(e) =
            notifications::create_notification(&mut conn, &rel.mentor_id, "permission_change", &message)
        {
            warn!(relationship_id = %rel.id, "Failed to notify mentor of permission change: {e}");
        }
    }

    json_response(StatusCode::OK, &row)
}

/// GET /api/client/invites
///
/// Pending invitations addressed to the authenticated client.
pub async fn handle_list_invites(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let ctx = match authenticate(&state, &req) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    let rels = match relationships::list_for_client(&mut conn, &ctx.user_id) {
        Ok(r) => r,
        Err(e) => return error_response(&e),
    };

    let mut out = Vec::new();
    for rel in rels.into_iter().filter(|r| r.status == "pending") {
        let mentor_name = match users::get_user(&mut conn, &rel.mentor_id) {
            Ok(Some(u)) => u.name,
            Ok(None) => String::new(),
            Err(e) => return error_response(&e),
        };
        out.push(InviteView {
            relationship_id: rel.id,
            mentor_id: rel.mentor_id,
            mentor_name,
            invited_at: rel.invited_at,
        });
    }

    json_response(StatusCode::OK, &out)
}
