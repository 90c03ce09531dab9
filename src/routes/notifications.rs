//! HTTP routes for notifications

use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use std::sync::Arc;

use super::{error_response, json_response, BoxBody, SuccessResponse};
use crate::db::notifications;
use crate::server::{authenticate, AppState};

const NOTIFICATION_LIMIT: i64 = 50;

/// GET /api/notifications
pub async fn handle_list(req: Request<Incoming>, state: Arc<AppState>) -> Response<BoxBody> {
    let ctx = match authenticate(&state, &req) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    match notifications::list_notifications(&mut conn, &ctx.user_id, NOTIFICATION_LIMIT) {
        Ok(list) => json_response(StatusCode::OK, &list),
        Err(e) => error_response(&e),
    }
}

/// PUT /api/notifications/{id}/read
pub async fn handle_mark_read(
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

    match notifications::mark_read(&mut conn, &ctx.user_id, &id) {
        Ok(()) => json_response(
            StatusCode::OK,
            &SuccessResponse {
                success: true,
                message: "Notification marked read".into(),
            },
        ),
        Err(e) => error_response(&e),
    }
}
