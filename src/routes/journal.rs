//! HTTP routes for activity logs and reflections (Check-Action)

use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use std::sync::Arc;

use super::{error_response, json_response, parse_json_body, query_param, BoxBody};
use crate::db::{logs, reflections};
use crate::server::{authenticate, AppState};
use crate::types::CompassError;

const DEFAULT_LOG_LIMIT: i64 = 50;
const DEFAULT_REFLECTION_LIMIT: i64 = 20;
const MAX_LIST_LIMIT: i64 = 200;

fn limit_from_query(query: Option<&str>, default: i64) -> i64 {
    query_param(query, "limit")
        .and_then(|v| v.parse::<i64>().ok())
        .filter(|n| *n > 0)
        .map(|n| n.min(MAX_LIST_LIMIT))
        .unwrap_or(default)
}

/// GET /api/logs?limit=N
pub async fn handle_list_logs(req: Request<Incoming>, state: Arc<AppState>) -> Response<BoxBody> {
    let ctx = match authenticate(&state, &req) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    let limit = limit_from_query(req.uri().query(), DEFAULT_LOG_LIMIT);

    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    match logs::list_logs(&mut conn, &ctx.user_id, limit) {
        Ok(list) => json_response(StatusCode::OK, &list),
        Err(e) => error_response(&e),
    }
}

/// POST /api/logs
pub async fn handle_create_log(req: Request<Incoming>, state: Arc<AppState>) -> Response<BoxBody> {
    let ctx = match authenticate(&state, &req) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    let input: logs::CreateLogInput = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };
    if input.content.trim().is_empty() {
        return error_response(&CompassError::Validation("Log content is required".into()));
    }

    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    match logs::create_log(&mut conn, &ctx.user_id, input) {
        Ok(log) => json_response(StatusCode::CREATED, &log),
        Err(e) => error_response(&e),
    }
}

/// GET /api/check-action?limit=N
pub async fn handle_list_reflections(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let ctx = match authenticate(&state, &req) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    let limit = limit_from_query(req.uri().query(), DEFAULT_REFLECTION_LIMIT);

    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    match reflections::list_reflections(&mut conn, &ctx.user_id, limit) {
        Ok(list) => json_response(StatusCode::OK, &list),
        Err(e) => error_response(&e),
    }
}

/// POST /api/check-action
pub async fn handle_create_reflection(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let ctx = match authenticate(&state, &req) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    let input: reflections::CreateReflectionInput = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };
    if input.period_start.trim().is_empty() || input.period_end.trim().is_empty() {
        return error_response(&CompassError::Validation(
            "Reflection period start and end are required".into(),
        ));
    }

    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    match reflections::create_reflection(&mut conn, &ctx.user_id, input) {
        Ok(reflection) => json_response(StatusCode::CREATED, &reflection),
        Err(e) => error_response(&e),
    }
}
