//! HTTP routes for goals and tasks (Plan-Do)
//!
//! All records are owned by the authenticated user; a record belonging to
//! someone else answers 404, never 403, so ids cannot be probed.

use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use std::sync::Arc;
use tracing::info;

use super::{error_response, json_response, parse_json_body, BoxBody, SuccessResponse};
use crate::db::{goals, tasks};
use crate::server::{authenticate, AppState};
use crate::types::CompassError;

/// GET /api/goals
pub async fn handle_list_goals(req: Request<Incoming>, state: Arc<AppState>) -> Response<BoxBody> {
    let ctx = match authenticate(&state, &req) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    match goals::list_goals_with_progress(&mut conn, &ctx.user_id) {
        Ok(list) => json_response(StatusCode::OK, &list),
        Err(e) => error_response(&e),
    }
}

/// POST /api/goals
pub async fn handle_create_goal(req: Request<Incoming>, state: Arc<AppState>) -> Response<BoxBody> {
    let ctx = match authenticate(&state, &req) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    let input: goals::CreateGoalInput = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };
    if input.title.trim().is_empty() {
        return error_response(&CompassError::Validation("Goal title is required".into()));
    }

    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    match goals::create_goal(&mut conn, &ctx.user_id, input) {
        Ok(goal) => {
            info!(user_id = %ctx.user_id, goal_id = %goal.id, "Created goal");
            json_response(StatusCode::CREATED, &goal)
        }
        Err(e) => error_response(&e),
    }
}

/// GET /api/goals/{id}
pub async fn handle_get_goal(
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

    match goals::get_goal(&mut conn, &id) {
        Ok(Some(goal)) if goal.user_id == ctx.user_id => json_response(StatusCode::OK, &goal),
        Ok(_) => error_response(&CompassError::NotFound(format!("Goal {id} not found"))),
        Err(e) => error_response(&e),
    }
}

/// PUT /api/goals/{id}
pub async fn handle_update_goal(
    req: Request<Incoming>,
    state: Arc<AppState>,
    id: String,
) -> Response<BoxBody> {
    let ctx = match authenticate(&state, &req) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    let input: goals::UpdateGoalInput = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };
    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    match goals::update_goal(&mut conn, &ctx.user_id, &id, input) {
        Ok(goal) => json_response(StatusCode::OK, &goal),
        Err(e) => error_response(&e),
    }
}

/// DELETE /api/goals/{id}
///
/// Removes the goal and all of its tasks.
pub async fn handle_delete_goal(
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

    match goals::delete_goal(&mut conn, &ctx.user_id, &id) {
        Ok(()) => {
            info!(user_id = %ctx.user_id, goal_id = %id, "Deleted goal and its tasks");
            json_response(
                StatusCode::OK,
                &SuccessResponse {
                    success: true,
                    message: "Goal deleted".into(),
                },
            )
        }
        Err(e) => error_response(&e),
    }
}

/// GET /api/goals/{id}/tasks
pub async fn handle_list_tasks(
    req: Request<Incoming>,
    state: Arc<AppState>,
    goal_id: String,
) -> Response<BoxBody> {
    let ctx = match authenticate(&state, &req) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    // Ownership check before listing
    match goals::get_goal(&mut conn, &goal_id) {
        Ok(Some(goal)) if goal.user_id == ctx.user_id => {}
        Ok(_) => {
            return error_response(&CompassError::NotFound(format!("Goal {goal_id} not found")))
        }
        Err(e) => return error_response(&e),
    }

    match tasks::list_tasks_for_goal(&mut conn, &goal_id) {
        Ok(list) => json_response(StatusCode::OK, &list),
        Err(e) => error_response(&e),
    }
}

/// POST /api/goals/{id}/tasks
pub async fn handle_create_task(
    req: Request<Incoming>,
    state: Arc<AppState>,
    goal_id: String,
) -> Response<BoxBody> {
    let ctx = match authenticate(&state, &req) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    let input: tasks::CreateTaskInput = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };
    if input.title.trim().is_empty() {
        return error_response(&CompassError::Validation("Task title is required".into()));
    }

    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    match tasks::create_task(&mut conn, &ctx.user_id, &goal_id, input) {
        Ok(task) => json_response(StatusCode::CREATED, &task),
        Err(e) => error_response(&e),
    }
}

/// PUT /api/tasks/{id}
pub async fn handle_update_task(
    req: Request<Incoming>,
    state: Arc<AppState>,
    id: String,
) -> Response<BoxBody> {
    let ctx = match authenticate(&state, &req) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    let input: tasks::UpdateTaskInput = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };
    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    match tasks::update_task(&mut conn, &ctx.user_id, &id, input) {
        Ok(task) => json_response(StatusCode::OK, &task),
        Err(e) => error_response(&e),
    }
}

/// DELETE /api/tasks/{id}
pub async fn handle_delete_task(
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

    match tasks::delete_task(&mut conn, &ctx.user_id, &id) {
        Ok(()) => json_response(
            StatusCode::OK,
            &SuccessResponse {
                success: true,
                message: "Task deleted".into(),
            },
        ),
        Err(e) => error_response(&e),
    }
}
