//! HTTP routes for analysis reports, action plans, and the AI assistant

use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::{error_response, json_response, parse_json_body, query_param, BoxBody};
use crate::db::models::ChatMessage;
use crate::db::{action_plans, chat, logs, reflections, reports};
use crate::server::{authenticate, AppState};
use crate::services::{AnalysisInput, ChatMode};
use crate::types::CompassError;

const REPORT_LIST_LIMIT: i64 = 20;
const ANALYSIS_LOG_WINDOW: i64 = 10;
const CHAT_HISTORY_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAnalysisRequest {
    /// Reflection to analyze; when absent the run uses recent logs only
    #[serde(default)]
    pub reflection_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSendRequest {
    pub mode: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSendResponse {
    pub reply: ChatMessage,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

/// POST /api/analysis/generate
///
/// Runs the analysis provider over the named reflection (owner-checked) and
/// the user's recent logs, then persists the report.
pub async fn handle_generate_analysis(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let ctx = match authenticate(&state, &req) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    let body: GenerateAnalysisRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };

    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    let reflection = match &body.reflection_id {
        Some(id) => match reflections::get_reflection(&mut conn, id) {
            Ok(Some(r)) if r.user_id == ctx.user_id => Some(r),
            Ok(_) => {
                return error_response(&CompassError::NotFound(format!(
                    "Reflection {id} not found"
                )))
            }
            Err(e) => return error_response(&e),
        },
        None => None,
    };

    let recent_logs = match logs::list_logs(&mut conn, &ctx.user_id, ANALYSIS_LOG_WINDOW) {
        Ok(l) => l,
        Err(e) => return error_response(&e),
    };

    let output = match state
        .analysis
        .analyze(&AnalysisInput {
            reflection: reflection.clone(),
            recent_logs,
        })
        .await
    {
        Ok(o) => o,
        Err(e) => return error_response(&e),
    };

    let report = match reports::create_report(
        &mut conn,
        &ctx.user_id,
        reports::CreateReportInput {
            reflection_id: reflection.as_ref().map(|r| r.id.as_str()),
            summary: &output.summary,
            strengths: &output.strengths,
            improvements: &output.improvements,
            suggestions: &output.suggestions,
        },
    ) {
        Ok(r) => r,
        Err(e) => return error_response(&e),
    };

    info!(user_id = %ctx.user_id, report_id = %report.id, "Generated analysis report");
    json_response(StatusCode::CREATED, &report)
}

/// GET /api/analysis
pub async fn handle_list_reports(
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

    match reports::list_reports(&mut conn, &ctx.user_id, REPORT_LIST_LIMIT) {
        Ok(list) => json_response(StatusCode::OK, &list),
        Err(e) => error_response(&e),
    }
}

/// GET /api/action-plans
pub async fn handle_list_action_plans(
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

    match action_plans::list_action_plans(&mut conn, &ctx.user_id) {
        Ok(list) => json_response(StatusCode::OK, &list),
        Err(e) => error_response(&e),
    }
}

/// POST /api/action-plans
pub async fn handle_create_action_plan(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let ctx = match authenticate(&state, &req) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    let input: action_plans::CreateActionPlanInput = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };
    if input.title.trim().is_empty() {
        return error_response(&CompassError::Validation(
            "Action plan title is required".into(),
        ));
    }

    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    match action_plans::create_action_plan(&mut conn, &ctx.user_id, input) {
        Ok(plan) => json_response(StatusCode::CREATED, &plan),
        Err(e) => error_response(&e),
    }
}

/// PUT /api/action-plans/{id}
pub async fn handle_set_action_plan_status(
    req: Request<Incoming>,
    state: Arc<AppState>,
    id: String,
) -> Response<BoxBody> {
    let ctx = match authenticate(&state, &req) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    let body: SetStatusRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };
    if !matches!(body.status.as_str(), "open" | "done") {
        return error_response(&CompassError::Validation(format!(
            "Unknown action plan status: {}",
            body.status
        )));
    }

    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    match action_plans::set_status(&mut conn, &ctx.user_id, &id, &body.status) {
        Ok(plan) => json_response(StatusCode::OK, &plan),
        Err(e) => error_response(&e),
    }
}

/// POST /api/ai-assistant/chat/send
///
/// Persists the user's message, generates the assistant reply for the mode,
/// persists it too, and returns the assistant message.
pub async fn handle_chat_send(req: Request<Incoming>, state: Arc<AppState>) -> Response<BoxBody> {
    let ctx = match authenticate(&state, &req) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    let body: ChatSendRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };

    let mode = match ChatMode::parse(&body.mode) {
        Ok(m) => m,
        Err(e) => return error_response(&e),
    };
    if body.message.trim().is_empty() {
        return error_response(&CompassError::Validation("Message is required".into()));
    }

    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    let history = match chat::list_history(&mut conn, &ctx.user_id, mode.as_str(), CHAT_HISTORY_LIMIT)
    {
        Ok(h) => h,
        Err(e) => return error_response(&e),
    };

    if let Err(e) = chat::append_message(&mut conn, &ctx.user_id, mode.as_str(), "user", &body.message)
    {
        return error_response(&e);
    }

    let reply_text = match state.chat.reply(mode, &history, &body.message).await {
        Ok(r) => r,
        Err(e) => return error_response(&e),
    };

    match chat::append_message(&mut conn, &ctx.user_id, mode.as_str(), "assistant", &reply_text) {
        Ok(reply) => json_response(StatusCode::OK, &ChatSendResponse { reply }),
        Err(e) => error_response(&e),
    }
}

/// GET /api/ai-assistant/chat/history?mode=...
pub async fn handle_chat_history(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let ctx = match authenticate(&state, &req) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    let mode_value = match query_param(req.uri().query(), "mode") {
        Some(m) => m.to_string(),
        None => {
            return error_response(&CompassError::Validation(
                "Query parameter 'mode' is required".into(),
            ))
        }
    };
    let mode = match ChatMode::parse(&mode_value) {
        Ok(m) => m,
        Err(e) => return error_response(&e),
    };

    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    match chat::list_history(&mut conn, &ctx.user_id, mode.as_str(), CHAT_HISTORY_LIMIT) {
        Ok(list) => json_response(StatusCode::OK, &list),
        Err(e) => error_response(&e),
    }
}
