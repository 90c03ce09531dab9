//! HTTP server implementation
//!
//! hyper http1 with TokioIo; one spawned task per connection and a central
//! `match (method, path)` dispatch into the route modules.

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::auth::{extract_token_from_header, JwtValidator};
use crate::config::{Args, SKIP_AUTH_USER_ID};
use crate::db::{users, Db};
use crate::routes::{self, BoxBody};
use crate::services::{
    mailer_from_args, AnalysisProvider, ChatProvider, Mailer, TemplateAnalysisProvider,
    TemplateChatProvider,
};
use crate::types::{CompassError, Result};

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub db: Db,
    pub jwt: JwtValidator,
    pub mailer: Box<dyn Mailer>,
    pub analysis: Box<dyn AnalysisProvider>,
    pub chat: Box<dyn ChatProvider>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(args: Args, db: Db) -> Self {
        let jwt = JwtValidator::new(&args.jwt_secret(), args.jwt_expiry_seconds);
        let mailer = mailer_from_args(&args);

        Self {
            args,
            db,
            jwt,
            mailer,
            analysis: Box::new(TemplateAnalysisProvider),
            chat: Box::new(TemplateChatProvider),
            started_at: Instant::now(),
        }
    }
}

/// The authenticated caller of a request
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: String,
    pub email: String,
    pub role: String,
    pub is_mentor: bool,
}

impl AuthContext {
    /// Mentor gate shared by the mentor-side endpoints
    pub fn require_mentor(&self) -> Result<()> {
        if self.is_mentor {
            Ok(())
        } else {
            Err(CompassError::Forbidden(
                "This endpoint requires a mentor account".into(),
            ))
        }
    }
}

/// Resolve the caller from the Authorization header (or the fixed mock user
/// when --skip-auth is set).
pub fn authenticate(state: &AppState, req: &Request<Incoming>) -> Result<AuthContext> {
    if state.args.skip_auth {
        let mut conn = state.db.conn()?;
        let user = users::get_user(&mut conn, SKIP_AUTH_USER_ID)?
            .ok_or_else(|| CompassError::Internal("Mock user missing".into()))?;
        return Ok(AuthContext {
            user_id: user.id,
            email: user.email,
            role: user.role,
            is_mentor: user.is_mentor != 0,
        });
    }

    let token = extract_token_from_header(routes::get_auth_header(req))
        .ok_or_else(|| CompassError::Auth("Missing bearer token".into()))?;

    let result = state.jwt.verify_token(token);
    let claims = result
        .claims
        .ok_or_else(|| CompassError::Auth("Invalid or expired token".into()))?;

    Ok(AuthContext {
        user_id: claims.sub,
        email: claims.email,
        role: claims.role,
        is_mentor: claims.is_mentor,
    })
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<()> {
    if state.args.skip_auth {
        warn!("SKIP_AUTH enabled - all requests act as the fixed mock user");
        let mut conn = state.db.conn()?;
        users::ensure_user_with_id(
            &mut conn,
            SKIP_AUTH_USER_ID,
            users::CreateUserInput {
                name: "Mock User",
                email: "mock@compass.local",
                password_hash: "",
                is_mentor: true,
            },
        )?;
    }

    let listener = TcpListener::bind(state.args.listen)
        .await
        .map_err(CompassError::Io)?;

    info!(
        "COM:PASS listening on {} as node {}",
        state.args.listen, state.args.node_id
    );

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> std::result::Result<Response<BoxBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    if method == Method::OPTIONS {
        return Ok(routes::cors_preflight());
    }

    let response = match (method, path.as_str()) {
        // Unauthenticated surface
        (Method::GET, "/health") => routes::health::health_check(&state),
        (Method::GET, "/version") => routes::health::version_info(),

        (Method::POST, "/auth/register") => routes::auth_routes::handle_register(req, state).await,
        (Method::POST, "/auth/login") => routes::auth_routes::handle_login(req, state).await,
        (Method::POST, "/auth/logout") => routes::auth_routes::handle_logout(),
        (Method::GET, "/auth/me") => routes::auth_routes::handle_me(req, state).await,
        (Method::POST, "/auth/password-reset") => {
            routes::auth_routes::handle_password_reset(req, state).await
        }

        // Plan-Do: goals and tasks
        (Method::GET, "/api/goals") => routes::plan::handle_list_goals(req, state).await,
        (Method::POST, "/api/goals") => routes::plan::handle_create_goal(req, state).await,
        (Method::GET, p) if p.starts_with("/api/goals/") && p.ends_with("/tasks") => {
            let goal_id = strip_segment(p, "/api/goals/", "/tasks");
            routes::plan::handle_list_tasks(req, state, goal_id).await
        }
        (Method::POST, p) if p.starts_with("/api/goals/") && p.ends_with("/tasks") => {
            let goal_id = strip_segment(p, "/api/goals/", "/tasks");
            routes::plan::handle_create_task(req, state, goal_id).await
        }
        (Method::GET, p) if p.starts_with("/api/goals/") => {
            let id = p.strip_prefix("/api/goals/").unwrap_or("").to_string();
            routes::plan::handle_get_goal(req, state, id).await
        }
        (Method::PUT, p) if p.starts_with("/api/goals/") => {
            let id = p.strip_prefix("/api/goals/").unwrap_or("").to_string();
            routes::plan::handle_update_goal(req, state, id).await
        }
        (Method::DELETE, p) if p.starts_with("/api/goals/") => {
            let id = p.strip_prefix("/api/goals/").unwrap_or("").to_string();
            routes::plan::handle_delete_goal(req, state, id).await
        }
        (Method::PUT, p) if p.starts_with("/api/tasks/") => {
            let id = p.strip_prefix("/api/tasks/").unwrap_or("").to_string();
            routes::plan::handle_update_task(req, state, id).await
        }
        (Method::DELETE, p) if p.starts_with("/api/tasks/") => {
            let id = p.strip_prefix("/api/tasks/").unwrap_or("").to_string();
            routes::plan::handle_delete_task(req, state, id).await
        }

        // Check-Action: logs and reflections
        (Method::GET, "/api/logs") => routes::journal::handle_list_logs(req, state).await,
        (Method::POST, "/api/logs") => routes::journal::handle_create_log(req, state).await,
        (Method::GET, "/api/check-action") => {
            routes::journal::handle_list_reflections(req, state).await
        }
        (Method::POST, "/api/check-action") => {
            routes::journal::handle_create_reflection(req, state).await
        }

        // Analysis, action plans, AI assistant
        (Method::POST, "/api/analysis/generate") => {
            routes::insight::handle_generate_analysis(req, state).await
        }
        (Method::GET, "/api/analysis") => routes::insight::handle_list_reports(req, state).await,
        (Method::GET, "/api/action-plans") => {
            routes::insight::handle_list_action_plans(req, state).await
        }
        (Method::POST, "/api/action-plans") => {
            routes::insight::handle_create_action_plan(req, state).await
        }
        (Method::PUT, p) if p.starts_with("/api/action-plans/") => {
            let id = p.strip_prefix("/api/action-plans/").unwrap_or("").to_string();
            routes::insight::handle_set_action_plan_status(req, state, id).await
        }
        (Method::POST, "/api/ai-assistant/chat/send") => {
            routes::insight::handle_chat_send(req, state).await
        }
        (Method::GET, "/api/ai-assistant/chat/history") => {
            routes::insight::handle_chat_history(req, state).await
        }

        // Client-side permission and invite management
        (Method::GET, "/api/client/data-access") => {
            routes::client_access::handle_get_data_access(req, state).await
        }
        (Method::PUT, "/api/client/data-access") => {
            routes::client_access::handle_put_data_access(req, state).await
        }
        (Method::GET, "/api/client/invites") => {
            routes::client_access::handle_list_invites(req, state).await
        }

        // Notifications
        (Method::GET, "/api/notifications") => {
            routes::notifications::handle_list(req, state).await
        }
        (Method::PUT, p)
            if p.starts_with("/api/notifications/") && p.ends_with("/read") =>
        {
            let id = strip_segment(p, "/api/notifications/", "/read");
            routes::notifications::handle_mark_read(req, state, id).await
        }

        // Mentor-side surface
        (Method::POST, "/api/mentor/invite") => {
            routes::mentor::handle_invite(req, state).await
        }
        (Method::POST, p)
            if p.starts_with("/api/mentor/invites/") && p.ends_with("/accept") =>
        {
            let id = strip_segment(p, "/api/mentor/invites/", "/accept");
            routes::mentor::handle_accept_invite(req, state, id).await
        }
        (Method::POST, p)
            if p.starts_with("/api/mentor/invites/") && p.ends_with("/decline") =>
        {
            let id = strip_segment(p, "/api/mentor/invites/", "/decline");
            routes::mentor::handle_decline_invite(req, state, id).await
        }
        (Method::GET, "/api/mentor/dashboard") => {
            routes::mentor::handle_dashboard(req, state).await
        }
        (Method::GET, p) if p.starts_with("/api/mentor/client/") && p.ends_with("/notes") => {
            let client_id = strip_segment(p, "/api/mentor/client/", "/notes");
            routes::mentor::handle_list_notes(req, state, client_id).await
        }
        (Method::POST, p) if p.starts_with("/api/mentor/client/") && p.ends_with("/notes") => {
            let client_id = strip_segment(p, "/api/mentor/client/", "/notes");
            routes::mentor::handle_create_note(req, state, client_id).await
        }
        (Method::GET, p) if p.starts_with("/api/mentor/client/") => {
            let client_id = p.strip_prefix("/api/mentor/client/").unwrap_or("").to_string();
            routes::mentor::handle_client_detail(req, state, client_id).await
        }

        // Settings
        (Method::PUT, "/api/settings/profile") => {
            routes::settings::handle_update_profile(req, state).await
        }
        (Method::PUT, "/api/settings/password") => {
            routes::settings::handle_update_password(req, state).await
        }
        (Method::DELETE, "/api/settings/account") => {
            routes::settings::handle_delete_account(req, state).await
        }

        _ => routes::not_found(&path),
    };

    Ok(response)
}

/// Extract `{id}` from `prefix{id}suffix`
fn strip_segment(path: &str, prefix: &str, suffix: &str) -> String {
    path.strip_prefix(prefix)
        .and_then(|s| s.strip_suffix(suffix))
        .unwrap_or("")
        .to_string()
}
