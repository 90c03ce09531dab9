//! HTTP routes for authentication
//!
//! - POST /auth/register       - Create an account and get a JWT token
//! - POST /auth/login          - Authenticate and get a JWT token
//! - POST /auth/logout         - Stateless acknowledgement (tokens expire client-side)
//! - GET  /auth/me             - Current user info from token
//! - POST /auth/password-reset - Issue a temporary password
//!
//! Login failures never distinguish an unknown email from a wrong password.

use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use super::{error_response, json_response, parse_json_body, BoxBody, SuccessResponse};
use crate::auth::{generate_temp_password, hash_password, verify_password, MIN_PASSWORD_LEN};
use crate::db::models::User;
use crate::db::users;
use crate::server::{authenticate, AppState};
use crate::types::CompassError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_mentor: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: u64,
    pub user: User,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetResponse {
    pub success: bool,
    pub message: String,
    /// Present only when email delivery is unavailable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_password: Option<String>,
}

/// POST /auth/register
pub async fn handle_register(req: Request<Incoming>, state: Arc<AppState>) -> Response<BoxBody> {
    let body: RegisterRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };

    if body.name.trim().is_empty() || body.email.trim().is_empty() {
        return error_response(&CompassError::Validation(
            "Missing required fields: name, email".into(),
        ));
    }
    if body.password.len() < MIN_PASSWORD_LEN {
        return error_response(&CompassError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let password_hash = match hash_password(&body.password) {
        Ok(h) => h,
        Err(e) => return error_response(&e),
    };

    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    let user = match users::create_user(
        &mut conn,
        users::CreateUserInput {
            name: body.name.trim(),
            email: body.email.trim(),
            password_hash: &password_hash,
            is_mentor: body.is_mentor,
        },
    ) {
        Ok(u) => u,
        Err(e) => return error_response(&e),
    };

    let (token, expires_at) =
        match state
            .jwt
            .issue_token(&user.id, &user.email, &user.role, user.is_mentor != 0)
        {
            Ok(t) => t,
            Err(e) => return error_response(&e),
        };

    info!(user_id = %user.id, role = %user.role, "Registered new account");

    json_response(
        StatusCode::CREATED,
        &AuthResponse {
            token,
            expires_at,
            user,
        },
    )
}

/// POST /auth/login
pub async fn handle_login(req: Request<Incoming>, state: Arc<AppState>) -> Response<BoxBody> {
    let body: LoginRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };

    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    // One generic failure for unknown email and wrong password alike
    let invalid = || CompassError::Auth("Invalid email or password".into());

    let user = match users::get_user_by_email(&mut conn, body.email.trim()) {
        Ok(Some(u)) => u,
        Ok(None) => return error_response(&invalid()),
        Err(e) => return error_response(&e),
    };

    match verify_password(&body.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => return error_response(&invalid()),
        Err(_) => return error_response(&invalid()),
    }

    let (token, expires_at) =
        match state
            .jwt
            .issue_token(&user.id, &user.email, &user.role, user.is_mentor != 0)
        {
            Ok(t) => t,
            Err(e) => return error_response(&e),
        };

    info!(user_id = %user.id, "Login");

    json_response(
        StatusCode::OK,
        &AuthResponse {
            token,
            expires_at,
            user,
        },
    )
}

/// POST /auth/logout
///
/// Tokens are stateless; the client discards its copy.
pub fn handle_logout() -> Response<BoxBody> {
    json_response(
        StatusCode::OK,
        &SuccessResponse {
            success: true,
            message: "Logged out".into(),
        },
    )
}

/// GET /auth/me
pub async fn handle_me(req: Request<Incoming>, state: Arc<AppState>) -> Response<BoxBody> {
    let ctx = match authenticate(&state, &req) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    match users::get_user(&mut conn, &ctx.user_id) {
        Ok(Some(user)) => json_response(StatusCode::OK, &user),
        Ok(None) => error_response(&CompassError::NotFound("User not found".into())),
        Err(e) => error_response(&e),
    }
}

/// POST /auth/password-reset
///
/// Issues a temporary password and emails it. When email delivery fails (or
/// is not configured) the temporary password is returned in the response so
/// the flow still completes. Unknown emails get the same generic success to
/// avoid account enumeration.
pub async fn handle_password_reset(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let body: PasswordResetRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };

    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    let user = match users::get_user_by_email(&mut conn, body.email.trim()) {
        Ok(Some(u)) => u,
        Ok(None) => {
            return json_response(
                StatusCode::OK,
                &PasswordResetResponse {
                    success: true,
                    message: "If the account exists, a temporary password has been issued".into(),
                    temp_password: None,
                },
            )
        }
        Err(e) => return error_response(&e),
    };

    let temp_password = generate_temp_password();
    let password_hash = match hash_password(&temp_password) {
        Ok(h) => h,
        Err(e) => return error_response(&e),
    };
    if let Err(e) = users::update_password_hash(&mut conn, &user.id, &password_hash) {
        return error_response(&e);
    }

    let mail_body = format!(
        "Your temporary COM:PASS password is: {temp_password}\n\n\
         Please log in and change it from the settings page."
    );
    match state
        .mailer
        .send(&user.email, "Your temporary password", &mail_body)
        .await
    {
        Ok(()) => json_response(
            StatusCode::OK,
            &PasswordResetResponse {
                success: true,
                message: "A temporary password has been emailed to you".into(),
                temp_password: None,
            },
        ),
        Err(e) => {
            warn!(user_id = %user.id, "Email delivery unavailable, returning temp password inline: {e}");
            json_response(
                StatusCode::OK,
                &PasswordResetResponse {
                    success: true,
                    message: "Email delivery is unavailable; use this temporary password".into(),
                    temp_password: Some(temp_password),
                },
            )
        }
    }
}
