//! HTTP routes for account settings

use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::{error_response, json_response, parse_json_body, BoxBody, SuccessResponse};
use crate::auth::{hash_password, verify_password, MIN_PASSWORD_LEN};
use crate::db::users;
use crate::server::{authenticate, AppState};
use crate::types::CompassError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// PUT /api/settings/profile
pub async fn handle_update_profile(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let ctx = match authenticate(&state, &req) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    let body: UpdateProfileRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };
    if body.name.is_none() && body.email.is_none() {
        return error_response(&CompassError::Validation(
            "Provide at least one of name, email".into(),
        ));
    }

    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    match users::update_profile(
        &mut conn,
        &ctx.user_id,
        body.name.as_deref().map(str::trim),
        body.email.as_deref().map(str::trim),
    ) {
        Ok(user) => json_response(StatusCode::OK, &user),
        Err(e) => error_response(&e),
    }
}

/// PUT /api/settings/password
pub async fn handle_update_password(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let ctx = match authenticate(&state, &req) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    let body: UpdatePasswordRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };
    if body.new_password.len() < MIN_PASSWORD_LEN {
        return error_response(&CompassError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let mut conn = match state.db.conn() {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };

    let user = match users::get_user(&mut conn, &ctx.user_id) {
        Ok(Some(u)) => u,
        Ok(None) => return error_response(&CompassError::NotFound("User not found".into())),
        Err(e) => return error_response(&e),
    };

    match verify_password(&body.current_password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) | Err(_) => {
            return error_response(&CompassError::Auth(
                "Current password is incorrect".into(),
            ))
        }
    }

    let hash = match hash_password(&body.new_password) {
        Ok(h) => h,
        Err(e) => return error_response(&e),
    };
    match users::update_password_hash(&mut conn, &ctx.user_id, &hash) {
        Ok(()) => json_response(
            StatusCode::OK,
            &SuccessResponse {
                success: true,
                message: "Password updated".into(),
            },
        ),
        Err(e) => error_response(&e),
    }
}

/// DELETE /api/settings/account
///
/// Removes the account and every row it owns in one transaction.
pub async fn handle_delete_account(
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

    match users::delete_account(&mut conn, &ctx.user_id) {
        Ok(()) => {
            info!(user_id = %ctx.user_id, "Account deleted");
            json_response(
                StatusCode::OK,
                &SuccessResponse {
                    success: true,
                    message: "Account deleted".into(),
                },
            )
        }
        Err(e) => error_response(&e),
    }
}
