use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use tracing::warn;

use crate::{
    store::AccountProfile,
    web::{
        AppState, auth,
        responses::{ApiFailure, bad_request, internal_error, json_body},
    },
};

const INVALID_CREDENTIALS: &str = "邮箱或密码不正确";

#[derive(Deserialize)]
pub struct AdminLoginRequest {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

/// Checks the singleton admin credentials and returns the profile without secrets.
pub async fn admin_login(
    State(state): State<AppState>,
    payload: Result<Json<AdminLoginRequest>, JsonRejection>,
) -> Result<Json<AccountProfile>, ApiFailure> {
    let request = json_body(payload)?;
    let admin = state
        .store()
        .admin()
        .read()
        .await
        .map_err(|err| internal_error(err, "登录失败，请重试"))?;

    if request.email.as_deref() != Some(admin.email.as_str()) {
        return Err(bad_request(INVALID_CREDENTIALS));
    }

    let password = request.password.as_deref().unwrap_or_default();
    if !auth::verify_credentials(password, &admin.password_hash, &admin.salt) {
        warn!("rejected admin login attempt");
        return Err(bad_request(INVALID_CREDENTIALS));
    }

    Ok(Json(admin.profile()))
}
