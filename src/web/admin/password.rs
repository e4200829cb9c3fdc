use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::info;

use crate::web::{
    AppState,
    responses::{ApiFailure, ApiSuccess, bad_request, internal_error, json_body},
    teachers::{CHANGE_PASSWORD_ACTION, ChangePasswordRequest, change_password},
};

/// The admin is a singleton, so any `id` in the request is ignored.
pub async fn change_admin_password(
    State(state): State<AppState>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Json<ApiSuccess>, ApiFailure> {
    let request = json_body(payload)?;
    if request.action.as_deref() != Some(CHANGE_PASSWORD_ACTION) {
        return Err(bad_request("不支持的操作"));
    }

    let file = state.store().admin();
    let mut admin = file
        .read()
        .await
        .map_err(|err| internal_error(err, "更改密码失败，请重试"))?;

    change_password(&mut admin, &request)?;

    file.write(&admin)
        .await
        .map_err(|err| internal_error(err, "保存管理员数据失败"))?;

    info!(id = %admin.id, "admin password changed");
    Ok(Json(ApiSuccess::with_message("密码更改成功")))
}
