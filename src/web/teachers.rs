use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use rand_core::{OsRng, RngCore};
use serde::Deserialize;
use tracing::info;

use crate::{
    store::{self, Account, AccountProfile, Role},
    web::{
        AppState, auth,
        categories::IdQuery,
        responses::{
            ApiFailure, ApiSuccess, bad_request, internal_error, json_body, not_found, required,
        },
    },
};

pub const CHANGE_PASSWORD_ACTION: &str = "changePassword";

#[derive(Deserialize)]
pub struct CreateTeacherRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub current_password: Option<String>,
    #[serde(default)]
    pub new_password: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
}

#[derive(Deserialize)]
pub struct TeacherLoginRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

pub async fn list_teachers(
    State(state): State<AppState>,
) -> Result<Json<Vec<AccountProfile>>, ApiFailure> {
    let teachers = state
        .store()
        .teachers()
        .read()
        .await
        .map_err(|err| internal_error(err, "获取教师数据失败"))?;

    Ok(Json(teachers.iter().map(Account::profile).collect()))
}

pub async fn create_teacher(
    State(state): State<AppState>,
    payload: Result<Json<CreateTeacherRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AccountProfile>), ApiFailure> {
    let request = json_body(payload)?;
    let (Some(name), Some(password)) = (required(&request.name), request.password.as_deref())
    else {
        return Err(bad_request("教师姓名和密码不能为空"));
    };
    if password.is_empty() {
        return Err(bad_request("教师姓名和密码不能为空"));
    }

    let email = required(&request.email)
        .map(str::to_string)
        .unwrap_or_else(|| placeholder_email(name));

    let file = state.store().teachers();
    let mut teachers = file
        .read()
        .await
        .map_err(|err| internal_error(err, "添加教师失败"))?;

    if teachers.iter().any(|teacher| teacher.email == email) {
        return Err(bad_request("该邮箱已被使用"));
    }

    let (password_hash, salt) = auth::salted_hash(password);
    let teacher = Account {
        id: store::next_id(&teachers),
        name: name.to_string(),
        email,
        password_hash,
        salt,
        role: Role::Teacher,
    };
    teachers.push(teacher.clone());

    file.write(&teachers)
        .await
        .map_err(|err| internal_error(err, "添加教师失败"))?;

    info!(id = %teacher.id, name = %teacher.name, "teacher account created");
    Ok((StatusCode::CREATED, Json(teacher.profile())))
}

pub async fn update_teacher(
    State(state): State<AppState>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Json<ApiSuccess>, ApiFailure> {
    let request = json_body(payload)?;
    let Some(id) = required(&request.id) else {
        return Err(bad_request("缺少教师ID"));
    };

    let file = state.store().teachers();
    let mut teachers = file
        .read()
        .await
        .map_err(|err| internal_error(err, "更新教师信息失败"))?;

    let Some(index) = store::find_index(&teachers, id) else {
        return Err(not_found("未找到该教师"));
    };

    if request.action.as_deref() != Some(CHANGE_PASSWORD_ACTION) {
        return Err(bad_request("不支持的操作"));
    }

    change_password(&mut teachers[index], &request)?;

    file.write(&teachers)
        .await
        .map_err(|err| internal_error(err, "更新教师信息失败"))?;

    info!(%id, "teacher password changed");
    Ok(Json(ApiSuccess::with_message("密码更改成功")))
}

/// Deleting a teacher leaves their materials in place.
pub async fn delete_teacher(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<ApiSuccess>, ApiFailure> {
    let Some(id) = required(&query.id) else {
        return Err(bad_request("缺少教师ID"));
    };

    let file = state.store().teachers();
    let mut teachers = file
        .read()
        .await
        .map_err(|err| internal_error(err, "删除教师失败"))?;

    if !store::remove_by_id(&mut teachers, id) {
        return Err(not_found("未找到该教师"));
    }

    file.write(&teachers)
        .await
        .map_err(|err| internal_error(err, "删除教师失败"))?;

    info!(%id, "teacher account deleted");
    Ok(Json(ApiSuccess::ok()))
}

pub async fn teacher_login(
    State(state): State<AppState>,
    payload: Result<Json<TeacherLoginRequest>, JsonRejection>,
) -> Result<Json<AccountProfile>, ApiFailure> {
    let request = json_body(payload)?;
    let (Some(name), Some(password)) = (required(&request.name), request.password.as_deref())
    else {
        return Err(bad_request("用户名或密码错误"));
    };

    let teachers = state
        .store()
        .teachers()
        .read()
        .await
        .map_err(|err| internal_error(err, "登录失败，请重试"))?;

    let teacher = teachers
        .iter()
        .find(|teacher| teacher.name == name)
        .filter(|teacher| {
            auth::verify_credentials(password, &teacher.password_hash, &teacher.salt)
        })
        .ok_or_else(|| bad_request("用户名或密码错误"))?;

    Ok(Json(teacher.profile()))
}

/// Verify the current password and install a freshly salted new one.
///
/// Shared by the teacher and admin password endpoints.
pub fn change_password(
    account: &mut Account,
    request: &ChangePasswordRequest,
) -> Result<(), ApiFailure> {
    let (Some(current), Some(new)) = (
        request.current_password.as_deref().filter(|v| !v.is_empty()),
        request.new_password.as_deref().filter(|v| !v.is_empty()),
    ) else {
        return Err(bad_request("当前密码和新密码不能为空"));
    };

    if !auth::verify_credentials(current, &account.password_hash, &account.salt) {
        return Err(bad_request("当前密码不正确"));
    }

    let (password_hash, salt) = auth::salted_hash(new);
    account.password_hash = password_hash;
    account.salt = salt;
    Ok(())
}

fn placeholder_email(name: &str) -> String {
    let suffix = OsRng.next_u32() % 10_000;
    format!("{name}_{suffix}@example.com")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_teacher() -> Account {
        Account {
            id: "1".into(),
            name: "张老师".into(),
            email: "zhang@example.com".into(),
            password_hash: "oldpass1".into(),
            salt: String::new(),
            role: Role::Teacher,
        }
    }

    fn change(current: &str, new: &str) -> ChangePasswordRequest {
        ChangePasswordRequest {
            id: Some("1".into()),
            current_password: Some(current.into()),
            new_password: Some(new.into()),
            action: Some(CHANGE_PASSWORD_ACTION.into()),
        }
    }

    #[test]
    fn placeholder_email_embeds_name() {
        let email = placeholder_email("王老师");
        assert!(email.starts_with("王老师_"));
        assert!(email.ends_with("@example.com"));
        let suffix = &email["王老师_".len()..email.len() - "@example.com".len()];
        assert!(suffix.parse::<u32>().expect("numeric suffix") < 10_000);
    }

    #[test]
    fn legacy_password_upgrades_to_salted_hash() {
        let mut teacher = legacy_teacher();
        change_password(&mut teacher, &change("oldpass1", "newpass1")).expect("change");

        assert_eq!(teacher.salt.len(), 32);
        assert_ne!(teacher.password_hash, "newpass1");
        assert!(auth::verify_credentials("newpass1", &teacher.password_hash, &teacher.salt));
        assert!(!auth::verify_credentials("oldpass1", &teacher.password_hash, &teacher.salt));
    }

    #[test]
    fn wrong_current_password_leaves_account_untouched() {
        let mut teacher = legacy_teacher();
        let (status, body) =
            change_password(&mut teacher, &change("nope", "newpass1")).expect_err("rejected");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "当前密码不正确");
        assert_eq!(teacher, legacy_teacher());
    }

    #[test]
    fn blank_passwords_are_rejected() {
        let mut teacher = legacy_teacher();
        let (status, _) = change_password(&mut teacher, &change("", "x")).expect_err("rejected");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) =
            change_password(&mut teacher, &change("oldpass1", "")).expect_err("rejected");
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
