use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::info;

use crate::{
    store::{self, Category},
    web::{
        AppState,
        responses::{
            ApiFailure, ApiSuccess, bad_request, internal_error, json_body, not_found, required,
        },
    },
};

#[derive(Deserialize)]
pub struct CreateCategoryRequest {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateCategoryRequest {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
pub struct IdQuery {
    #[serde(default)]
    pub id: Option<String>,
}

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, ApiFailure> {
    let categories = state
        .store()
        .categories()
        .read()
        .await
        .map_err(|err| internal_error(err, "获取科目数据失败"))?;

    Ok(Json(categories))
}

pub async fn create_category(
    State(state): State<AppState>,
    payload: Result<Json<CreateCategoryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Category>), ApiFailure> {
    let request = json_body(payload)?;
    let Some(name) = required(&request.name) else {
        return Err(bad_request("科目名称无效"));
    };

    let file = state.store().categories();
    let mut categories = file
        .read()
        .await
        .map_err(|err| internal_error(err, "添加科目失败"))?;

    if name_taken(&categories, name, None) {
        return Err(bad_request("该科目名称已存在"));
    }

    let category = Category {
        id: store::next_id(&categories),
        name: name.to_string(),
    };
    categories.push(category.clone());

    file.write(&categories)
        .await
        .map_err(|err| internal_error(err, "添加科目失败"))?;

    info!(id = %category.id, name = %category.name, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    payload: Result<Json<UpdateCategoryRequest>, JsonRejection>,
) -> Result<Json<Category>, ApiFailure> {
    let request = json_body(payload)?;
    let (Some(id), Some(name)) = (required(&request.id), required(&request.name)) else {
        return Err(bad_request("缺少科目ID或名称无效"));
    };

    let file = state.store().categories();
    let mut categories = file
        .read()
        .await
        .map_err(|err| internal_error(err, "更新科目失败"))?;

    let Some(index) = store::find_index(&categories, id) else {
        return Err(not_found("未找到该科目"));
    };

    if name_taken(&categories, name, Some(id)) {
        return Err(bad_request("更新后的科目名称已存在"));
    }

    categories[index].name = name.to_string();
    let updated = categories[index].clone();

    file.write(&categories)
        .await
        .map_err(|err| internal_error(err, "更新科目失败"))?;

    Ok(Json(updated))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<ApiSuccess>, ApiFailure> {
    let Some(id) = required(&query.id) else {
        return Err(bad_request("缺少科目ID"));
    };

    let file = state.store().categories();
    let mut categories = file
        .read()
        .await
        .map_err(|err| internal_error(err, "删除科目失败"))?;

    // Materials keep referencing the category by name; nothing cascades.
    if !store::remove_by_id(&mut categories, id) {
        return Err(not_found("未找到该科目"));
    }

    file.write(&categories)
        .await
        .map_err(|err| internal_error(err, "删除科目失败"))?;

    info!(%id, "category deleted");
    Ok(Json(ApiSuccess::ok()))
}

/// Case-insensitive name clash, ignoring the category with `except_id`.
fn name_taken(categories: &[Category], name: &str, except_id: Option<&str>) -> bool {
    let wanted = name.to_lowercase();
    categories
        .iter()
        .filter(|category| Some(category.id.as_str()) != except_id)
        .any(|category| category.name.to_lowercase() == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: &str, name: &str) -> Category {
        Category {
            id: id.into(),
            name: name.into(),
        }
    }

    #[test]
    fn name_clash_ignores_case() {
        let categories = vec![category("1", "Physics")];
        assert!(name_taken(&categories, "physics", None));
        assert!(name_taken(&categories, "PHYSICS", None));
        assert!(!name_taken(&categories, "Chemistry", None));
    }

    #[test]
    fn renaming_to_own_name_is_allowed() {
        let categories = vec![category("1", "Physics"), category("2", "Math")];
        assert!(!name_taken(&categories, "physics", Some("1")));
        assert!(name_taken(&categories, "math", Some("1")));
    }
}
