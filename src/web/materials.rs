use axum::{
    Json,
    extract::{
        Multipart, Query, State, multipart::MultipartRejection, rejection::JsonRejection,
    },
    http::StatusCode,
};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use tracing::info;

use crate::{
    store::{self, Material},
    web::{
        AppState,
        categories::IdQuery,
        responses::{
            ApiFailure, ApiSuccess, bad_request, internal_error, json_body, not_found, required,
        },
        storage,
        uploads::{self, FileFieldConfig, UploadForm},
    },
};

const FILE_FIELD: &str = "file";

#[derive(Default, Deserialize)]
pub struct MaterialFilter {
    #[serde(default)]
    category: Option<String>,
    #[serde(default, rename = "teacherId")]
    teacher_id: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateMaterialRequest {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

pub async fn list_materials(
    State(state): State<AppState>,
    Query(filter): Query<MaterialFilter>,
) -> Result<Json<Vec<Material>>, ApiFailure> {
    let materials = state
        .store()
        .materials()
        .read()
        .await
        .map_err(|err| internal_error(err, "获取课件数据失败"))?;

    Ok(Json(apply_filter(materials, &filter)))
}

/// Accepts the multipart upload, stores the file and records its metadata.
pub async fn create_material(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Material>), ApiFailure> {
    let multipart = multipart
        .map_err(|rejection| bad_request(format!("上传表单无效: {}", rejection.body_text())))?;

    let file_config = FileFieldConfig::new(FILE_FIELD, &state.config().allowed_extensions, 1);
    let form = uploads::read_upload_form(multipart, &[file_config])
        .await
        .map_err(|err| bad_request(err.message()))?;

    let (Some(title), Some(category), Some(uploaded_by), Some(file)) = (
        form_text(&form, "title"),
        form_text(&form, "category"),
        form_text(&form, "uploadedBy"),
        form.first_file_for(FILE_FIELD),
    ) else {
        return Err(bad_request("缺少必要参数"));
    };
    let description = form_text(&form, "description").unwrap_or_default();

    // Same-named uploads replace the earlier file on disk.
    let saved = uploads::persist_file(file, state.upload_dir())
        .await
        .map_err(|err| internal_error(err.into(), "添加课件失败"))?;
    info!(
        original = %saved.original_name,
        path = %saved.stored_path.display(),
        bytes = saved.file_size,
        "upload stored"
    );

    let materials_file = state.store().materials();
    let mut materials = materials_file
        .read()
        .await
        .map_err(|err| internal_error(err, "添加课件失败"))?;

    let material = Material {
        id: store::next_id(&materials),
        title: title.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        file_url: storage::public_url(&saved.stored_name),
        file_size: saved.file_size,
        upload_date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        uploaded_by: uploaded_by.to_string(),
    };
    materials.push(material.clone());

    materials_file
        .write(&materials)
        .await
        .map_err(|err| internal_error(err, "添加课件失败"))?;

    Ok((StatusCode::CREATED, Json(material)))
}

pub async fn update_material(
    State(state): State<AppState>,
    payload: Result<Json<UpdateMaterialRequest>, JsonRejection>,
) -> Result<Json<Material>, ApiFailure> {
    let request = json_body(payload)?;
    let (Some(id), Some(title), Some(category)) = (
        required(&request.id),
        required(&request.title),
        required(&request.category),
    ) else {
        return Err(bad_request("缺少必要参数"));
    };

    let file = state.store().materials();
    let mut materials = file
        .read()
        .await
        .map_err(|err| internal_error(err, "更新课件失败"))?;

    let Some(index) = store::find_index(&materials, id) else {
        return Err(not_found("未找到该课件"));
    };

    let material = &mut materials[index];
    material.title = title.to_string();
    material.description = request.description.as_deref().unwrap_or("").to_string();
    material.category = category.to_string();
    let updated = material.clone();

    file.write(&materials)
        .await
        .map_err(|err| internal_error(err, "更新课件失败"))?;

    Ok(Json(updated))
}

/// Removes the record only; the uploaded file stays where it is.
pub async fn delete_material(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<ApiSuccess>, ApiFailure> {
    let Some(id) = required(&query.id) else {
        return Err(bad_request("缺少课件ID"));
    };

    let file = state.store().materials();
    let mut materials = file
        .read()
        .await
        .map_err(|err| internal_error(err, "删除课件失败"))?;

    if !store::remove_by_id(&mut materials, id) {
        return Err(not_found("未找到该课件"));
    }

    file.write(&materials)
        .await
        .map_err(|err| internal_error(err, "删除课件失败"))?;

    info!(%id, "material deleted");
    Ok(Json(ApiSuccess::ok()))
}

fn form_text<'a>(form: &'a UploadForm, name: &str) -> Option<&'a str> {
    form.first_text(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn apply_filter(materials: Vec<Material>, filter: &MaterialFilter) -> Vec<Material> {
    let category = filter.category.as_deref().filter(|value| !value.is_empty());
    let teacher_id = filter.teacher_id.as_deref().filter(|value| !value.is_empty());

    materials
        .into_iter()
        .filter(|material| category.is_none_or(|wanted| material.category == wanted))
        .filter(|material| teacher_id.is_none_or(|wanted| material.uploaded_by == wanted))
        .collect()
}
