use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};

use crate::web::{AppState, admin, categories, materials, storage, teachers};

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config().max_upload_bytes;

    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/categories",
            get(categories::list_categories)
                .post(categories::create_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        .route(
            "/materials",
            get(materials::list_materials)
                .post(materials::create_material)
                .put(materials::update_material)
                .delete(materials::delete_material),
        )
        .route(
            "/teachers",
            get(teachers::list_teachers)
                .post(teachers::create_teacher)
                .put(teachers::update_teacher)
                .delete(teachers::delete_teacher),
        )
        .route("/teachers/login", post(teachers::teacher_login))
        .route("/admin/login", post(admin::admin_login))
        .route("/admin/password", put(admin::change_admin_password))
        .route("/uploads/:file", get(storage::download_upload))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}
