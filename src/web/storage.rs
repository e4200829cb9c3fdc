use std::{io::ErrorKind, path::Path};

use axum::{
    extract::{Path as AxumPath, State},
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Response},
};
use mime::Mime;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

use crate::web::{
    AppState,
    responses::{ApiFailure, bad_request, internal_error, not_found},
};

/// Public URL prefix under which stored uploads are served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

pub fn public_url(stored_name: &str) -> String {
    format!("{UPLOADS_URL_PREFIX}/{stored_name}")
}

pub async fn download_upload(
    State(state): State<AppState>,
    AxumPath(file_name): AxumPath<String>,
) -> Result<Response, ApiFailure> {
    if !is_plain_file_name(&file_name) {
        return Err(bad_request("文件名无效"));
    }

    stream_file(&state.upload_dir().join(&file_name), &file_name).await
}

/// Stream a file with a standard attachment disposition.
pub async fn stream_file(path: &Path, filename: &str) -> Result<Response, ApiFailure> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(not_found("未找到该文件"));
        }
        Err(err) => {
            let err = anyhow::Error::new(err)
                .context(format!("failed to read download file {}", path.display()));
            return Err(internal_error(err, "文件读取失败"));
        }
    };

    let mut headers = HeaderMap::new();
    let content_type = HeaderValue::from_str(content_type_for(filename).as_ref())
        .unwrap_or(HeaderValue::from_static("application/octet-stream"));
    headers.insert(header::CONTENT_TYPE, content_type);

    let disposition = format!(
        "attachment; filename*=UTF-8''{}",
        utf8_percent_encode(filename, NON_ALPHANUMERIC)
    );
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|err| internal_error(err.into(), "下载头信息无效"))?;
    headers.insert(header::CONTENT_DISPOSITION, disposition);

    Ok((headers, bytes).into_response())
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && name != "." && name != ".."
}

fn content_type_for(filename: &str) -> Mime {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let essence = match extension.as_str() {
        "pdf" => return mime::APPLICATION_PDF,
        "txt" => return mime::TEXT_PLAIN_UTF_8,
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => return mime::APPLICATION_OCTET_STREAM,
    };

    essence.parse().unwrap_or(mime::APPLICATION_OCTET_STREAM)
}
