use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use axum::{body::Bytes, extract::Multipart};
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::debug;

/// Result type used by the shared upload helpers.
pub type UploadResult<T> = Result<T, UploadError>;

/// Error returned when validating or persisting uploaded files.
#[derive(Debug)]
pub struct UploadError {
    message: String,
}

impl UploadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for UploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for UploadError {}

/// Expectations for a single multipart file field.
#[derive(Debug, Clone, Copy)]
pub struct FileFieldConfig<'a> {
    pub field_name: &'a str,
    /// Lowercase extensions without the dot; empty accepts any file.
    pub allowed_extensions: &'a [String],
    pub max_files: usize,
}

impl<'a> FileFieldConfig<'a> {
    pub fn new(field_name: &'a str, allowed_extensions: &'a [String], max_files: usize) -> Self {
        Self {
            field_name,
            allowed_extensions,
            max_files,
        }
    }

    fn accepts(&self, extension: &str) -> bool {
        self.allowed_extensions.is_empty()
            || self
                .allowed_extensions
                .iter()
                .any(|allowed| allowed == extension)
    }
}

/// A file read from the form but not yet written anywhere.
#[derive(Debug, Clone)]
pub struct PendingFile {
    pub field_name: String,
    pub original_name: String,
    pub stored_name: String,
    pub bytes: Bytes,
}

impl PendingFile {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Metadata describing a stored upload on disk.
#[derive(Debug, Clone)]
pub struct SavedFile {
    pub original_name: String,
    pub stored_name: String,
    pub stored_path: PathBuf,
    pub file_size: u64,
}

/// Fully buffered multipart form.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub files: Vec<PendingFile>,
    pub text_fields: HashMap<String, Vec<String>>,
}

impl UploadForm {
    pub fn first_file_for(&self, field_name: &str) -> Option<&PendingFile> {
        self.files
            .iter()
            .find(|file| file.field_name == field_name)
    }

    pub fn first_text(&self, field_name: &str) -> Option<&str> {
        self.text_fields
            .get(field_name)
            .and_then(|values| values.first().map(|s| s.as_str()))
    }
}

/// Buffers every field of the form so callers can validate before touching disk.
pub async fn read_upload_form(
    mut multipart: Multipart,
    field_configs: &[FileFieldConfig<'_>],
) -> UploadResult<UploadForm> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| UploadError::new(format!("解析上传表单失败: {err}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        let Some(file_name) = field.file_name().map(str::to_string) else {
            let value = field
                .text()
                .await
                .map_err(|err| UploadError::new(format!("读取字段 `{field_name}` 失败: {err}")))?;
            form.text_fields.entry(field_name).or_default().push(value);
            continue;
        };

        let Some(config) = field_configs
            .iter()
            .find(|config| config.field_name == field_name)
        else {
            debug!(field = %field_name, file = %file_name, "ignoring unexpected file field");
            continue;
        };

        let count = counts.entry(config.field_name).or_default();
        if *count >= config.max_files {
            return Err(UploadError::new(format!(
                "字段 `{}` 上传文件数量超过限制 (最多 {})",
                config.field_name, config.max_files
            )));
        }

        let extension = extension_of(&file_name);
        if !config.accepts(&extension) {
            return Err(UploadError::new(format!(
                "字段 `{}` 不支持 `{extension}` 文件类型",
                config.field_name
            )));
        }

        let stored_name = storage_name(&file_name, *count);
        let bytes = field
            .bytes()
            .await
            .map_err(|err| UploadError::new(format!("读取上传数据失败: {err}")))?;

        form.files.push(PendingFile {
            field_name: config.field_name.to_string(),
            original_name: file_name,
            stored_name,
            bytes,
        });
        *count += 1;
    }

    Ok(form)
}

/// Writes the file under its stored name, replacing any file already there.
pub async fn persist_file(file: &PendingFile, dest_dir: &Path) -> UploadResult<SavedFile> {
    tokio::fs::create_dir_all(dest_dir)
        .await
        .map_err(|err| UploadError::new(format!("无法创建上传目录: {err}")))?;

    let stored_path = dest_dir.join(&file.stored_name);
    let mut handle = File::create(&stored_path)
        .await
        .map_err(|err| UploadError::new(format!("保存文件失败: {err}")))?;
    handle
        .write_all(&file.bytes)
        .await
        .map_err(|err| UploadError::new(format!("写入文件失败: {err}")))?;
    handle
        .flush()
        .await
        .map_err(|err| UploadError::new(format!("刷新文件失败: {err}")))?;

    Ok(SavedFile {
        original_name: file.original_name.clone(),
        stored_name: file.stored_name.clone(),
        stored_path,
        file_size: file.size(),
    })
}

/// The client's filename with anything unsafe for a single path segment removed.
fn storage_name(original: &str, index: usize) -> String {
    let sanitized = sanitize_filename::sanitize(original);
    if !sanitized.is_empty() && sanitized != "." && sanitized != ".." {
        return sanitized;
    }

    let extension = extension_of(original);
    if extension.is_empty() {
        format!("file_{index}")
    } else {
        format!("file_{index}.{extension}")
    }
}

fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default()
}
