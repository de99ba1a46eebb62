//! Приём multipart-форм и хранение файлов документов
//!
//! Файлы лежат в `{upload.dir}/documents/`, в БД хранится путь относительно
//! `upload.dir`. Объединённые ФОС пишутся в `{upload.dir}/documents-merged/`.

use actix_multipart::Multipart;
use actix_web::HttpResponse;
use actix_web::http::header::{
    Charset, ContentDisposition, DispositionParam, DispositionType, ExtendedValue,
};
use futures_util::{StreamExt, TryStreamExt};
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

use crate::errors::{FosAdminError, Result};
use crate::models::ErrorCode;
use crate::models::documents::StoredFile;
use crate::utils::{content_type_for_extension, safe_file_stem, validate_magic_bytes};

pub const DOCUMENTS_DIR: &str = "documents";
pub const MERGED_DIR: &str = "documents-merged";

/// Предел для текстовых полей формы
const MAX_TEXT_FIELD: usize = 4096;

/// Файл из формы, целиком в памяти
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_name: String,
    /// Расширение с точкой в нижнем регистре
    pub extension: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub file: Option<UploadedFile>,
}

impl MultipartForm {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug)]
pub enum UploadError {
    MultipleFiles,
    TooLarge(usize),
    TypeNotAllowed(String),
    ContentMismatch,
    Read(String),
}

impl UploadError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::MultipleFiles => ErrorCode::MultifileUploadNotAllowed,
            Self::TooLarge(_) => ErrorCode::FileSizeExceeded,
            Self::TypeNotAllowed(_) | Self::ContentMismatch => ErrorCode::FileTypeNotAllowed,
            Self::Read(_) => ErrorCode::FileUploadFailed,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::MultipleFiles => "Можно загрузить только один файл".to_string(),
            Self::TooLarge(limit) => {
                format!("Размер файла превышает {} МБ", limit / (1024 * 1024))
            }
            Self::TypeNotAllowed(ext) if ext.is_empty() => "Файл без расширения".to_string(),
            Self::TypeNotAllowed(ext) => format!("Тип файла {ext} не разрешён"),
            Self::ContentMismatch => "Содержимое файла не соответствует расширению".to_string(),
            Self::Read(msg) => format!("Ошибка чтения формы: {msg}"),
        }
    }

    pub fn into_response(self) -> HttpResponse {
        super::bad_request(self.error_code(), self.message())
    }
}

/// Расширение имени файла с точкой, в нижнем регистре
pub fn file_extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default()
}

pub fn check_file_type(name: &str, allowed_types: &[String]) -> std::result::Result<String, UploadError> {
    let extension = file_extension(name);
    if extension.is_empty() || !allowed_types.iter().any(|t| t.to_lowercase() == extension) {
        return Err(UploadError::TypeNotAllowed(extension));
    }
    Ok(extension)
}

/// Прочитать форму: текстовые поля и не более одного поля `file`
pub async fn read_multipart(
    mut payload: Multipart,
    max_size: usize,
    allowed_types: &[String],
) -> std::result::Result<MultipartForm, UploadError> {
    let mut form = MultipartForm::default();

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| UploadError::Read(e.to_string()))?
    {
        let content_disposition = field.content_disposition().cloned();
        let name = content_disposition
            .as_ref()
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();
        let file_name = content_disposition
            .as_ref()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        if name == "file" {
            if form.file.is_some() {
                return Err(UploadError::MultipleFiles);
            }
            let original_name = file_name.unwrap_or_default();
            // пустое поле file при редактировании: файл не меняется
            if original_name.is_empty() {
                while field.next().await.is_some() {}
                continue;
            }
            let extension = check_file_type(&original_name, allowed_types)?;

            let mut data = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(|e| UploadError::Read(e.to_string()))?;
                if data.len() + chunk.len() > max_size {
                    return Err(UploadError::TooLarge(max_size));
                }
                data.extend_from_slice(&chunk);
            }

            if data.is_empty() {
                continue;
            }
            if !validate_magic_bytes(&data, &extension) {
                return Err(UploadError::ContentMismatch);
            }

            form.file = Some(UploadedFile {
                original_name,
                extension,
                data,
            });
        } else {
            let mut value = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(|e| UploadError::Read(e.to_string()))?;
                if value.len() + chunk.len() > MAX_TEXT_FIELD {
                    return Err(UploadError::Read(format!("поле {name} слишком длинное")));
                }
                value.extend_from_slice(&chunk);
            }
            let value = String::from_utf8(value)
                .map_err(|_| UploadError::Read(format!("поле {name} не в UTF-8")))?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

/// Абсолютный путь файла по пути из БД; выход за пределы `root` запрещён
pub fn resolve_stored_path(root: &Path, relative: &str) -> Result<PathBuf> {
    let relative = Path::new(relative);
    let safe = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if relative.as_os_str().is_empty() || !safe {
        return Err(FosAdminError::file_operation(format!(
            "Недопустимый путь файла: {}",
            relative.display()
        )));
    }
    Ok(root.join(relative))
}

fn write_into(root: &Path, dir: &str, file_name: &str, data: &[u8]) -> Result<String> {
    let target_dir = root.join(dir);
    fs::create_dir_all(&target_dir)?;
    fs::write(target_dir.join(file_name), data)?;
    Ok(format!("{dir}/{file_name}"))
}

/// Сохранить загруженный документ под уникальным именем
pub fn save_document_file(root: &Path, file: &UploadedFile) -> Result<StoredFile> {
    let stored_name = format!(
        "{}-{}{}",
        chrono::Utc::now().timestamp(),
        Uuid::new_v4(),
        file.extension
    );
    let path = write_into(root, DOCUMENTS_DIR, &stored_name, &file.data)?;

    Ok(StoredFile {
        path,
        original_name: file.original_name.clone(),
        file_size: file.data.len() as i64,
        content_type: content_type_for_extension(&file.extension).to_string(),
    })
}

/// Сохранить объединённый документ ФОС (перезаписывает прошлую сборку)
pub fn save_merged_file(root: &Path, file_name: &str, data: &[u8]) -> Result<String> {
    write_into(root, MERGED_DIR, file_name, data)
}

pub fn read_stored_file(root: &Path, relative: &str) -> Result<Vec<u8>> {
    let path = resolve_stored_path(root, relative)?;
    fs::read(&path).map_err(|e| {
        FosAdminError::file_operation(format!("Не удалось прочитать {}: {e}", path.display()))
    })
}

/// Удалить файлы после удаления записей; ошибки только в лог
pub fn remove_stored_files(root: &Path, paths: &[String]) {
    for relative in paths {
        match resolve_stored_path(root, relative) {
            Ok(path) => match fs::remove_file(&path) {
                Ok(()) => tracing::debug!("Removed file {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!("Failed to remove file {}: {}", path.display(), e),
            },
            Err(e) => tracing::warn!("Skipped file removal: {}", e),
        }
    }
}

/// `attachment` с латинским именем и исходным именем в UTF-8
pub fn attachment(file_name: &str) -> ContentDisposition {
    ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![
            DispositionParam::Filename(safe_file_stem(file_name)),
            DispositionParam::FilenameExt(ExtendedValue {
                charset: Charset::Ext(String::from("UTF-8")),
                language_tag: None,
                value: file_name.as_bytes().to_vec(),
            }),
        ],
    }
}

/// Файл в ответ на скачивание
pub fn file_response(data: Vec<u8>, content_type: &str, file_name: &str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(content_type.to_string())
        .insert_header(attachment(file_name))
        .body(data)
}

pub fn upload_root() -> PathBuf {
    PathBuf::from(&crate::config::AppConfig::get().upload.dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root() -> PathBuf {
        let root = std::env::temp_dir().join(format!("fos-admin-upload-{}", Uuid::new_v4()));
        fs::create_dir_all(&root).unwrap();
        root
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("Билеты.DOCX"), ".docx");
        assert_eq!(file_extension("archive.tar.gz"), ".gz");
        assert_eq!(file_extension("README"), "");
    }

    #[test]
    fn test_check_file_type() {
        let allowed = vec![".docx".to_string(), ".PDF".to_string()];
        assert_eq!(check_file_type("a.docx", &allowed).unwrap(), ".docx");
        assert_eq!(check_file_type("a.pdf", &allowed).unwrap(), ".pdf");
        assert!(matches!(
            check_file_type("a.exe", &allowed),
            Err(UploadError::TypeNotAllowed(ext)) if ext == ".exe"
        ));
        assert!(check_file_type("noext", &allowed).is_err());
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let root = Path::new("/srv/media");
        assert_eq!(
            resolve_stored_path(root, "documents/a.docx").unwrap(),
            PathBuf::from("/srv/media/documents/a.docx")
        );
        assert!(resolve_stored_path(root, "../etc/passwd").is_err());
        assert!(resolve_stored_path(root, "/etc/passwd").is_err());
        assert!(resolve_stored_path(root, "").is_err());
    }

    #[test]
    fn test_save_read_and_remove() {
        let root = temp_root();
        let file = UploadedFile {
            original_name: "Вопросы.docx".to_string(),
            extension: ".docx".to_string(),
            data: b"PK\x03\x04content".to_vec(),
        };

        let stored = save_document_file(&root, &file).unwrap();
        assert!(stored.path.starts_with("documents/"));
        assert!(stored.path.ends_with(".docx"));
        assert_eq!(stored.original_name, "Вопросы.docx");
        assert_eq!(stored.file_size, 12);
        assert_eq!(
            stored.content_type,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );

        assert_eq!(read_stored_file(&root, &stored.path).unwrap(), file.data);

        remove_stored_files(&root, &[stored.path.clone(), "documents/missing.docx".into()]);
        assert!(read_stored_file(&root, &stored.path).is_err());

        let merged = save_merged_file(&root, "fizika_fos_3.docx", b"data").unwrap();
        assert_eq!(merged, "documents-merged/fizika_fos_3.docx");

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_attachment_keeps_utf8_name() {
        let header = attachment("Билеты.docx").to_string();
        assert!(header.starts_with("attachment"));
        assert!(header.contains("filename=\"Bilety.docx\""));
        assert!(header.contains("filename*=UTF-8''"));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(UploadError::TooLarge(1).error_code(), ErrorCode::FileSizeExceeded);
        assert_eq!(
            UploadError::ContentMismatch.error_code(),
            ErrorCode::FileTypeNotAllowed
        );
        assert!(UploadError::TooLarge(50 * 1024 * 1024).message().contains("50"));
    }
}
