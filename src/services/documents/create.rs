use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::DocumentService;
use crate::config::AppConfig;
use crate::models::documents::CreateDocument;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::permissions::has_add_permission;
use crate::services::upload::{
    read_multipart, remove_stored_files, save_document_file, upload_root,
};
use crate::services::{bad_request, current_user, forbidden, internal_error, not_found};
use crate::utils::validate::validate_name;

/// Форма: `name`, `fos_id`, `file`
pub async fn create_document(
    service: &DocumentService,
    request: &HttpRequest,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let config = AppConfig::get();

    let form = match read_multipart(payload, config.upload.max_size, &config.upload.allowed_types)
        .await
    {
        Ok(form) => form,
        Err(e) => return Ok(e.into_response()),
    };

    let name = match validate_name(form.text("name").unwrap_or_default()) {
        Ok(name) => name,
        Err(msg) => return Ok(bad_request(ErrorCode::BadRequest, msg)),
    };
    let Some(fos_id) = form.text("fos_id").and_then(|v| v.parse::<i64>().ok()) else {
        return Ok(bad_request(ErrorCode::BadRequest, "Не указан ФОС"));
    };
    let Some(file) = form.file else {
        return Ok(bad_request(ErrorCode::FileNotFound, "Файл не загружен"));
    };

    let storage = service.get_storage(request)?;
    let fos = match storage.get_fos_by_id(fos_id).await {
        Ok(Some(fos)) => fos,
        Ok(None) => return Ok(not_found(ErrorCode::FosNotFound, "ФОС не найден")),
        Err(e) => {
            return Ok(internal_error(
                ErrorCode::InternalServerError,
                format!("Ошибка получения ФОС: {e}"),
            ));
        }
    };

    if !has_add_permission(&user, &fos) {
        return Ok(forbidden(
            ErrorCode::DocumentPermissionDenied,
            "Нет прав на добавление документов в этот ФОС",
        ));
    }

    let root = upload_root();
    let stored = match save_document_file(&root, &file) {
        Ok(stored) => stored,
        Err(e) => {
            return Ok(internal_error(
                ErrorCode::FileUploadFailed,
                format!("Не удалось сохранить файл: {e}"),
            ));
        }
    };
    let stored_path = stored.path.clone();

    match storage
        .create_document(CreateDocument {
            name,
            fos_id,
            file: stored,
        })
        .await
    {
        Ok(document) => {
            tracing::info!(
                "Document {} added to fos {} by user {}",
                document.id,
                fos_id,
                user.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(document, "Документ добавлен")))
        }
        Err(e) => {
            remove_stored_files(&root, &[stored_path]);
            Ok(internal_error(
                ErrorCode::FileUploadFailed,
                format!("Не удалось сохранить документ: {e}"),
            ))
        }
    }
}
