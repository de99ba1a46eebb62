use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{DocumentService, load_document_with_fos};
use crate::config::AppConfig;
use crate::models::documents::UpdateDocument;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::permissions::{OwnedDocument, has_change_permission};
use crate::services::upload::{
    read_multipart, remove_stored_files, save_document_file, upload_root,
};
use crate::services::{bad_request, current_user, forbidden, internal_error, not_found};
use crate::utils::validate::validate_name;

/// Форма: необязательные `name` и `file`
pub async fn update_document(
    service: &DocumentService,
    id: i64,
    request: &HttpRequest,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let config = AppConfig::get();
    let storage = service.get_storage(request)?;

    let (document, fos) = match load_document_with_fos(&storage, id).await {
        Ok(loaded) => loaded,
        Err(response) => return Ok(response),
    };
    let owned = OwnedDocument {
        document: &document,
        fos: &fos,
    };
    if !has_change_permission(&user, &owned) {
        return Ok(forbidden(
            ErrorCode::DocumentPermissionDenied,
            "Нет прав на изменение документа",
        ));
    }

    let form = match read_multipart(payload, config.upload.max_size, &config.upload.allowed_types)
        .await
    {
        Ok(form) => form,
        Err(e) => return Ok(e.into_response()),
    };

    let name = match form.text("name").map(validate_name).transpose() {
        Ok(name) => name,
        Err(msg) => return Ok(bad_request(ErrorCode::BadRequest, msg)),
    };

    let root = upload_root();
    let stored = match form.file.as_ref().map(|f| save_document_file(&root, f)).transpose() {
        Ok(stored) => stored,
        Err(e) => {
            return Ok(internal_error(
                ErrorCode::FileUploadFailed,
                format!("Не удалось сохранить файл: {e}"),
            ));
        }
    };
    let new_path = stored.as_ref().map(|s| s.path.clone());

    match storage
        .update_document(id, UpdateDocument { name, file: stored })
        .await
    {
        Ok(Some(updated)) => {
            // старый файл больше не нужен
            if new_path.is_some()
                && let Some(old_path) = document.path.filter(|p| !p.is_empty())
            {
                remove_stored_files(&root, &[old_path]);
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(updated, "Документ изменён")))
        }
        Ok(None) => {
            remove_stored_files(&root, &new_path.into_iter().collect::<Vec<_>>());
            Ok(not_found(ErrorCode::DocumentNotFound, "Документ не найден"))
        }
        Err(e) => {
            remove_stored_files(&root, &new_path.into_iter().collect::<Vec<_>>());
            Ok(internal_error(
                ErrorCode::InternalServerError,
                format!("Не удалось изменить документ: {e}"),
            ))
        }
    }
}
