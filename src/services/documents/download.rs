use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::DocumentService;
use crate::models::ErrorCode;
use crate::services::permissions::has_view_permission;
use crate::services::upload::{file_response, read_stored_file, upload_root};
use crate::services::{current_user, forbidden, internal_error, not_found};

pub async fn download_document(
    service: &DocumentService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    if !has_view_permission(&user) {
        return Ok(forbidden(ErrorCode::DocumentPermissionDenied, "Нет доступа"));
    }

    let storage = service.get_storage(request)?;
    let document = match storage.get_document_by_id(id).await {
        Ok(Some(document)) => document,
        Ok(None) => return Ok(not_found(ErrorCode::DocumentNotFound, "Документ не найден")),
        Err(e) => {
            return Ok(internal_error(
                ErrorCode::InternalServerError,
                format!("Ошибка получения документа: {e}"),
            ));
        }
    };

    let Some(path) = document.path.as_deref().filter(|_| document.has_file()) else {
        return Ok(not_found(ErrorCode::FileNotFound, "У документа нет файла"));
    };

    match read_stored_file(&upload_root(), path) {
        Ok(data) => Ok(file_response(
            data,
            document
                .content_type
                .as_deref()
                .unwrap_or("application/octet-stream"),
            &document.download_name(),
        )),
        Err(e) => {
            tracing::error!("Document {} file is unavailable: {}", id, e);
            Ok(not_found(ErrorCode::FileNotFound, "Файл документа не найден"))
        }
    }
}
