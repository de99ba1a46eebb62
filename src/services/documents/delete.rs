use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{DocumentService, load_document_with_fos};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::permissions::{OwnedDocument, has_delete_permission};
use crate::services::upload::{remove_stored_files, upload_root};
use crate::services::{current_user, forbidden, internal_error, not_found};

pub async fn delete_document(
    service: &DocumentService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    let (document, fos) = match load_document_with_fos(&storage, id).await {
        Ok(loaded) => loaded,
        Err(response) => return Ok(response),
    };
    if !has_delete_permission(
        &user,
        &OwnedDocument {
            document: &document,
            fos: &fos,
        },
    ) {
        return Ok(forbidden(
            ErrorCode::DocumentPermissionDenied,
            "Нет прав на удаление документа",
        ));
    }

    match storage.delete_document(id).await {
        Ok(Some(deleted)) => {
            if let Some(path) = deleted.path.filter(|p| !p.is_empty()) {
                remove_stored_files(&upload_root(), &[path]);
            }
            tracing::info!("Document {} deleted by user {}", id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Документ удалён")))
        }
        Ok(None) => Ok(not_found(ErrorCode::DocumentNotFound, "Документ не найден")),
        Err(e) => Ok(internal_error(
            ErrorCode::InternalServerError,
            format!("Не удалось удалить документ: {e}"),
        )),
    }
}
