use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{FosService, load_fos};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::permissions::has_delete_permission;
use crate::services::upload::{remove_stored_files, upload_root};
use crate::services::{current_user, forbidden, internal_error, not_found};
use crate::utils::plural::count_with_noun;

pub async fn delete_fos(
    service: &FosService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    let fos = match load_fos(&storage, id).await {
        Ok(fos) => fos,
        Err(response) => return Ok(response),
    };
    if !has_delete_permission(&user, &fos) {
        return Ok(forbidden(
            ErrorCode::FosPermissionDenied,
            "Нет прав на удаление ФОС",
        ));
    }

    match storage.delete_fos(id).await {
        Ok(Some(paths)) => {
            remove_stored_files(&upload_root(), &paths);
            tracing::info!("Fos {} deleted by user {}", id, user.id);
            let message = if fos.document_count > 0 {
                format!(
                    "ФОС удалён вместе с {}",
                    count_with_noun(fos.document_count, ["документом", "документами", "документами"])
                )
            } else {
                "ФОС удалён".to_string()
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(message)))
        }
        Ok(None) => Ok(not_found(ErrorCode::FosNotFound, "ФОС не найден")),
        Err(e) => Ok(internal_error(
            ErrorCode::InternalServerError,
            format!("Не удалось удалить ФОС: {e}"),
        )),
    }
}
