use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{DisciplineService, load_discipline};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::permissions::has_delete_permission;
use crate::services::upload::{remove_stored_files, upload_root};
use crate::services::{current_user, forbidden, internal_error, not_found};
use crate::utils::plural::count_with_noun;

/// Удаляет дисциплину вместе с её ФОС и файлами документов
pub async fn delete_discipline(
    service: &DisciplineService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    let discipline = match load_discipline(&storage, id).await {
        Ok(discipline) => discipline,
        Err(response) => return Ok(response),
    };
    if !has_delete_permission(&user, &discipline) {
        return Ok(forbidden(
            ErrorCode::DisciplinePermissionDenied,
            "Нет прав на удаление дисциплины",
        ));
    }

    match storage.delete_discipline(id).await {
        Ok(Some(paths)) => {
            remove_stored_files(&upload_root(), &paths);
            tracing::info!(
                "Discipline {} deleted by user {} ({} files removed)",
                id,
                user.id,
                paths.len()
            );
            let message = if paths.is_empty() {
                "Дисциплина удалена".to_string()
            } else {
                format!(
                    "Дисциплина удалена, удалено {}",
                    count_with_noun(paths.len() as i64, ["файл", "файла", "файлов"])
                )
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(message)))
        }
        Ok(None) => Ok(not_found(
            ErrorCode::DisciplineNotFound,
            "Дисциплина не найдена",
        )),
        Err(e) => Ok(internal_error(
            ErrorCode::InternalServerError,
            format!("Не удалось удалить дисциплину: {e}"),
        )),
    }
}
