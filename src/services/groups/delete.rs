use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GroupService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{internal_error, not_found};

pub async fn delete_group(
    service: &GroupService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.delete_group(id).await {
        Ok(true) => {
            tracing::info!("Group {} deleted", id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Группа удалена")))
        }
        Ok(false) => Ok(not_found(ErrorCode::GroupNotFound, "Группа не найдена")),
        Err(e) => Ok(internal_error(
            ErrorCode::InternalServerError,
            format!("Не удалось удалить группу: {e}"),
        )),
    }
}
