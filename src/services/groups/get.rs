use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GroupService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{internal_error, not_found};

pub async fn get_group(
    service: &GroupService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.get_group_by_id(id).await {
        Ok(Some(group)) => Ok(HttpResponse::Ok().json(ApiResponse::success(group, "Группа получена"))),
        Ok(None) => Ok(not_found(ErrorCode::GroupNotFound, "Группа не найдена")),
        Err(e) => Ok(internal_error(
            ErrorCode::InternalServerError,
            format!("Ошибка получения группы: {e}"),
        )),
    }
}
