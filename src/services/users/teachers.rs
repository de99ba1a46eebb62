use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::models::{ApiResponse, ErrorCode, users::responses::TeacherListResponse};
use crate::services::internal_error;

/// Активные преподаватели: доступно всем, кто вошёл в систему
pub async fn list_teachers(
    service: &UserService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.list_teachers().await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            TeacherListResponse { items },
            "Список преподавателей получен",
        ))),
        Err(e) => Ok(internal_error(
            ErrorCode::InternalServerError,
            format!("Ошибка получения списка преподавателей: {e}"),
        )),
    }
}
