use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::{
    middlewares::RequireJWT,
    models::{ApiResponse, ErrorCode},
    services::{bad_request, internal_error, not_found},
};

pub async fn delete_user(
    service: &UserService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    if RequireJWT::extract_user_id(request) == Some(user_id) {
        return Ok(bad_request(
            ErrorCode::CanNotDeleteCurrentUser,
            "Нельзя удалить собственную учётную запись",
        ));
    }

    match storage.delete_user(user_id).await {
        Ok(true) => {
            tracing::info!("User {} deleted", user_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Пользователь удалён")))
        }
        Ok(false) => Ok(not_found(ErrorCode::UserNotFound, "Пользователь не найден")),
        Err(e) => Ok(internal_error(
            ErrorCode::UserDeleteFailed,
            format!("Не удалось удалить пользователя: {e}"),
        )),
    }
}
