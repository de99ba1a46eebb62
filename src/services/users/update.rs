use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    users::{entities::UserRole, requests::UpdateUserRequest, responses::UserResponse},
};
use crate::services::{bad_request, internal_error, not_found};
use crate::utils::validate::{validate_email, validate_password_simple};

pub async fn update_user(
    service: &UserService,
    user_id: i64,
    mut update_data: UpdateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    // администратор не может сам лишить себя прав
    if RequireJWT::extract_user_id(request) == Some(user_id)
        && (update_data
            .role
            .as_ref()
            .is_some_and(|r| *r != UserRole::Admin)
            || update_data.status.is_some())
    {
        return Ok(bad_request(
            ErrorCode::UserUpdateFailed,
            "Нельзя изменить роль или статус собственной учётной записи",
        ));
    }

    if let Some(ref email) = update_data.email
        && let Err(msg) = validate_email(email.trim())
    {
        return Ok(bad_request(ErrorCode::UserEmailInvalid, msg));
    }

    if let Some(password) = update_data.password.take() {
        if let Err(msg) = validate_password_simple(&password) {
            return Ok(bad_request(ErrorCode::UserPasswordInvalid, msg));
        }
        match crate::utils::password::hash_password(&password) {
            Ok(hash) => update_data.password = Some(hash),
            Err(e) => {
                return Ok(internal_error(
                    ErrorCode::InternalServerError,
                    format!("Не удалось захэшировать пароль: {e}"),
                ));
            }
        }
    }

    match storage.update_user(user_id, update_data).await {
        Ok(Some(user)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            UserResponse { user },
            "Пользователь изменён",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::UserNotFound, "Пользователь не найден")),
        Err(e) if e.is_unique_violation() => Ok(HttpResponse::Conflict().json(
            ApiResponse::error_empty(ErrorCode::UserAlreadyExists, "Этот email уже используется"),
        )),
        Err(e) => Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::UserUpdateFailed,
            format!("Не удалось изменить пользователя: {e}"),
        ))),
    }
}
