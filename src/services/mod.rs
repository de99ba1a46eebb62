pub mod auth;
pub mod default_filter;
pub mod dictionaries;
pub mod disciplines;
pub mod documents;
pub mod fos;
pub mod groups;
pub mod messages;
pub mod permissions;
pub mod reports;
pub(crate) mod upload;
pub mod users;

pub use auth::AuthService;
pub use dictionaries::DictionaryService;
pub use disciplines::DisciplineService;
pub use documents::DocumentService;
pub use fos::FosService;
pub use groups::GroupService;
pub use messages::MessageService;
pub use reports::ReportService;
pub use users::UserService;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::middlewares::RequireJWT;
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

/// Хранилище из app data
pub(crate) fn storage_from_request(request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
    request
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| {
            tracing::error!("Storage is not registered in app data");
            actix_web::error::ErrorInternalServerError("Хранилище недоступно")
        })
}

pub(crate) fn cache_from_request(request: &HttpRequest) -> ActixResult<Arc<dyn ObjectCache>> {
    request
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| {
            tracing::error!("Object cache is not registered in app data");
            actix_web::error::ErrorInternalServerError("Кэш недоступен")
        })
}

/// Текущий пользователь или готовый ответ 401
pub(crate) fn current_user(request: &HttpRequest) -> Result<User, HttpResponse> {
    RequireJWT::extract_user_claims(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Требуется вход в систему",
        ))
    })
}

pub(crate) fn internal_error(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    let message = message.into();
    tracing::error!("{}", message);
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(code, message))
}

pub(crate) fn forbidden(code: ErrorCode, message: &str) -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error_empty(code, message))
}

pub(crate) fn bad_request(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(code, message))
}

pub(crate) fn not_found(code: ErrorCode, message: &str) -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(code, message))
}
