//! Ошибки разбора query и JSON в формате `ApiResponse`

use actix_web::{
    HttpRequest, HttpResponse,
    error::{InternalError, JsonPayloadError, QueryPayloadError},
};
use tracing::debug;

use crate::models::{ApiResponse, ErrorCode};

pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("Query parse error on {}: {}", req.path(), err);
    let message = format!("Некорректные параметры запроса: {err}");
    InternalError::from_response(
        err,
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, message)),
    )
    .into()
}

pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("JSON parse error on {}: {}", req.path(), err);
    let (status, message) = match &err {
        JsonPayloadError::ContentType => (
            actix_web::http::StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Ожидается Content-Type: application/json".to_string(),
        ),
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => (
            actix_web::http::StatusCode::PAYLOAD_TOO_LARGE,
            "Слишком большой запрос".to_string(),
        ),
        _ => (
            actix_web::http::StatusCode::BAD_REQUEST,
            format!("Некорректное тело запроса: {err}"),
        ),
    };
    InternalError::from_response(
        err,
        HttpResponse::build(status).json(ApiResponse::error_empty(ErrorCode::BadRequest, message)),
    )
    .into()
}
