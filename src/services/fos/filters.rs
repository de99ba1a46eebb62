use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::FosService;
use crate::models::dictionaries::DictionaryKind;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::disciplines::filters::build_filter_options;
use crate::services::{current_user, internal_error};

pub async fn filter_options(
    service: &FosService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    match build_filter_options(&storage, &user, DictionaryKind::FosTypes).await {
        Ok(options) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            options,
            "Варианты фильтров получены",
        ))),
        Err(e) => Ok(internal_error(
            ErrorCode::InternalServerError,
            format!("Ошибка получения вариантов фильтров: {e}"),
        )),
    }
}
