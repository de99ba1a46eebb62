use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::DisciplineService;
use crate::models::disciplines::{DisciplineListParams, DisciplineListQuery};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::default_filter::apply_default_filter;
use crate::services::{current_user, internal_error};

pub async fn list_disciplines(
    service: &DisciplineService,
    mut query: DisciplineListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let referer = request
        .headers()
        .get(header::REFERER)
        .and_then(|h| h.to_str().ok());
    let applied = apply_default_filter(&mut query, &user, referer);

    let storage = service.get_storage(request)?;
    match storage
        .list_disciplines_with_pagination(DisciplineListQuery::from(query))
        .await
    {
        Ok(mut response) => {
            response.default_filter_applied = applied;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                response,
                "Список дисциплин получен",
            )))
        }
        Err(e) => Ok(internal_error(
            ErrorCode::InternalServerError,
            format!("Ошибка получения списка дисциплин: {e}"),
        )),
    }
}
