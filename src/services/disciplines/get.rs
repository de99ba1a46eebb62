use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{DisciplineService, load_discipline};
use crate::models::ApiResponse;
use crate::services::current_user;

pub async fn get_discipline(
    service: &DisciplineService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(response) = current_user(request) {
        return Ok(response);
    }
    let storage = service.get_storage(request)?;

    match load_discipline(&storage, id).await {
        Ok(discipline) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            discipline,
            "Дисциплина получена",
        ))),
        Err(response) => Ok(response),
    }
}
