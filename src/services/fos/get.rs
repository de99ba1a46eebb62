use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{FosService, load_fos};
use crate::models::ApiResponse;
use crate::services::current_user;

/// Карточка ФОС вместе с документами
pub async fn get_fos(
    service: &FosService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(response) = current_user(request) {
        return Ok(response);
    }
    let storage = service.get_storage(request)?;

    match load_fos(&storage, id).await {
        Ok(fos) => Ok(HttpResponse::Ok().json(ApiResponse::success(fos, "ФОС получен"))),
        Err(response) => Ok(response),
    }
}
