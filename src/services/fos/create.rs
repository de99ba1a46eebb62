use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{FosService, check_fos_type, check_year, load_parent_discipline, normalize_description};
use crate::models::fos::CreateFosRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::permissions::has_add_permission;
use crate::services::{bad_request, current_user, forbidden, internal_error};
use crate::utils::validate::validate_name;

pub async fn create_fos(
    service: &FosService,
    mut body: CreateFosRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };

    body.name = match validate_name(&body.name) {
        Ok(name) => name,
        Err(msg) => return Ok(bad_request(ErrorCode::FosInvalid, msg)),
    };
    body.description = normalize_description(body.description);
    body.year = match check_year(body.year) {
        Ok(year) => year,
        Err(response) => return Ok(response),
    };

    let storage = service.get_storage(request)?;
    let discipline = match load_parent_discipline(&storage, body.discipline_id).await {
        Ok(discipline) => discipline,
        Err(response) => return Ok(response),
    };
    if !has_add_permission(&user, &discipline) {
        return Ok(forbidden(
            ErrorCode::FosPermissionDenied,
            "Нет прав на добавление ФОС к этой дисциплине",
        ));
    }
    if let Err(response) = check_fos_type(&storage, body.type_id).await {
        return Ok(response);
    }

    match storage.create_fos(body).await {
        Ok(fos) => {
            tracing::info!(
                "Fos {} created for discipline {} by user {}",
                fos.id,
                discipline.id,
                user.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(fos, "ФОС добавлен")))
        }
        Err(e) => Ok(internal_error(
            ErrorCode::InternalServerError,
            format!("Не удалось добавить ФОС: {e}"),
        )),
    }
}
