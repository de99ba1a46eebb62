use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{
    FosService, check_fos_type, check_year, load_fos, load_parent_discipline,
    normalize_description,
};
use crate::models::fos::UpdateFosRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::permissions::{has_add_permission, has_change_permission};
use crate::services::{bad_request, current_user, forbidden, internal_error, not_found};
use crate::utils::validate::validate_name;

pub async fn update_fos(
    service: &FosService,
    id: i64,
    mut body: UpdateFosRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    let fos = match load_fos(&storage, id).await {
        Ok(fos) => fos,
        Err(response) => return Ok(response),
    };
    if !has_change_permission(&user, &fos) {
        return Ok(forbidden(
            ErrorCode::FosPermissionDenied,
            "Нет прав на изменение ФОС",
        ));
    }

    if let Some(name) = body.name.as_deref() {
        match validate_name(name) {
            Ok(name) => body.name = Some(name),
            Err(msg) => return Ok(bad_request(ErrorCode::FosInvalid, msg)),
        }
    }
    body.description = body.description.map(normalize_description);
    if let Some(year) = body.year.take() {
        match check_year(year) {
            Ok(year) => body.year = Some(year),
            Err(response) => return Ok(response),
        }
    }

    // перенос в другую дисциплину требует прав и на неё
    if let Some(discipline_id) = body.discipline_id.filter(|&d| d != fos.discipline.id) {
        let discipline = match load_parent_discipline(&storage, discipline_id).await {
            Ok(discipline) => discipline,
            Err(response) => return Ok(response),
        };
        if !has_add_permission(&user, &discipline) {
            return Ok(forbidden(
                ErrorCode::FosPermissionDenied,
                "Нет прав на перенос ФОС в эту дисциплину",
            ));
        }
    }
    if let Some(type_id) = body.type_id
        && let Err(response) = check_fos_type(&storage, type_id).await
    {
        return Ok(response);
    }

    match storage.update_fos(id, body).await {
        Ok(Some(fos)) => Ok(HttpResponse::Ok().json(ApiResponse::success(fos, "ФОС изменён"))),
        Ok(None) => Ok(not_found(ErrorCode::FosNotFound, "ФОС не найден")),
        Err(e) => Ok(internal_error(
            ErrorCode::InternalServerError,
            format!("Не удалось изменить ФОС: {e}"),
        )),
    }
}
