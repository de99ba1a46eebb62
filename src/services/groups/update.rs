use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{GroupService, check_course, check_name_free};
use crate::models::groups::UpdateGroupRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{bad_request, internal_error, not_found};
use crate::utils::validate::validate_name;

pub async fn update_group(
    service: &GroupService,
    id: i64,
    mut body: UpdateGroupRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    if let Some(ref name) = body.name {
        let name = match validate_name(name) {
            Ok(name) => name,
            Err(msg) => return Ok(bad_request(ErrorCode::BadRequest, msg)),
        };
        if let Err(response) = check_name_free(&storage, &name, Some(id)).await {
            return Ok(response);
        }
        body.name = Some(name);
    }
    if let Some(course) = body.course
        && let Err(response) = check_course(course)
    {
        return Ok(response);
    }

    match storage.update_group(id, body).await {
        Ok(Some(group)) => Ok(HttpResponse::Ok().json(ApiResponse::success(group, "Группа изменена"))),
        Ok(None) => Ok(not_found(ErrorCode::GroupNotFound, "Группа не найдена")),
        Err(e) => Ok(internal_error(
            ErrorCode::InternalServerError,
            format!("Не удалось изменить группу: {e}"),
        )),
    }
}
