use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{GroupService, check_course, check_name_free};
use crate::models::groups::CreateGroupRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{bad_request, internal_error};
use crate::utils::validate::validate_name;

pub async fn create_group(
    service: &GroupService,
    mut body: CreateGroupRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    body.name = match validate_name(&body.name) {
        Ok(name) => name,
        Err(msg) => return Ok(bad_request(ErrorCode::BadRequest, msg)),
    };
    if let Err(response) = check_course(body.course) {
        return Ok(response);
    }
    if let Err(response) = check_name_free(&storage, &body.name, None).await {
        return Ok(response);
    }

    match storage.create_group(body).await {
        Ok(group) => {
            tracing::info!("Group {} created", group.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(group, "Группа добавлена")))
        }
        Err(e) => Ok(internal_error(
            ErrorCode::InternalServerError,
            format!("Не удалось добавить группу: {e}"),
        )),
    }
}
