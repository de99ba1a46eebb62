use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{DisciplineService, check_relations, unique_ids};
use crate::models::disciplines::CreateDisciplineRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::permissions::discipline_teachers_for;
use crate::services::{bad_request, current_user, internal_error};
use crate::utils::validate::validate_name;

pub async fn create_discipline(
    service: &DisciplineService,
    mut body: CreateDisciplineRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };

    body.name = match validate_name(&body.name) {
        Ok(name) => name,
        Err(msg) => return Ok(bad_request(ErrorCode::DisciplineInvalid, msg)),
    };
    body.teacher_ids = discipline_teachers_for(&user, unique_ids(body.teacher_ids));
    body.group_ids = unique_ids(body.group_ids);

    let storage = service.get_storage(request)?;
    if let Err(response) = check_relations(
        &storage,
        Some(body.type_id),
        body.qualification_id,
        &body.teacher_ids,
        &body.group_ids,
    )
    .await
    {
        return Ok(response);
    }

    match storage.create_discipline(body).await {
        Ok(discipline) => {
            tracing::info!("Discipline {} created by user {}", discipline.id, user.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                discipline,
                "Дисциплина добавлена",
            )))
        }
        Err(e) if e.is_unique_violation() => Ok(HttpResponse::Conflict().json(
            ApiResponse::error_empty(ErrorCode::Conflict, "Такая дисциплина уже существует"),
        )),
        Err(e) => Ok(internal_error(
            ErrorCode::InternalServerError,
            format!("Не удалось добавить дисциплину: {e}"),
        )),
    }
}
