use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{DisciplineService, check_relations, load_discipline, unique_ids};
use crate::models::disciplines::UpdateDisciplineRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::permissions::{discipline_teachers_for, has_change_permission};
use crate::services::{bad_request, current_user, forbidden, internal_error, not_found};
use crate::utils::validate::validate_name;

pub async fn update_discipline(
    service: &DisciplineService,
    id: i64,
    mut body: UpdateDisciplineRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;

    let discipline = match load_discipline(&storage, id).await {
        Ok(discipline) => discipline,
        Err(response) => return Ok(response),
    };
    if !has_change_permission(&user, &discipline) {
        return Ok(forbidden(
            ErrorCode::DisciplinePermissionDenied,
            "Нет прав на изменение дисциплины",
        ));
    }

    if let Some(name) = body.name.as_deref() {
        match validate_name(name) {
            Ok(name) => body.name = Some(name),
            Err(msg) => return Ok(bad_request(ErrorCode::DisciplineInvalid, msg)),
        }
    }
    // преподаватель не может убрать себя из своей дисциплины
    body.teacher_ids = body
        .teacher_ids
        .take()
        .map(|ids| discipline_teachers_for(&user, unique_ids(ids)));
    body.group_ids = body.group_ids.take().map(unique_ids);

    if let Err(response) = check_relations(
        &storage,
        body.type_id,
        body.qualification_id.flatten(),
        body.teacher_ids.as_deref().unwrap_or_default(),
        body.group_ids.as_deref().unwrap_or_default(),
    )
    .await
    {
        return Ok(response);
    }

    match storage.update_discipline(id, body).await {
        Ok(Some(discipline)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            discipline,
            "Дисциплина изменена",
        ))),
        Ok(None) => Ok(not_found(
            ErrorCode::DisciplineNotFound,
            "Дисциплина не найдена",
        )),
        Err(e) if e.is_unique_violation() => Ok(HttpResponse::Conflict().json(
            ApiResponse::error_empty(ErrorCode::Conflict, "Такая дисциплина уже существует"),
        )),
        Err(e) => Ok(internal_error(
            ErrorCode::InternalServerError,
            format!("Не удалось изменить дисциплину: {e}"),
        )),
    }
}
