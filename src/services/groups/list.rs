use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GroupService;
use crate::models::groups::{GroupListParams, GroupListQuery};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::internal_error;

pub async fn list_groups(
    service: &GroupService,
    query: GroupListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage
        .list_groups_with_pagination(GroupListQuery::from(query))
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Список групп получен",
        ))),
        Err(e) => Ok(internal_error(
            ErrorCode::InternalServerError,
            format!("Ошибка получения списка групп: {e}"),
        )),
    }
}
