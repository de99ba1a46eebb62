pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::groups::{COURSE_RANGE, CreateGroupRequest, GroupListParams, UpdateGroupRequest};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub struct GroupService {
    storage: Option<Arc<dyn Storage>>,
}

impl GroupService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_groups(
        &self,
        query: GroupListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_groups(self, query, request).await
    }

    pub async fn get_group(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::get_group(self, id, request).await
    }

    pub async fn create_group(
        &self,
        body: CreateGroupRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_group(self, body, request).await
    }

    pub async fn update_group(
        &self,
        id: i64,
        body: UpdateGroupRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_group(self, id, body, request).await
    }

    pub async fn delete_group(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        delete::delete_group(self, id, request).await
    }
}

fn check_course(course: i32) -> Result<(), HttpResponse> {
    if COURSE_RANGE.contains(&course) {
        Ok(())
    } else {
        Err(super::bad_request(
            ErrorCode::GroupCourseInvalid,
            format!(
                "Курс должен быть от {} до {}",
                COURSE_RANGE.start(),
                COURSE_RANGE.end()
            ),
        ))
    }
}

/// Название группы свободно (или занято этой же группой)
async fn check_name_free(
    storage: &Arc<dyn Storage>,
    name: &str,
    current_id: Option<i64>,
) -> Result<(), HttpResponse> {
    match storage.get_groups_by_names(&[name.to_string()]).await {
        Ok(groups) if groups.iter().any(|g| Some(g.id) != current_id) => {
            Err(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::Conflict,
                format!("Группа «{name}» уже существует"),
            )))
        }
        Ok(_) => Ok(()),
        Err(e) => Err(super::internal_error(
            ErrorCode::InternalServerError,
            format!("Ошибка проверки группы: {e}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_bounds() {
        assert!(check_course(1).is_ok());
        assert!(check_course(10).is_ok());
        assert!(check_course(0).is_err());
        assert!(check_course(11).is_err());
    }
}
