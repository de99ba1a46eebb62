pub mod create;
pub mod delete;
pub mod filters;
pub mod get;
pub mod import;
pub mod list;
pub mod update;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::FosAdminError;
use crate::models::ErrorCode;
use crate::models::dictionaries::DictionaryKind;
use crate::models::disciplines::{
    CreateDisciplineRequest, DisciplineDetail, DisciplineListParams, UpdateDisciplineRequest,
};
use crate::storage::Storage;

pub struct DisciplineService {
    storage: Option<Arc<dyn Storage>>,
}

impl DisciplineService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_disciplines(
        &self,
        query: DisciplineListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_disciplines(self, query, request).await
    }

    pub async fn filter_options(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        filters::filter_options(self, request).await
    }

    pub async fn get_discipline(
        &self,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        get::get_discipline(self, id, request).await
    }

    pub async fn create_discipline(
        &self,
        body: CreateDisciplineRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_discipline(self, body, request).await
    }

    pub async fn update_discipline(
        &self,
        id: i64,
        body: UpdateDisciplineRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_discipline(self, id, body, request).await
    }

    pub async fn delete_discipline(
        &self,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_discipline(self, id, request).await
    }

    pub async fn import_disciplines(
        &self,
        payload: Multipart,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        import::import_disciplines(self, payload, request).await
    }
}

async fn load_discipline(
    storage: &Arc<dyn Storage>,
    id: i64,
) -> Result<DisciplineDetail, HttpResponse> {
    match storage.get_discipline_by_id(id).await {
        Ok(Some(discipline)) => Ok(discipline),
        Ok(None) => Err(super::not_found(
            ErrorCode::DisciplineNotFound,
            "Дисциплина не найдена",
        )),
        Err(e) => Err(super::internal_error(
            ErrorCode::InternalServerError,
            format!("Ошибка получения дисциплины: {e}"),
        )),
    }
}

/// Связанные записи существуют
async fn check_relations(
    storage: &Arc<dyn Storage>,
    type_id: Option<i64>,
    qualification_id: Option<i64>,
    teacher_ids: &[i64],
    group_ids: &[i64],
) -> Result<(), HttpResponse> {
    let lookup_failed = |e: FosAdminError| {
        super::internal_error(
            ErrorCode::InternalServerError,
            format!("Ошибка проверки связей дисциплины: {e}"),
        )
    };

    let dictionaries = [
        (DictionaryKind::DisciplineTypes, type_id),
        (DictionaryKind::Qualifications, qualification_id),
    ];
    for (kind, id) in dictionaries {
        let Some(id) = id else { continue };
        if storage
            .get_dictionary_item(kind, id)
            .await
            .map_err(lookup_failed)?
            .is_none()
        {
            return Err(super::bad_request(
                ErrorCode::DisciplineInvalid,
                format!("{} с id {id} не найден(а)", kind.item_title()),
            ));
        }
    }

    for &teacher_id in teacher_ids {
        match storage.get_user_by_id(teacher_id).await.map_err(lookup_failed)? {
            Some(user) if user.is_active() => {}
            _ => {
                return Err(super::bad_request(
                    ErrorCode::DisciplineInvalid,
                    format!("Преподаватель с id {teacher_id} не найден"),
                ));
            }
        }
    }

    for &group_id in group_ids {
        if storage
            .get_group_by_id(group_id)
            .await
            .map_err(lookup_failed)?
            .is_none()
        {
            return Err(super::bad_request(
                ErrorCode::DisciplineInvalid,
                format!("Группа с id {group_id} не найдена"),
            ));
        }
    }

    Ok(())
}

/// Без повторов, с сохранением порядка
fn unique_ids(ids: Vec<i64>) -> Vec<i64> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_ids_keeps_order() {
        assert_eq!(unique_ids(vec![3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert!(unique_ids(Vec::new()).is_empty());
    }
}
