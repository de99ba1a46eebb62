pub mod create;
pub mod delete;
pub mod filters;
pub mod get;
pub mod list;
pub mod merge;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::dictionaries::DictionaryKind;
use crate::models::disciplines::DisciplineDetail;
use crate::models::fos::years::{current_academic_year_choices, is_valid_academic_year};
use crate::models::fos::{CreateFosRequest, FosDetail, FosListParams, UpdateFosRequest};
use crate::models::ErrorCode;
use crate::storage::Storage;

pub struct FosService {
    storage: Option<Arc<dyn Storage>>,
}

impl FosService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_fos(
        &self,
        query: FosListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_fos(self, query, request).await
    }

    pub async fn filter_options(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        filters::filter_options(self, request).await
    }

    pub async fn get_fos(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::get_fos(self, id, request).await
    }

    pub async fn create_fos(
        &self,
        body: CreateFosRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_fos(self, body, request).await
    }

    pub async fn update_fos(
        &self,
        id: i64,
        body: UpdateFosRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_fos(self, id, body, request).await
    }

    pub async fn delete_fos(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        delete::delete_fos(self, id, request).await
    }

    pub async fn merge_documents(
        &self,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        merge::merge_documents(self, id, request).await
    }
}

async fn load_fos(storage: &Arc<dyn Storage>, id: i64) -> Result<FosDetail, HttpResponse> {
    match storage.get_fos_by_id(id).await {
        Ok(Some(fos)) => Ok(fos),
        Ok(None) => Err(super::not_found(ErrorCode::FosNotFound, "ФОС не найден")),
        Err(e) => Err(super::internal_error(
            ErrorCode::InternalServerError,
            format!("Ошибка получения ФОС: {e}"),
        )),
    }
}

/// Дисциплина, к которой привязывается ФОС
async fn load_parent_discipline(
    storage: &Arc<dyn Storage>,
    discipline_id: i64,
) -> Result<DisciplineDetail, HttpResponse> {
    match storage.get_discipline_by_id(discipline_id).await {
        Ok(Some(discipline)) => Ok(discipline),
        Ok(None) => Err(super::bad_request(
            ErrorCode::FosInvalid,
            format!("Дисциплина с id {discipline_id} не найдена"),
        )),
        Err(e) => Err(super::internal_error(
            ErrorCode::InternalServerError,
            format!("Ошибка получения дисциплины: {e}"),
        )),
    }
}

async fn check_fos_type(storage: &Arc<dyn Storage>, type_id: i64) -> Result<(), HttpResponse> {
    match storage
        .get_dictionary_item(DictionaryKind::FosTypes, type_id)
        .await
    {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(super::bad_request(
            ErrorCode::FosInvalid,
            format!("Тип ФОС с id {type_id} не найден"),
        )),
        Err(e) => Err(super::internal_error(
            ErrorCode::InternalServerError,
            format!("Ошибка проверки типа ФОС: {e}"),
        )),
    }
}

/// Учебный год из списка допустимых; пустая строка означает «не указан»
fn check_year(year: Option<String>) -> Result<Option<String>, HttpResponse> {
    let Some(year) = year.map(|y| y.trim().to_string()).filter(|y| !y.is_empty()) else {
        return Ok(None);
    };
    let choices = current_academic_year_choices(AppConfig::get().app.first_academic_year);
    if is_valid_academic_year(&year, &choices) {
        Ok(Some(year))
    } else {
        Err(super::bad_request(
            ErrorCode::AcademicYearInvalid,
            format!("Недопустимый учебный год: {year}"),
        ))
    }
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_description() {
        assert_eq!(normalize_description(Some("  ".into())), None);
        assert_eq!(
            normalize_description(Some(" Билеты к экзамену ".into())).as_deref(),
            Some("Билеты к экзамену")
        );
        assert_eq!(normalize_description(None), None);
    }
}
